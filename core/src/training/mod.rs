pub mod prompt;
pub mod simulator;

pub use prompt::{PromptEditor, PromptSaver, SaveOutcome, SharedStore};
pub use simulator::{ChatMessage, ChatSimulator, Sender};
