pub mod form;
pub mod model;
pub mod sanitize;
pub mod store;
pub mod validation;

pub use form::{
    AssistantDraft, AssistantForm, DistributionStatus, FormError, FormEvent, FormField,
    FormListener, FormMode, FormState,
};
pub use model::{
    AssistantPatch, AssistantRecord, Language, NAME_MAX_CHARS, NAME_MIN_CHARS, ResponseConfig,
    SYSTEM_PROMPT_MAX_CHARS, Tone, seed_assistants,
};
pub use sanitize::sanitize_input;
pub use store::AssistantStore;
pub use validation::{
    ValidationError, validate_distribution, validate_name, validate_system_prompt,
};
