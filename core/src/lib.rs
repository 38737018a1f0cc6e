pub mod assistant;
pub mod config;
pub mod storage;
pub mod training;
pub mod traits;

pub use assistant::*;
pub use config::*;
pub use storage::*;
pub use training::*;
pub use traits::*;
