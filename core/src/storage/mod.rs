pub mod factory;
pub mod in_memory;
pub mod json_file;

pub use factory::create_storage;
pub use in_memory::InMemoryStorage;
pub use json_file::JsonFileStorage;
