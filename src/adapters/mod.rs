// Adapters layer: concrete byte sinks/sources behind the storage port.

pub mod storage;

pub use storage::{LocalStorage, MemoryStorage};
