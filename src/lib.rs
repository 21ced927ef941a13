// tasktracker - personal task tracking with SQLite storage and single-slot undo

pub mod error;
pub mod export;
pub mod models;
pub mod sort;
pub mod store;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use models::{Priority, Repeat, Status, Task};
pub use sort::SortKey;
pub use store::{Config, TaskStore};
