pub mod task;

pub use task::{CategoryFilter, Task, TaskInput, SUGGESTED_CATEGORIES};
