//! Task list commands: what the presentation layer invokes on user actions.
//!
//! Errors come back as display strings so the caller can show them in a
//! blocking notification and let the user retry.

use crate::{
    db::models::{CategoryFilter, Task, TaskInput},
    AppState,
};

pub fn initialize(state: &AppState) -> Result<(), String> {
    state.db.initialize().map_err(|e| e.to_string())
}

pub fn list_tasks(state: &AppState, filter: &str) -> Result<Vec<Task>, String> {
    state
        .db
        .list_tasks(&CategoryFilter::parse(filter))
        .map_err(|e| e.to_string())
}

pub fn get_task(state: &AppState, task_id: i64) -> Result<Task, String> {
    state.db.get_task(task_id).map_err(|e| e.to_string())
}

pub fn create_task(state: &AppState, input: TaskInput) -> Result<i64, String> {
    state.db.create_task(input).map_err(|e| e.to_string())
}

pub fn update_task(state: &AppState, task_id: i64, input: TaskInput) -> Result<(), String> {
    state
        .db
        .update_task(task_id, input)
        .map_err(|e| e.to_string())
}

pub fn delete_task(state: &AppState, task_id: i64) -> Result<(), String> {
    state.db.delete_task(task_id).map_err(|e| e.to_string())
}

pub fn set_task_completed(state: &AppState, task_id: i64, completed: bool) -> Result<(), String> {
    state
        .db
        .set_task_completed(task_id, completed)
        .map_err(|e| e.to_string())
}

/// Filter choices: `All`, the configured suggestions, then any other category
/// already stored on a task.
pub fn category_options(state: &AppState) -> Result<Vec<String>, String> {
    let mut options = vec![CategoryFilter::ALL.to_string()];
    for category in state.settings.task_list().categories {
        if !options.contains(&category) {
            options.push(category);
        }
    }

    let stored = state.db.list_categories().map_err(|e| e.to_string())?;
    for category in stored {
        if !options.contains(&category) {
            options.push(category);
        }
    }
    Ok(options)
}
