use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    helpers::{ensure_affected, from_bool, optional_text, require_title, to_bool},
    models::{CategoryFilter, Task, TaskInput},
    Database,
};
use crate::error::{Result, ShelfError};

const TASK_COLUMNS: &str = "id, title, description, priority, due_date, category, completed";

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: optional_text(row, "description")?,
        priority: row.get("priority")?,
        due_date: optional_text(row, "due_date")?,
        category: optional_text(row, "category")?,
        completed: to_bool(row.get("completed")?),
    })
}

impl Database {
    /// Insert a task and return its new id. `completed` starts false.
    pub fn create_task(&self, input: TaskInput) -> Result<i64> {
        require_title(&input.title)?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO tasks (title, description, priority, due_date, category, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.title,
                    input.description,
                    input.priority,
                    input.due_date,
                    input.category,
                    from_bool(false),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All tasks for `All`, otherwise the exact-category subset, in creation order.
    pub fn list_tasks(&self, filter: &CategoryFilter) -> Result<Vec<Task>> {
        self.execute(|conn| {
            let tasks = match filter {
                CategoryFilter::All => {
                    let mut stmt =
                        conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))?;
                    let rows = stmt
                        .query_map([], row_to_task)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
                CategoryFilter::Category(category) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {TASK_COLUMNS} FROM tasks WHERE category = ?1 ORDER BY id ASC"
                    ))?;
                    let rows = stmt
                        .query_map(params![category], row_to_task)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
            };
            Ok(tasks)
        })
    }

    pub fn get_task(&self, task_id: i64) -> Result<Task> {
        self.execute(move |conn| {
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![task_id],
                row_to_task,
            )
            .optional()?
            .ok_or(ShelfError::NotFound(task_id))
        })
    }

    /// Replace the editable fields. `id` and `completed` are left alone.
    pub fn update_task(&self, task_id: i64, input: TaskInput) -> Result<()> {
        require_title(&input.title)?;

        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE tasks
                 SET title = ?1,
                     description = ?2,
                     priority = ?3,
                     due_date = ?4,
                     category = ?5
                 WHERE id = ?6",
                params![
                    input.title,
                    input.description,
                    input.priority,
                    input.due_date,
                    input.category,
                    task_id,
                ],
            )?;
            ensure_affected(rows_affected, task_id)
        })
    }

    pub fn delete_task(&self, task_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let rows_affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            ensure_affected(rows_affected, task_id)
        })
    }

    pub fn set_task_completed(&self, task_id: i64, completed: bool) -> Result<()> {
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE tasks SET completed = ?1 WHERE id = ?2",
                params![from_bool(completed), task_id],
            )?;
            ensure_affected(rows_affected, task_id)
        })
    }

    /// Distinct non-empty categories currently stored, sorted.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT category FROM tasks
                 WHERE category IS NOT NULL AND category != ''
                 ORDER BY category ASC",
            )?;
            let categories = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(categories)
        })
    }
}
