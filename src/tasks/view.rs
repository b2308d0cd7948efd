use chrono::NaiveDate;

use crate::{
    db::models::{CategoryFilter, Task},
    tasks::commands,
    AppState,
};

const MISSING: &str = "-";

/// What the task list currently shows.
///
/// Rows are always rebuilt from the store after a mutation or a filter change;
/// nothing about a row is cached between refreshes. Selection is tracked by id
/// on its own and has nothing to do with the completion checkbox.
#[derive(Debug, Default)]
pub struct TaskListView {
    filter: CategoryFilter,
    rows: Vec<Task>,
    selected: Option<i64>,
}

impl TaskListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn rows(&self) -> &[Task] {
        &self.rows
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Reload rows for the current filter. A selected task that is no longer
    /// listed gets deselected.
    pub fn refresh(&mut self, state: &AppState) -> Result<(), String> {
        self.rows = commands::list_tasks(state, self.filter.as_str())?;
        if let Some(id) = self.selected {
            if !self.contains(id) {
                self.selected = None;
            }
        }
        Ok(())
    }

    pub fn set_filter(&mut self, state: &AppState, value: &str) -> Result<(), String> {
        self.filter = CategoryFilter::parse(value);
        self.refresh(state)
    }

    pub fn select(&mut self, task_id: i64) -> Result<(), String> {
        if !self.contains(task_id) {
            return Err(format!("Task #{task_id} is not in the current list"));
        }
        self.selected = Some(task_id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Flip the completion flag of a listed task and reload. Returns the new flag.
    pub fn toggle(&mut self, state: &AppState, task_id: i64) -> Result<bool, String> {
        let completed = self
            .rows
            .iter()
            .find(|task| task.id == task_id)
            .map(|task| !task.completed)
            .ok_or_else(|| format!("Task #{task_id} is not in the current list"))?;

        commands::set_task_completed(state, task_id, completed)?;
        self.refresh(state)?;
        Ok(completed)
    }

    pub fn render(&self, today: NaiveDate) -> Vec<String> {
        if self.rows.is_empty() {
            return vec![format!("No tasks for filter \"{}\".", self.filter)];
        }
        self.rows
            .iter()
            .map(|task| render_row(task, self.selected == Some(task.id), today))
            .collect()
    }

    fn contains(&self, task_id: i64) -> bool {
        self.rows.iter().any(|task| task.id == task_id)
    }
}

pub fn render_row(task: &Task, selected: bool, today: NaiveDate) -> String {
    let marker = if selected { '>' } else { ' ' };
    let checkbox = if task.completed { 'x' } else { ' ' };
    let priority = task
        .priority
        .map(|p| p.to_string())
        .unwrap_or_else(|| MISSING.to_string());
    let overdue = if task.is_overdue(today) { " (overdue)" } else { "" };

    format!(
        "{marker} [{checkbox}] #{id} {title} - {description} (Priority: {priority}, Due: {due}, Category: {category}){overdue}",
        id = task.id,
        title = task.title,
        description = task.description.as_deref().unwrap_or(MISSING),
        due = task.due_date.as_deref().unwrap_or(MISSING),
        category = task.category.as_deref().unwrap_or(MISSING),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::TaskInput;
    use crate::tasks::test_support::test_state;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_render_row() {
        let task = Task {
            id: 4,
            title: "Pay rent".into(),
            description: Some("June".into()),
            priority: Some(1),
            due_date: Some("2024-05-31".into()),
            category: Some("Home".into()),
            completed: false,
        };
        assert_eq!(
            render_row(&task, true, today()),
            "> [ ] #4 Pay rent - June (Priority: 1, Due: 2024-05-31, Category: Home) (overdue)"
        );

        let bare = Task {
            id: 5,
            title: "Stretch".into(),
            description: None,
            priority: None,
            due_date: None,
            category: None,
            completed: true,
        };
        assert_eq!(
            render_row(&bare, false, today()),
            "  [x] #5 Stretch - - (Priority: -, Due: -, Category: -)"
        );
    }

    #[test]
    fn test_toggle_does_not_select() {
        let (_dir, state) = test_state();
        let id = commands::create_task(&state, TaskInput::new("water plants")).unwrap();

        let mut view = TaskListView::new();
        view.refresh(&state).unwrap();
        assert!(view.toggle(&state, id).unwrap());

        assert_eq!(view.selected(), None);
        assert!(view.rows()[0].completed);

        assert!(!view.toggle(&state, id).unwrap());
        assert!(!view.rows()[0].completed);
    }

    #[test]
    fn test_selection_cleared_when_row_disappears() {
        let (_dir, state) = test_state();
        let keep = commands::create_task(&state, TaskInput::new("keep").with_category("Work")).unwrap();
        let gone = commands::create_task(&state, TaskInput::new("gone").with_category("Home")).unwrap();

        let mut view = TaskListView::new();
        view.refresh(&state).unwrap();
        view.select(gone).unwrap();

        commands::delete_task(&state, gone).unwrap();
        view.refresh(&state).unwrap();
        assert_eq!(view.selected(), None);

        view.select(keep).unwrap();
        view.set_filter(&state, "Home").unwrap();
        assert_eq!(view.selected(), None);
        assert!(view.rows().is_empty());
    }

    #[test]
    fn test_select_requires_listed_task() {
        let (_dir, state) = test_state();
        commands::create_task(&state, TaskInput::new("a").with_category("Work")).unwrap();

        let mut view = TaskListView::new();
        view.set_filter(&state, "Home").unwrap();
        assert!(view.select(1).is_err());
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn test_render_empty_list() {
        let mut view = TaskListView::new();
        view.filter = CategoryFilter::parse("Work");
        assert_eq!(view.render(today()), vec!["No tasks for filter \"Work\"."]);
    }
}
