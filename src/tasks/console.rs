//! Line-oriented task list front end.

use std::io::{self, BufRead, Write};

use chrono::Local;

use crate::{
    db::models::{Task, TaskInput},
    tasks::{commands, view::TaskListView},
    AppState,
};

/// Typed into an edit prompt to clear an optional field.
const CLEAR_MARKER: &str = "-";
const PRIORITY_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

const HELP: &str = "\
Commands:
  list               show tasks for the current filter
  add                create a task (empty title cancels)
  select <id>        choose the task that update/delete act on; no id clears
  update             edit the selected task (empty answer keeps, '-' clears)
  delete             delete the selected task
  toggle <id>        flip a task between done and not done
  filter [value]     show only one category, or All
  categories         list filter choices
  help               show this text
  quit               leave";

pub struct TaskConsole<'a, R, W> {
    state: &'a AppState,
    view: TaskListView,
    input: R,
    output: W,
    eof: bool,
}

impl<'a, R: BufRead, W: Write> TaskConsole<'a, R, W> {
    pub fn new(state: &'a AppState, input: R, output: W) -> Self {
        Self {
            state,
            view: TaskListView::new(),
            input,
            output,
            eof: false,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.show_list()?;

        while !self.eof {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            let line = line.trim();
            let (command, argument) = match line.split_once(char::is_whitespace) {
                Some((command, argument)) => (command, argument.trim()),
                None => (line, ""),
            };

            match command {
                "" => {}
                "list" | "ls" => self.show_list()?,
                "add" => self.add()?,
                "select" => self.select(argument)?,
                "update" | "edit" => self.update()?,
                "delete" | "rm" => self.delete()?,
                "toggle" | "done" => self.toggle(argument)?,
                "filter" => self.filter(argument)?,
                "categories" => self.show_categories()?,
                "help" | "?" => writeln!(self.output, "{HELP}")?,
                "quit" | "exit" | "q" => break,
                other => writeln!(
                    self.output,
                    "Unknown command '{other}'. Type 'help' for the list."
                )?,
            }
        }
        Ok(())
    }

    pub fn view(&self) -> &TaskListView {
        &self.view
    }

    fn show_list(&mut self) -> io::Result<()> {
        if let Err(msg) = self.view.refresh(self.state) {
            return self.error(&msg);
        }
        self.render()
    }

    fn render(&mut self) -> io::Result<()> {
        writeln!(self.output, "Tasks (filter: {})", self.view.filter())?;
        let today = Local::now().date_naive();
        for line in self.view.render(today) {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }

    fn add(&mut self) -> io::Result<()> {
        let Some(input) = self.collect_input(None)? else {
            return self.cancelled("Add");
        };

        match commands::create_task(self.state, input) {
            Ok(id) => {
                writeln!(self.output, "Added task #{id}.")?;
                self.show_list()
            }
            Err(msg) => self.error(&msg),
        }
    }

    fn select(&mut self, argument: &str) -> io::Result<()> {
        if argument.is_empty() {
            self.view.clear_selection();
            return self.render();
        }
        let Some(task_id) = self.parse_id(argument)? else {
            return Ok(());
        };
        match self.view.select(task_id) {
            Ok(()) => self.render(),
            Err(msg) => self.error(&msg),
        }
    }

    fn update(&mut self) -> io::Result<()> {
        let Some(task_id) = self.view.selected() else {
            return self.warning("No task selected!");
        };
        let task = match commands::get_task(self.state, task_id) {
            Ok(task) => task,
            Err(msg) => return self.error(&msg),
        };

        let Some(input) = self.collect_input(Some(&task))? else {
            return self.cancelled("Update");
        };

        match commands::update_task(self.state, task_id, input) {
            Ok(()) => {
                writeln!(self.output, "Updated task #{task_id}.")?;
                self.show_list()
            }
            Err(msg) => self.error(&msg),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(task_id) = self.view.selected() else {
            return self.warning("No task selected!");
        };

        match commands::delete_task(self.state, task_id) {
            Ok(()) => {
                self.view.clear_selection();
                writeln!(self.output, "Deleted task #{task_id}.")?;
                self.show_list()
            }
            Err(msg) => self.error(&msg),
        }
    }

    fn toggle(&mut self, argument: &str) -> io::Result<()> {
        let Some(task_id) = self.parse_id(argument)? else {
            return Ok(());
        };
        match self.view.toggle(self.state, task_id) {
            Ok(completed) => {
                let label = if completed { "done" } else { "not done" };
                writeln!(self.output, "Task #{task_id} marked {label}.")?;
                self.render()
            }
            Err(msg) => self.error(&msg),
        }
    }

    fn filter(&mut self, argument: &str) -> io::Result<()> {
        let value = if argument.is_empty() {
            self.show_categories()?;
            let answer = self.ask("Filter")?;
            if self.eof || answer.trim().is_empty() {
                return Ok(());
            }
            answer.trim().to_string()
        } else {
            argument.to_string()
        };

        if let Err(msg) = self.view.set_filter(self.state, &value) {
            return self.error(&msg);
        }
        self.render()
    }

    fn show_categories(&mut self) -> io::Result<()> {
        match commands::category_options(self.state) {
            Ok(options) => writeln!(self.output, "Filters: {}", options.join(", ")),
            Err(msg) => self.error(&msg),
        }
    }

    /// Prompt for every field. `None` means the user backed out: empty title
    /// or end of input.
    fn collect_input(&mut self, current: Option<&Task>) -> io::Result<Option<TaskInput>> {
        let title_label = if current.is_some() {
            "New task title"
        } else {
            "Task title"
        };
        let title = self.ask(title_label)?;
        if self.eof || title.trim().is_empty() {
            return Ok(None);
        }

        let suggestions = self.state.settings.task_list().categories.join(", ");
        let description = self.ask_text("Description", current.and_then(|t| t.description.clone()))?;
        let priority = self.ask_priority(current.and_then(|t| t.priority))?;
        let due_date =
            self.ask_text("Due date (YYYY-MM-DD)", current.and_then(|t| t.due_date.clone()))?;
        let category = self.ask_text(
            &format!("Category ({suggestions})"),
            current.and_then(|t| t.category.clone()),
        )?;

        if self.eof {
            return Ok(None);
        }
        Ok(Some(TaskInput {
            title: title.trim().to_string(),
            description,
            priority,
            due_date,
            category,
        }))
    }

    fn ask_text(&mut self, label: &str, current: Option<String>) -> io::Result<Option<String>> {
        let prompt = match &current {
            Some(value) => format!("{label} [{value}]"),
            None => label.to_string(),
        };
        let answer = self.ask(&prompt)?;
        Ok(resolve_text(&answer, current))
    }

    fn ask_priority(&mut self, current: Option<i64>) -> io::Result<Option<i64>> {
        let prompt = match current {
            Some(value) => format!("Priority (1-5) [{value}]"),
            None => "Priority (1-5)".to_string(),
        };
        loop {
            let answer = self.ask(&prompt)?;
            if self.eof {
                return Ok(current);
            }
            match resolve_priority(&answer, current) {
                Ok(priority) => return Ok(priority),
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }

    fn parse_id(&mut self, argument: &str) -> io::Result<Option<i64>> {
        match argument.trim_start_matches('#').parse::<i64>() {
            Ok(task_id) => Ok(Some(task_id)),
            Err(_) => {
                self.warning("Give a task number, e.g. 'toggle 3'.")?;
                Ok(None)
            }
        }
    }

    fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn cancelled(&mut self, action: &str) -> io::Result<()> {
        if self.eof {
            return Ok(());
        }
        writeln!(self.output, "{action} cancelled.")
    }

    fn warning(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.output, "Warning: {msg}")
    }

    fn error(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.output, "Error: {msg}")
    }
}

fn resolve_text(answer: &str, current: Option<String>) -> Option<String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        current
    } else if trimmed == CLEAR_MARKER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn resolve_priority(answer: &str, current: Option<i64>) -> Result<Option<i64>, String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Ok(current);
    }
    if trimmed == CLEAR_MARKER {
        return Ok(None);
    }
    match trimmed.parse::<i64>() {
        Ok(priority) if PRIORITY_RANGE.contains(&priority) => Ok(Some(priority)),
        _ => Err("Priority must be a whole number from 1 to 5.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::CategoryFilter;
    use crate::tasks::test_support::test_state;
    use std::io::Cursor;

    fn run_script(state: &AppState, script: &str) -> String {
        let mut output = Vec::new();
        {
            let mut console = TaskConsole::new(state, Cursor::new(script.as_bytes()), &mut output);
            console.run().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    fn all_tasks(state: &AppState) -> Vec<Task> {
        state.db.list_tasks(&CategoryFilter::All).unwrap()
    }

    #[test]
    fn test_add_collects_every_field() {
        let (_dir, state) = test_state();
        let output = run_script(
            &state,
            "add\nBuy milk\n2% organic\n3\n2030-01-01\nHome\nquit\n",
        );

        assert!(output.contains("Added task #1."));
        assert!(output.contains(
            "#1 Buy milk - 2% organic (Priority: 3, Due: 2030-01-01, Category: Home)"
        ));

        let tasks = all_tasks(&state);
        assert_eq!(tasks.len(), 1);
        assert_eq!(
            tasks[0].input(),
            TaskInput {
                title: "Buy milk".into(),
                description: Some("2% organic".into()),
                priority: Some(3),
                due_date: Some("2030-01-01".into()),
                category: Some("Home".into()),
            }
        );
        assert!(!tasks[0].completed);
    }

    #[test]
    fn test_add_with_empty_title_cancels() {
        let (_dir, state) = test_state();
        let output = run_script(&state, "add\n\nquit\n");
        assert!(output.contains("Add cancelled."));
        assert!(all_tasks(&state).is_empty());
    }

    #[test]
    fn test_priority_is_reprompted_until_in_range() {
        let (_dir, state) = test_state();
        let output = run_script(&state, "add\nCall mom\n\n9\nabc\n4\n\n\nquit\n");

        assert_eq!(
            output
                .matches("Priority must be a whole number from 1 to 5.")
                .count(),
            2
        );
        let tasks = all_tasks(&state);
        assert_eq!(tasks[0].priority, Some(4));
        assert_eq!(tasks[0].description, None);
        assert_eq!(tasks[0].category, None);
    }

    #[test]
    fn test_update_and_delete_need_selection() {
        let (_dir, state) = test_state();
        commands::create_task(&state, TaskInput::new("Laundry")).unwrap();

        let output = run_script(&state, "toggle 1\nupdate\ndelete\nquit\n");
        assert!(output.contains("Task #1 marked done."));
        assert_eq!(output.matches("Warning: No task selected!").count(), 2);
        assert_eq!(all_tasks(&state).len(), 1);
        assert!(all_tasks(&state)[0].completed);
    }

    #[test]
    fn test_update_selected_task_keeps_and_clears_fields() {
        let (_dir, state) = test_state();
        let id = commands::create_task(
            &state,
            TaskInput {
                title: "Draft memo".into(),
                description: Some("for Friday".into()),
                priority: Some(2),
                due_date: Some("2030-03-01".into()),
                category: Some("Work".into()),
            },
        )
        .unwrap();
        commands::set_task_completed(&state, id, true).unwrap();

        let output = run_script(&state, &format!("select {id}\nupdate\nFinal memo\n\n5\n-\n\nquit\n"));
        assert!(output.contains(&format!("Updated task #{id}.")));

        let task = state.db.get_task(id).unwrap();
        assert_eq!(task.title, "Final memo");
        assert_eq!(task.description.as_deref(), Some("for Friday"));
        assert_eq!(task.priority, Some(5));
        assert_eq!(task.due_date, None);
        assert_eq!(task.category.as_deref(), Some("Work"));
        assert!(task.completed);
    }

    #[test]
    fn test_delete_selected_task() {
        let (_dir, state) = test_state();
        commands::create_task(&state, TaskInput::new("Keep")).unwrap();
        let doomed = commands::create_task(&state, TaskInput::new("Drop")).unwrap();

        let output = run_script(&state, &format!("select {doomed}\ndelete\ndelete\nquit\n"));
        assert!(output.contains(&format!("Deleted task #{doomed}.")));
        assert!(output.contains("Warning: No task selected!"));

        let titles: Vec<_> = all_tasks(&state).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Keep"]);
    }

    #[test]
    fn test_filter_narrows_rows() {
        let (_dir, state) = test_state();
        commands::create_task(&state, TaskInput::new("standup").with_category("Work")).unwrap();
        commands::create_task(&state, TaskInput::new("vacuum").with_category("Home")).unwrap();

        let mut output = Vec::new();
        {
            let script = "filter Work\nquit\n";
            let mut console = TaskConsole::new(&state, Cursor::new(script.as_bytes()), &mut output);
            console.run().unwrap();
            assert_eq!(console.view().rows().len(), 1);
            assert_eq!(console.view().rows()[0].title, "standup");
        }
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Tasks (filter: Work)"));
    }

    #[test]
    fn test_store_errors_are_reported_not_fatal() {
        let (_dir, state) = test_state();
        let output = run_script(&state, "toggle 7\nselect 7\nbogus\nlist\n");
        assert!(output.contains("Error: Task #7 is not in the current list"));
        assert!(output.contains("Unknown command 'bogus'"));
        assert!(output.contains("No tasks for filter \"All\"."));
    }

    #[test]
    fn test_end_of_input_mid_prompt_exits_quietly() {
        let (_dir, state) = test_state();
        let output = run_script(&state, "add\nHalf typed\n");
        assert!(!output.contains("Add cancelled."));
        assert!(all_tasks(&state).is_empty());
    }

    #[test]
    fn test_resolve_helpers() {
        assert_eq!(resolve_text("", Some("old".into())), Some("old".into()));
        assert_eq!(resolve_text("-", Some("old".into())), None);
        assert_eq!(resolve_text("  new ", None), Some("new".into()));

        assert_eq!(resolve_priority("", Some(2)), Ok(Some(2)));
        assert_eq!(resolve_priority("-", Some(2)), Ok(None));
        assert_eq!(resolve_priority("5", None), Ok(Some(5)));
        assert!(resolve_priority("0", None).is_err());
        assert!(resolve_priority("6", None).is_err());
    }
}
