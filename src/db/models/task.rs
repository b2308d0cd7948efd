//! Task data models.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category values the task list offers in its pickers. Not enforced: a task
/// may carry any free-form category.
pub const SUGGESTED_CATEGORIES: [&str; 4] = ["Work", "Personal", "Home", "Others"];

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub due_date: Option<String>,
    pub category: Option<String>,
    pub completed: bool,
}

impl Task {
    /// True for unfinished tasks whose due date parses and lies before `today`.
    /// Unparseable dates are never overdue; they are stored as typed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.completed {
            return false;
        }
        self.due_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DUE_DATE_FORMAT).ok())
            .is_some_and(|due| due < today)
    }

    pub fn input(&self) -> TaskInput {
        TaskInput {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: self.due_date.clone(),
            category: self.category.clone(),
        }
    }
}

/// Fields supplied when creating or updating a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Narrows the task list to an exact category, or shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub const ALL: &'static str = "All";

    /// `"All"` is the sentinel; anything else is an exact, case-sensitive match.
    pub fn parse(value: &str) -> Self {
        if value == Self::ALL {
            Self::All
        } else {
            Self::Category(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Category(category) => category,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => task.category.as_deref() == Some(category.as_str()),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
