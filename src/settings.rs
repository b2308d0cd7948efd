use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::db::models::SUGGESTED_CATEGORIES;
use crate::error::{Result, ShelfError};

const PAGE_PLACEHOLDER: &str = "{page}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskListSettings {
    pub db_path: PathBuf,
    pub categories: Vec<String>,
}

impl Default for TaskListSettings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("todo_list.db"),
            categories: SUGGESTED_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Where the batch export reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    pub base_url: String,
    /// Joined onto `base_url`; `{page}` is replaced by the page number.
    pub page_path: String,
    pub first_page: u32,
    pub last_page: u32,
    pub output_path: PathBuf,
    pub timeout_secs: u64,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            base_url: "http://books.toscrape.com/".into(),
            page_path: "catalogue/page-{page}.html".into(),
            first_page: 1,
            last_page: 5,
            output_path: PathBuf::from("books.csv"),
            timeout_secs: 30,
        }
    }
}

impl ExtractorSettings {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ShelfError::config("base_url must not be empty"));
        }
        if self.first_page == 0 {
            return Err(ShelfError::config("first_page starts at 1"));
        }
        if self.first_page > self.last_page {
            return Err(ShelfError::config(format!(
                "first_page ({}) is after last_page ({})",
                self.first_page, self.last_page
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ShelfError::config("timeout_secs must be at least 1"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ShelfError::config("output_path must not be empty"));
        }
        Ok(())
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.first_page..=self.last_page
    }

    pub fn page_url(&self, page: u32) -> String {
        let path = self.page_path.replace(PAGE_PLACEHOLDER, &page.to_string());
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub task_list: TaskListSettings,
    pub extractor: ExtractorSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to defaults when the file is absent.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> UserSettings {
        self.read().clone()
    }

    pub fn task_list(&self) -> TaskListSettings {
        self.read().task_list.clone()
    }

    pub fn extractor(&self) -> ExtractorSettings {
        self.read().extractor.clone()
    }

    pub fn update_task_list(&self, settings: TaskListSettings) -> Result<()> {
        let mut guard = self.write();
        guard.task_list = settings;
        self.persist(&guard)
    }

    pub fn update_extractor(&self, settings: ExtractorSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        guard.extractor = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("taskshelf.json")).unwrap();

        let extractor = store.extractor();
        assert_eq!(extractor.pages().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(extractor.output_path, PathBuf::from("books.csv"));
        assert_eq!(store.task_list().db_path, PathBuf::from("todo_list.db"));
        assert_eq!(
            store.task_list().categories,
            vec!["Work", "Personal", "Home", "Others"]
        );
        assert!(!store.path().exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskshelf.json");
        fs::write(&path, r#"{ "extractor": { "last_page": 2 } }"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let extractor = store.extractor();
        assert_eq!(extractor.first_page, 1);
        assert_eq!(extractor.last_page, 2);
        assert_eq!(extractor.base_url, "http://books.toscrape.com/");
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("taskshelf.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut extractor = store.extractor();
        extractor.last_page = 8;
        extractor.output_path = PathBuf::from("out/books.csv");
        store.update_extractor(extractor.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.extractor(), extractor);
    }

    #[test]
    fn test_update_rejects_inverted_range() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("taskshelf.json")).unwrap();

        let mut extractor = store.extractor();
        extractor.first_page = 4;
        extractor.last_page = 2;
        let err = store.update_extractor(extractor).unwrap_err();
        assert!(matches!(err, ShelfError::Config(_)));
        assert_eq!(store.extractor().first_page, 1);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let settings = ExtractorSettings {
            timeout_secs: 0,
            ..ExtractorSettings::default()
        };
        assert!(matches!(settings.validate(), Err(ShelfError::Config(_))));
        assert!(ExtractorSettings::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskshelf.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SettingsStore::new(path), Err(ShelfError::Json(_))));
    }

    #[test]
    fn test_page_url() {
        let settings = ExtractorSettings::default();
        assert_eq!(
            settings.page_url(3),
            "http://books.toscrape.com/catalogue/page-3.html"
        );

        let flat = ExtractorSettings {
            base_url: "http://example.test".into(),
            page_path: "/list?p={page}".into(),
            ..ExtractorSettings::default()
        };
        assert_eq!(flat.page_url(12), "http://example.test/list?p=12");

        let bare = ExtractorSettings {
            page_path: String::new(),
            ..ExtractorSettings::default()
        };
        assert_eq!(bare.page_url(1), "http://books.toscrape.com/");
    }
}
