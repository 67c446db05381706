use crate::application::{CapabilityError, PreferenceStore};
use crate::domain::{DomainError, Page};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const DEMO_PAGE: &str = include_str!("../../assets/demo_page.json");

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Invalid file format - {0}")]
    Format(#[from] serde_json::Error),
    #[error("Invalid page - {0}")]
    Page(#[from] DomainError),
}

pub struct PageRepository;

impl PageRepository {
    pub fn load_page(path: &Path) -> Result<Page, PersistenceError> {
        let content = fs::read_to_string(path).map_err(|source| PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let page = Self::parse_page(&content)?;
        debug!(path = %path.display(), title = %page.title, "page loaded");
        Ok(page)
    }

    pub fn parse_page(json: &str) -> Result<Page, PersistenceError> {
        let page: Page = serde_json::from_str(json)?;
        page.validate()?;
        Ok(page)
    }

    /// The page bundled with the binary.
    pub fn demo_page() -> Result<Page, PersistenceError> {
        Self::parse_page(DEMO_PAGE)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default)]
    theme: Option<String>,
}

/// Theme preference kept in a small JSON file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<StoredPreferences, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoredPreferences::default()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(serde_json::from_str(&content)?)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get_preference(&self) -> Option<String> {
        match self.read() {
            Ok(stored) => stored.theme,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable preferences");
                None
            }
        }
    }

    fn set_preference(&mut self, value: &str) -> Result<(), CapabilityError> {
        let stored = StoredPreferences {
            theme: Some(value.to_string()),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|err| CapabilityError::Failed(err.to_string()))?;
        fs::write(&self.path, json).map_err(|err| CapabilityError::Failed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_demo_page_is_valid() {
        let page = PageRepository::demo_page().expect("demo page should parse");
        assert!(!page.forms.is_empty());
        assert!(!page.counters.is_empty());
        assert!(page.images.iter().all(|image| image.data_src.is_some() && image.src.is_none()));
        assert!(page.results.is_some());
    }

    #[test]
    fn test_load_page_from_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("page.json");
        let page = PageRepository::demo_page().expect("demo page");
        fs::write(&path, DEMO_PAGE).expect("write");

        let loaded = PageRepository::load_page(&path).expect("load");
        assert_eq!(loaded.title, page.title);
        assert_eq!(loaded.fields.len(), page.fields.len());
    }

    #[test]
    fn test_load_missing_page() {
        let dir = tempdir().expect("tempdir");
        let result = PageRepository::load_page(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(PersistenceError::Read { .. })));
    }

    #[test]
    fn test_parse_rejects_inconsistent_page() {
        let json = r#"{
            "title": "Broken",
            "height": 10,
            "forms": [{"id": "f", "title": "F", "fields": ["nope"]}]
        }"#;
        assert!(matches!(
            PageRepository::parse_page(json),
            Err(PersistenceError::Page(DomainError::UnknownField(_)))
        ));
        assert!(matches!(
            PageRepository::parse_page("not json"),
            Err(PersistenceError::Format(_))
        ));
    }

    #[test]
    fn test_preference_round_trip() {
        let dir = tempdir().expect("tempdir");
        let mut store = FilePreferenceStore::new(dir.path().join("prefs.json"));
        assert_eq!(store.get_preference(), None);

        store.set_preference("dark").expect("write preference");
        assert_eq!(store.get_preference().as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_preferences_read_as_absent() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{{{").expect("write");
        let store = FilePreferenceStore::new(path);
        assert_eq!(store.get_preference(), None);
    }
}
