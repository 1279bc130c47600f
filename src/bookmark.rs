//! Resumable reading progress, keyed by comic descriptor path.
//!
//! The viewer saves after every committed page change and reads once at
//! session start. Last writer wins; there are no concurrent writers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// What the viewer persists: the page plus the debug-overlay flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub page: usize,
    pub debug: bool,
}

/// Key to progress storage. Save is best-effort: implementations log
/// failures instead of surfacing them, and a failed load reads as "no prior
/// state".
pub trait ProgressStore {
    fn load(&self, key: &str) -> Option<Progress>;
    fn save(&mut self, key: &str, progress: Progress);
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Bookmark {
    pub page: usize,
    #[serde(default)]
    pub debug: bool,
    pub last_read: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Bookmarks {
    comics: HashMap<String, Bookmark>,
    #[serde(skip)]
    file_path: Option<String>,
}

impl Bookmarks {
    /// In-memory store; nothing survives the session.
    pub fn ephemeral() -> Self {
        Self {
            comics: HashMap::new(),
            file_path: None,
        }
    }

    pub fn with_file(file_path: &str) -> Self {
        Self {
            comics: HashMap::new(),
            file_path: Some(file_path.to_string()),
        }
    }

    pub fn load_or_ephemeral(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load bookmarks from {}: {}", path, e);
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut bookmarks: Self = serde_json::from_str(&content)?;
            bookmarks.file_path = Some(file_path.to_string());
            Ok(bookmarks)
        } else {
            Ok(Self::with_file(file_path))
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        match &self.file_path {
            Some(path) => {
                let content = serde_json::to_string_pretty(self)?;
                fs::write(path, content)?;
                Ok(())
            }
            // ephemeral stores have nowhere to save to
            None => Ok(()),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Bookmark> {
        self.comics.get(path)
    }

    pub fn most_recent(&self) -> Option<(String, &Bookmark)> {
        self.comics
            .iter()
            .max_by_key(|(_, bookmark)| bookmark.last_read)
            .map(|(path, bookmark)| (path.clone(), bookmark))
    }

    pub fn update(&mut self, path: &str, page: usize, debug: bool) {
        self.comics.insert(
            path.to_string(),
            Bookmark {
                page,
                debug,
                last_read: Utc::now(),
            },
        );
        if self.file_path.is_some() {
            if let Err(e) = Bookmarks::save(self) {
                log::error!("Failed to save bookmark: {}", e);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bookmark)> {
        self.comics.iter()
    }
}

impl ProgressStore for Bookmarks {
    fn load(&self, key: &str) -> Option<Progress> {
        self.get(key).map(|b| Progress {
            page: b.page,
            debug: b.debug,
        })
    }

    fn save(&mut self, key: &str, progress: Progress) {
        self.update(key, progress.page, progress.debug);
    }
}

/// Shared handle so the app can keep a view on the store it hands to the
/// viewer. A poisoned lock reads as no prior state and drops the write.
impl ProgressStore for Arc<Mutex<Bookmarks>> {
    fn load(&self, key: &str) -> Option<Progress> {
        let guard = self.lock().ok()?;
        guard.load(key)
    }

    fn save(&mut self, key: &str, progress: Progress) {
        match self.lock() {
            Ok(mut guard) => guard.update(key, progress.page, progress.debug),
            Err(e) => log::error!("Bookmark store lock poisoned: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_store_round_trips_without_a_file() {
        let mut bookmarks = Bookmarks::ephemeral();
        let store: &mut dyn ProgressStore = &mut bookmarks;
        assert_eq!(store.load("a.json"), None);

        store.save(
            "a.json",
            Progress {
                page: 4,
                debug: true,
            },
        );
        assert_eq!(
            store.load("a.json"),
            Some(Progress {
                page: 4,
                debug: true,
            })
        );
    }

    #[test]
    fn update_overwrites_previous_progress() {
        let mut store = Bookmarks::ephemeral();
        store.update("a.json", 1, false);
        store.update("a.json", 7, true);

        let bookmark = store.get("a.json").unwrap();
        assert_eq!(bookmark.page, 7);
        assert!(bookmark.debug);
    }

    #[test]
    fn file_backed_store_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");
        let path_str = path.to_string_lossy().into_owned();

        let mut store = Bookmarks::load_or_ephemeral(Some(&path_str));
        store.update("first.json", 0, false);
        store.update("other.json", 12, true);

        let reloaded = Bookmarks::load_from_file(&path_str).unwrap();
        assert_eq!(reloaded.get("other.json").unwrap().page, 12);
        assert!(reloaded.get("other.json").unwrap().debug);
        assert_eq!(reloaded.get("first.json").unwrap().page, 0);
    }

    #[test]
    fn unreadable_file_falls_back_to_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(&path, "{definitely not json").unwrap();
        let path_str = path.to_string_lossy().into_owned();

        let store = Bookmarks::load_or_ephemeral(Some(&path_str));
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn most_recent_prefers_latest_timestamp() {
        let json = r#"{
            "comics": {
                "old.json": {"page": 3, "last_read": "2026-01-01T10:00:00Z"},
                "new.json": {"page": 8, "debug": true, "last_read": "2026-06-15T10:00:00Z"}
            }
        }"#;
        let store: Bookmarks = serde_json::from_str(json).unwrap();

        let (path, bookmark) = store.most_recent().unwrap();
        assert_eq!(path, "new.json");
        assert_eq!(bookmark.page, 8);
    }

    #[test]
    fn shared_handle_reads_and_writes_the_same_store() {
        let shared = Arc::new(Mutex::new(Bookmarks::ephemeral()));
        let mut handle: Arc<Mutex<Bookmarks>> = Arc::clone(&shared);

        handle.save(
            "a.json",
            Progress {
                page: 2,
                debug: false,
            },
        );
        assert_eq!(shared.lock().unwrap().get("a.json").unwrap().page, 2);
    }
}
