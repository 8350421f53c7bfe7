use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// Where the favorite set lives between page views
///
/// `read` returns `Ok(None)` when nothing was ever saved, and
/// `Err(Error::MalformedFavorites)` when something was saved but can't
/// be parsed. The store decides what to do with either.
pub trait FavoritesBackend {
    fn read(&self) -> crate::Result<Option<Vec<String>>>;
    fn write(&self, ids: &[String]) -> crate::Result<()>;
}

/// On-disk favorites, one JSON array of plugin ids
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Favorites file in the user data dir
    pub fn default_location() -> crate::Result<Self> {
        Ok(Self::new(crate::config::data_dir()?.join("favorites.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesBackend for JsonFileBackend {
    fn read(&self) -> crate::Result<Option<Vec<String>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        // Bytes, not a String: invalid UTF-8 is malformed state, not an IO failure
        let contents = std::fs::read(&self.path)?;
        let persisted: PersistedFavorites = serde_json::from_slice(&contents)
            .map_err(|e| crate::Error::MalformedFavorites(e.to_string()))?;
        Ok(Some(persisted.0))
    }

    fn write(&self, ids: &[String]) -> crate::Result<()> {
        // Create directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&PersistedFavorites(ids.to_vec()))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct PersistedFavorites(Vec<String>);

/// Favorites that live as long as the backend value does
///
/// Reads `Ok(None)` until the first write.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: RefCell<Option<Vec<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoritesBackend for MemoryBackend {
    fn read(&self) -> crate::Result<Option<Vec<String>>> {
        Ok(self.saved.borrow().clone())
    }

    fn write(&self, ids: &[String]) -> crate::Result<()> {
        *self.saved.borrow_mut() = Some(ids.to_vec());
        Ok(())
    }
}

/// The user's favorite plugins for the current session
///
/// Clones share one underlying set: hand a clone to every card on the
/// page and a toggle through any of them is seen by all the others on
/// their next read. Single-threaded on purpose, the only writer is the
/// user clicking things.
#[derive(Debug, Clone, Default)]
pub struct FavoritesStore {
    ids: Rc<RefCell<HashSet<String>>>,
}

impl FavoritesStore {
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Rc::new(RefCell::new(ids.into_iter().map(Into::into).collect())),
        }
    }

    /// Restore persisted favorites
    ///
    /// Never fails. Missing state is an empty set, and so is broken
    /// state - losing favorites beats refusing to render the page.
    pub fn load(backend: &dyn FavoritesBackend) -> Self {
        match backend.read() {
            Ok(Some(ids)) => {
                debug!(count = ids.len(), "Loaded favorites");
                Self::from_ids(ids)
            }
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable favorites");
                Self::default()
            }
        }
    }

    /// Write the current set so the next `load` gets it back
    pub fn persist(&self, backend: &dyn FavoritesBackend) -> crate::Result<()> {
        backend.write(&self.ids())
    }

    /// Add if absent, remove if present. Returns the new status.
    pub fn toggle(&self, plugin_id: &str) -> bool {
        let mut ids = self.ids.borrow_mut();
        if ids.remove(plugin_id) {
            false
        } else {
            ids.insert(plugin_id.to_string());
            true
        }
    }

    pub fn is_favorite(&self, plugin_id: &str) -> bool {
        self.ids.borrow().contains(plugin_id)
    }

    /// Snapshot of the current ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.borrow().iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let store = FavoritesStore::from_ids(["calendar"]);

        for id in ["calendar", "dataview"] {
            let before = store.is_favorite(id);
            store.toggle(id);
            assert_ne!(store.is_favorite(id), before);
            store.toggle(id);
            assert_eq!(store.is_favorite(id), before);
        }
    }

    #[test]
    fn test_toggle_returns_new_status() {
        let store = FavoritesStore::default();
        assert!(store.toggle("kanban"));
        assert!(!store.toggle("kanban"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_see_each_others_writes() {
        let page = FavoritesStore::default();
        let detail = page.clone();
        let card = page.clone();

        card.toggle("excalidraw");
        assert!(detail.is_favorite("excalidraw"));
        assert!(page.is_favorite("excalidraw"));

        detail.toggle("excalidraw");
        assert!(!card.is_favorite("excalidraw"));
    }

    #[test]
    fn test_set_semantics() {
        let store = FavoritesStore::from_ids(["a", "b", "a"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("favorites.json"));

        let store = FavoritesStore::load(&backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_persist_then_load() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested").join("favorites.json"));

        let store = FavoritesStore::default();
        store.toggle("templater");
        store.toggle("tasks");
        store.persist(&backend).unwrap();

        let reloaded = FavoritesStore::load(&backend);
        assert_eq!(reloaded.ids(), vec!["tasks".to_string(), "templater".to_string()]);
    }

    #[test]
    fn test_persisted_layout_is_plain_array() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("favorites.json"));

        FavoritesStore::from_ids(["b", "a"]).persist(&backend).unwrap();

        let raw = std::fs::read_to_string(backend.path()).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "{not json at all").unwrap();
        let backend = JsonFileBackend::new(&path);

        assert!(matches!(
            backend.read(),
            Err(crate::Error::MalformedFavorites(_))
        ));
        assert!(FavoritesStore::load(&backend).is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let backend = JsonFileBackend::new(&path);

        assert!(matches!(
            backend.read(),
            Err(crate::Error::MalformedFavorites(_))
        ));
        assert!(FavoritesStore::load(&backend).is_empty());
    }

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert!(backend.read().unwrap().is_none());
        assert!(FavoritesStore::load(&backend).is_empty());

        let store = FavoritesStore::load(&backend);
        store.toggle("dataview");
        store.toggle("calendar");
        store.persist(&backend).unwrap();

        let reloaded = FavoritesStore::load(&backend);
        assert_eq!(reloaded.ids(), vec!["calendar".to_string(), "dataview".to_string()]);

        reloaded.toggle("calendar");
        reloaded.persist(&backend).unwrap();
        assert_eq!(FavoritesStore::load(&backend).ids(), vec!["dataview".to_string()]);
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, r#"{"favorites": ["a"]}"#).unwrap();

        assert!(FavoritesStore::load(&JsonFileBackend::new(&path)).is_empty());
    }
}
