use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

use crate::models::Favorites;

pub const FAVORITES_KEY: &str = "tmdb_favs_v1";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    failing_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        Self {
            failing_writes: true,
            ..Self::default()
        }
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.failing_writes {
            return Err(anyhow!("storage quota exceeded"));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone)]
pub struct FavoritesPersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl FavoritesPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: FAVORITES_KEY.to_string(),
        }
    }

    pub fn file_backed(dir: &Path) -> Self {
        Self::new(Arc::new(FileStore::new(dir)))
    }

    pub fn load(&self) -> Favorites {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Favorites::new(),
            Err(e) => {
                error!("Failed to read favorites: {:#}", e);
                return Favorites::new();
            }
        };
        match serde_json::from_str::<Favorites>(&raw) {
            Ok(favorites) => {
                debug!("Loaded {} favorites", favorites.len());
                favorites
            }
            Err(e) => {
                warn!("Stored favorites are corrupt, starting empty: {}", e);
                Favorites::new()
            }
        }
    }

    pub fn save(&self, favorites: &Favorites) {
        let encoded = match serde_json::to_string(favorites) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to encode favorites: {}", e);
                return;
            }
        };
        match self.store.set(&self.key, &encoded) {
            Ok(()) => debug!("Favorites saved ({})", favorites.len()),
            Err(e) => error!("Failed to save favorites: {:#}", e),
        }
    }
}
