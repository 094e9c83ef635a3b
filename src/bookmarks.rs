//! per-title bookmarks over a key-value store

use {
    crate::{FlipbookError, Result},
    hashbrown::HashMap,
    std::{
        cell::RefCell,
        collections::BTreeMap,
        fs,
        path::{Path, PathBuf},
    },
};

/// a string key/value store that survives restarts
pub trait Storage {
    /// value under `key`, `None` when never written
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// replaces the value under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// keeps each key in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// stores files under `dir`, created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data_dir>/flipbook/storage`
    pub fn in_data_dir() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| FlipbookError::Storage("could not determine data directory".into()))?;
        Ok(Self::new(dir.join("flipbook").join("storage")))
    }

    /// directory holding the json files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// in-memory store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// every book's bookmarks, keyed by title
pub type BookmarkMap = BTreeMap<String, Vec<usize>>;

/// reads the whole map stored under `key`
pub fn load_all(storage: &dyn Storage, key: &str) -> Result<BookmarkMap> {
    match storage.get_item(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(BookmarkMap::new()),
    }
}

/// overwrites the whole map stored under `key`
pub fn save_all(storage: &dyn Storage, key: &str, all: &BookmarkMap) -> Result<()> {
    storage.set_item(key, &serde_json::to_string(all)?)
}

/// the bookmarked pages of one book
///
/// pages are 1-based, sorted ascending and unique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmarks {
    key: String,
    title: String,
    pages: Vec<usize>,
}

impl Bookmarks {
    /// loads the list for `title`, starting empty if storage is unreadable
    pub fn load(storage: &dyn Storage, key: &str, title: &str) -> Self {
        let mut pages = match load_all(storage, key) {
            Ok(mut all) => all.remove(title).unwrap_or_default(),
            Err(e) => {
                log::warn!("could not load bookmarks: {e}");
                Vec::new()
            }
        };
        pages.sort_unstable();
        pages.dedup();

        Self {
            key: key.to_string(),
            title: title.to_string(),
            pages,
        }
    }

    /// book these bookmarks belong to
    pub fn title(&self) -> &str {
        &self.title
    }

    /// bookmarked pages, ascending
    pub fn pages(&self) -> &[usize] {
        &self.pages
    }

    /// whether `page` is bookmarked
    pub fn contains(&self, page: usize) -> bool {
        self.pages.binary_search(&page).is_ok()
    }

    /// adds or removes `page`, returns whether it is now bookmarked
    pub fn toggle(&mut self, page: usize, storage: &dyn Storage) -> bool {
        let bookmarked = match self.pages.binary_search(&page) {
            Ok(index) => {
                self.pages.remove(index);
                false
            }
            Err(index) => {
                self.pages.insert(index, page);
                true
            }
        };

        self.persist(storage);
        bookmarked
    }

    /// removes `page`, returns whether it was there
    pub fn remove(&mut self, page: usize, storage: &dyn Storage) -> bool {
        let Ok(index) = self.pages.binary_search(&page) else {
            return false;
        };

        self.pages.remove(index);
        self.persist(storage);
        true
    }

    /// drops every bookmark of this book
    pub fn clear(&mut self, storage: &dyn Storage) {
        self.pages.clear();
        self.persist(storage);
    }

    fn persist(&self, storage: &dyn Storage) {
        let result = load_all(storage, &self.key).and_then(|mut all| {
            all.insert(self.title.clone(), self.pages.clone());
            save_all(storage, &self.key, &all)
        });

        if let Err(e) = result {
            log::warn!("could not save bookmarks: {e}");
        }
    }
}
