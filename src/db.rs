//! JSON-file document collections.
//!
//! Each collection is a map of documents keyed by Discord id, mirrored to one
//! pretty-printed JSON array on disk after every write.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Document {0} already exists")]
    Duplicate(u64),
}

pub trait Document: Serialize + DeserializeOwned + Clone + Send {
    fn id(&self) -> u64;
}

/// Per-guild settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildDocument {
    pub id: u64,
    pub daily_cash: i64,
    /// `0` means no log channel
    pub log_channel: u64,
}

impl GuildDocument {
    pub fn template(id: u64) -> Self {
        Self {
            id,
            daily_cash: 50,
            log_channel: 0,
        }
    }
}

impl Document for GuildDocument {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Per-user state that applies across all guilds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalUserDocument {
    pub id: u64,
    pub blacklisted: bool,
    pub blacklist_reason: String,
}

impl GlobalUserDocument {
    pub fn template(id: u64) -> Self {
        Self {
            id,
            blacklisted: false,
            blacklist_reason: String::new(),
        }
    }
}

impl Document for GlobalUserDocument {
    fn id(&self) -> u64 {
        self.id
    }
}

pub struct Collection<T> {
    path: PathBuf,
    docs: Mutex<BTreeMap<u64, T>>,
}

impl<T: Document> Collection<T> {
    /// Loads the collection from `path`. A missing file is an empty collection.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let docs = match fs::read_to_string(&path) {
            Ok(content) => {
                let list: Vec<T> =
                    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                list.into_iter().map(|doc| (doc.id(), doc)).collect()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            docs: Mutex::new(docs),
        })
    }

    pub fn find_one(&self, id: u64) -> Option<T> {
        self.docs.lock().get(&id).cloned()
    }

    pub fn insert_one(&self, doc: T) -> Result<(), StoreError> {
        let mut docs = self.docs.lock();
        let id = doc.id();
        if docs.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        docs.insert(id, doc);
        self.dump(&docs)
    }

    /// Applies `update` to the document with `id`. Returns `false` when there is
    /// no such document.
    pub fn update_one(&self, id: u64, update: impl FnOnce(&mut T)) -> Result<bool, StoreError> {
        let mut docs = self.docs.lock();
        let Some(doc) = docs.get_mut(&id) else {
            return Ok(false);
        };
        update(doc);
        self.dump(&docs)?;
        Ok(true)
    }

    /// Returns the document with `id`, inserting `template(id)` first if needed.
    pub fn find_or_insert(
        &self,
        id: u64,
        template: impl FnOnce(u64) -> T,
    ) -> Result<T, StoreError> {
        let mut docs = self.docs.lock();
        if let Some(doc) = docs.get(&id) {
            return Ok(doc.clone());
        }
        let doc = template(id);
        docs.insert(id, doc.clone());
        self.dump(&docs)?;
        Ok(doc)
    }

    /// Inserts from `template` on miss, then applies `update`, in one write.
    pub fn upsert_with(
        &self,
        id: u64,
        template: impl FnOnce(u64) -> T,
        update: impl FnOnce(&mut T),
    ) -> Result<T, StoreError> {
        let mut docs = self.docs.lock();
        let doc = docs.entry(id).or_insert_with(|| template(id));
        update(doc);
        let doc = doc.clone();
        self.dump(&docs)?;
        Ok(doc)
    }

    fn dump(&self, docs: &BTreeMap<u64, T>) -> Result<(), StoreError> {
        let list: Vec<&T> = docs.values().collect();
        let json = serde_json::to_string_pretty(&list).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

pub struct Database {
    pub guilds: Collection<GuildDocument>,
    pub users_global: Collection<GlobalUserDocument>,
}

impl Database {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            guilds: Collection::open(dir.join("guilds.json"))?,
            users_global: Collection::open(dir.join("users_global.json"))?,
        })
    }

    /// Blacklists the user with `reason`, or lifts the blacklist for `None`.
    /// Users without a document get one from the template in the same write.
    pub fn set_blacklist(
        &self,
        user_id: u64,
        reason: Option<&str>,
    ) -> Result<GlobalUserDocument, StoreError> {
        self.users_global
            .upsert_with(user_id, GlobalUserDocument::template, |user| {
                user.blacklisted = reason.is_some();
                user.blacklist_reason = reason.unwrap_or_default().to_string();
            })
    }

    /// Blacklist state for a user. Users without a document are not blacklisted.
    pub fn blacklist_reason(&self, user_id: u64) -> Option<String> {
        self.users_global
            .find_one(user_id)
            .filter(|user| user.blacklisted)
            .map(|user| user.blacklist_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_guilds(dir: &tempfile::TempDir) -> Collection<GuildDocument> {
        Collection::open(dir.path().join("g.json")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let guilds = open_guilds(&dir);
        assert!(guilds.find_one(1).is_none());
    }

    #[test]
    fn test_find_or_insert_uses_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let guilds = open_guilds(&dir);

        let doc = guilds.find_or_insert(7, GuildDocument::template).unwrap();
        assert_eq!(doc.daily_cash, 50);
        assert_eq!(doc.log_channel, 0);

        guilds.update_one(7, |g| g.daily_cash = 120).unwrap();
        let doc = guilds.find_or_insert(7, GuildDocument::template).unwrap();
        assert_eq!(doc.daily_cash, 120);
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        {
            let users: Collection<GlobalUserDocument> = Collection::open(&path).unwrap();
            users
                .upsert_with(42, GlobalUserDocument::template, |u| {
                    u.blacklisted = true;
                    u.blacklist_reason = "spam".to_string();
                })
                .unwrap();
        }

        let users: Collection<GlobalUserDocument> = Collection::open(&path).unwrap();
        let user = users.find_one(42).unwrap();
        assert!(user.blacklisted);
        assert_eq!(user.blacklist_reason, "spam");
    }

    #[test]
    fn test_insert_duplicate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let guilds = open_guilds(&dir);
        guilds.insert_one(GuildDocument::template(1)).unwrap();
        assert!(matches!(
            guilds.insert_one(GuildDocument::template(1)),
            Err(StoreError::Duplicate(1))
        ));
    }

    #[test]
    fn test_update_missing_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let guilds = open_guilds(&dir);
        assert!(!guilds.update_one(3, |g| g.daily_cash = 1).unwrap());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Collection::<GuildDocument>::open(&path),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn test_blacklist_reason() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        assert_eq!(db.blacklist_reason(5), None);

        db.users_global
            .upsert_with(5, GlobalUserDocument::template, |u| {
                u.blacklisted = true;
                u.blacklist_reason = "No reason provided".to_string();
            })
            .unwrap();
        assert_eq!(db.blacklist_reason(5).as_deref(), Some("No reason provided"));

        db.users_global.update_one(5, |u| u.blacklisted = false).unwrap();
        assert_eq!(db.blacklist_reason(5), None);
    }

    #[test]
    fn test_unblacklist_unknown_user_creates_document() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();

        let user = db.set_blacklist(9, None).unwrap();
        assert!(!user.blacklisted);
        assert_eq!(db.users_global.find_one(9), Some(GlobalUserDocument::template(9)));
        // a second lift on the same user is still a single upsert
        db.set_blacklist(9, None).unwrap();

        db.set_blacklist(9, Some("raiding")).unwrap();
        assert_eq!(db.blacklist_reason(9).as_deref(), Some("raiding"));
        let user = db.set_blacklist(9, None).unwrap();
        assert_eq!(user.blacklist_reason, "");
        assert_eq!(db.blacklist_reason(9), None);
    }
}
