// SPDX-License-Identifier: MIT

//! File-backed user data store
//!
//! Each user is one pretty-printed JSON document `<dir>/<user>.json`.
//! Writes go to a temporary sibling first and are renamed into place so a
//! crash never leaves a half-written record behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Data, UserDataStore, UserRecord};
use crate::error::StoreError;

/// Stores user records as JSON files in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        log::debug!("Opened file store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user: &str) -> Result<PathBuf, StoreError> {
        if user.is_empty() || user == "." || user == ".." || user.contains(['/', '\\', '\0']) {
            return Err(StoreError::InvalidUser(user.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", user)))
    }

    /// Load the record for `user`, empty if the user has never been written
    pub fn load(&self, user: &str) -> Result<UserRecord, StoreError> {
        let path = self.path_for(user)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(UserRecord::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &str, record: &UserRecord) -> Result<(), StoreError> {
        let path = self.path_for(user)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn update(&self, user: &str, f: impl FnOnce(&mut UserRecord)) -> Result<(), StoreError> {
        let mut record = self.load(user)?;
        f(&mut record);
        self.save(user, &record)
    }
}

impl UserDataStore for FileStore {
    fn current_state(&self, user: &str) -> Result<String, StoreError> {
        Ok(self.load(user)?.current_state)
    }

    fn set_current_state(&self, user: &str, name: &str) -> Result<(), StoreError> {
        self.update(user, |r| r.current_state = name.to_string())
    }

    fn state_with_callback(&self, user: &str) -> Result<String, StoreError> {
        Ok(self.load(user)?.state_with_callback)
    }

    fn set_state_with_callback(&self, user: &str, name: &str) -> Result<(), StoreError> {
        self.update(user, |r| r.state_with_callback = name.to_string())
    }

    fn set_data(&self, user: &str, data: &Data) -> Result<(), StoreError> {
        self.update(user, |r| r.merge(data))
    }

    fn field(&self, user: &str, key: &str) -> Result<String, StoreError> {
        Ok(self.load(user)?.data.remove(key).unwrap_or_default())
    }

    fn data(&self, user: &str) -> Result<Data, StoreError> {
        Ok(self.load(user)?.data)
    }

    fn reset(&self, user: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(user)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
