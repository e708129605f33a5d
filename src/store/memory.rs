// SPDX-License-Identifier: MIT

//! In-memory user data store

use std::collections::HashMap;
use std::sync::RwLock;

use super::{Data, UserDataStore, UserRecord};
use crate::error::StoreError;

/// User records held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the record stored for `user`, if any
    pub fn record(&self, user: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read()?;
        Ok(users.get(user).cloned())
    }

    fn read<T>(&self, user: &str, f: impl FnOnce(&UserRecord) -> T) -> Result<T, StoreError> {
        let users = self.users.read()?;
        Ok(match users.get(user) {
            Some(record) => f(record),
            None => f(&UserRecord::default()),
        })
    }

    fn write(&self, user: &str, f: impl FnOnce(&mut UserRecord)) -> Result<(), StoreError> {
        let mut users = self.users.write()?;
        f(users.entry(user.to_string()).or_default());
        Ok(())
    }
}

impl UserDataStore for MemoryStore {
    fn current_state(&self, user: &str) -> Result<String, StoreError> {
        self.read(user, |r| r.current_state.clone())
    }

    fn set_current_state(&self, user: &str, name: &str) -> Result<(), StoreError> {
        self.write(user, |r| r.current_state = name.to_string())
    }

    fn state_with_callback(&self, user: &str) -> Result<String, StoreError> {
        self.read(user, |r| r.state_with_callback.clone())
    }

    fn set_state_with_callback(&self, user: &str, name: &str) -> Result<(), StoreError> {
        self.write(user, |r| r.state_with_callback = name.to_string())
    }

    fn set_data(&self, user: &str, data: &Data) -> Result<(), StoreError> {
        self.write(user, |r| r.merge(data))
    }

    fn field(&self, user: &str, key: &str) -> Result<String, StoreError> {
        self.read(user, |r| r.data.get(key).cloned().unwrap_or_default())
    }

    fn data(&self, user: &str) -> Result<Data, StoreError> {
        self.read(user, |r| r.data.clone())
    }

    fn reset(&self, user: &str) -> Result<(), StoreError> {
        let mut users = self.users.write()?;
        users.remove(user);
        Ok(())
    }
}
