// SPDX-License-Identifier: MIT

//! Per-user persistence for dialogue state
//!
//! This module provides:
//! - `UserDataStore` - the contract the state engine persists through
//! - `MemoryStore` - in-process store, mostly for tests and single runs
//! - `FileStore` - one JSON document per user, survives restarts

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::StoreError;

/// Free-form string data kept for a user
pub type Data = HashMap<String, String>;

/// Everything persisted for a single user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserRecord {
    /// Name of the state the user is in
    #[serde(default)]
    pub current_state: String,
    /// State whose callback gates the next turn (empty = none)
    #[serde(default)]
    pub state_with_callback: String,
    /// Arbitrary key/value fields
    #[serde(default)]
    pub data: Data,
}

impl UserRecord {
    /// Merge `data` into the record, overwriting existing keys
    pub fn merge(&mut self, data: &Data) {
        for (key, value) in data {
            self.data.insert(key.clone(), value.clone());
        }
    }
}

/// Durable read/write of user records, keyed by user id.
///
/// Unknown users read as an empty record. Implementations must be safe to
/// share between threads; serializing access for one user is the caller's job.
pub trait UserDataStore: Send + Sync {
    fn current_state(&self, user: &str) -> Result<String, StoreError>;

    fn set_current_state(&self, user: &str, name: &str) -> Result<(), StoreError>;

    fn state_with_callback(&self, user: &str) -> Result<String, StoreError>;

    fn set_state_with_callback(&self, user: &str, name: &str) -> Result<(), StoreError>;

    /// Merge keys into the user's data map
    fn set_data(&self, user: &str, data: &Data) -> Result<(), StoreError>;

    /// Value of a single data key, empty when absent
    fn field(&self, user: &str, key: &str) -> Result<String, StoreError>;

    /// Snapshot of the whole data map
    fn data(&self, user: &str) -> Result<Data, StoreError>;

    /// Forget everything stored for the user
    fn reset(&self, user: &str) -> Result<(), StoreError>;
}
