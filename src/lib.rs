// SPDX-License-Identifier: MIT

pub mod error;
pub mod machine;
pub mod script;
pub mod store;

pub use error::{EngineError, ScriptError, StoreError};
pub use machine::{Context, Handler, MessageBuffer, StateDefinition, StateEngine};
pub use store::{Data, FileStore, MemoryStore, UserDataStore};
