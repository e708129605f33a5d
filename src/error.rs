// SPDX-License-Identifier: MIT

//! Typed error handling for chatflow-rs
//!
//! Each layer owns its error enum: the persistence layer reports
//! `StoreError`, the state engine and message buffer report `EngineError`
//! (wrapping store failures unchanged), and script loading reports
//! `ScriptError`.

use thiserror::Error;

/// Errors raised while resolving states or touching the message buffer
#[derive(Debug, Error)]
pub enum EngineError {
    /// No user identifier is selected on the context
    #[error("No active user selected")]
    NoActiveUser,

    /// The requested state is not defined
    #[error("Unknown state '{name}'")]
    UnknownState { name: String },

    /// The state has no action to run
    #[error("State '{name}' has no action")]
    MissingAction { name: String },

    /// Two definitions share the same name
    #[error("Duplicate state '{name}'")]
    DuplicateState { name: String },

    /// Append called with zero messages
    #[error("No messages given")]
    EmptyInput,

    /// Failure in the user data store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The message buffer could not be encoded
    #[error("Failed to encode messages: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised by `UserDataStore` implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O errors from file-backed stores
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A persisted record could not be (de)serialized
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A lock guarding the store was poisoned by a panicking writer
    #[error("Store lock poisoned: {0}")]
    Poisoned(String),

    /// The user id cannot be used as a storage key
    #[error("Invalid user id '{0}'")]
    InvalidUser(String),
}

/// Errors raised while loading or compiling dialogue scripts
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script file does not exist
    #[error("Script file not found: {0}")]
    FileNotFound(String),

    /// I/O errors while reading the script
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// `start` or a `next` pointer names a state that does not exist
    #[error("State '{from}' refers to unknown state '{to}'")]
    UnknownState { from: String, to: String },

    /// Two states in the script share a name
    #[error("Duplicate state '{0}' in script")]
    DuplicateState(String),

    /// The script defines no states at all
    #[error("Script '{0}' defines no states")]
    NoStates(String),

    /// The compiled states were rejected by the engine
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl EngineError {
    /// Create an unknown state error
    pub fn unknown_state(name: impl Into<String>) -> Self {
        Self::UnknownState { name: name.into() }
    }

    /// Create a missing action error
    pub fn missing_action(name: impl Into<String>) -> Self {
        Self::MissingAction { name: name.into() }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Poisoned(err.to_string())
    }
}
