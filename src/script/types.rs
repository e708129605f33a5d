// SPDX-License-Identifier: MIT

//! YAML schema types for dialogue scripts

use serde::{Deserialize, Serialize};

/// Top-level dialogue script
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScriptDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// State used when the user has no current state; defaults to the first one
    pub start: Option<String>,
    pub states: Vec<ScriptState>,
}

impl ScriptDefinition {
    /// Name of the entry state
    pub fn start_state(&self) -> Option<&str> {
        self.start
            .as_deref()
            .or_else(|| self.states.first().map(|s| s.name.as_str()))
    }
}

/// One state of a script
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScriptState {
    pub name: String,
    /// Messages sent when the state runs; `{key}` is replaced by user data
    #[serde(default)]
    pub say: Vec<String>,
    /// State to move to afterwards
    pub next: Option<String>,
    /// Validation applied to the user's reply on the following turn
    pub expect: Option<Expectation>,
}

/// How to validate and keep the reply to a state
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Expectation {
    /// Data key to store the accepted reply under
    pub store_as: Option<String>,
    /// Accepted answers, compared case-insensitively
    #[serde(default)]
    pub choices: Vec<String>,
    /// Minimum number of characters
    pub min_length: Option<usize>,
    /// Message sent when the reply is rejected
    pub retry: Option<String>,
}
