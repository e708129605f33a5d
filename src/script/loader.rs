//! Script loader - YAML file loading, parsing and reference checks

use super::types::ScriptDefinition;
use crate::error::ScriptError;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Loads dialogue scripts from YAML files
pub struct ScriptLoader;

impl ScriptLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and check a script from a YAML file
    pub fn load_script<P: AsRef<Path>>(&self, path: P) -> Result<ScriptDefinition, ScriptError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScriptError::FileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse and check a script from a YAML string
    pub fn parse_yaml(content: &str) -> Result<ScriptDefinition, ScriptError> {
        let def: ScriptDefinition = serde_yaml::from_str(content)?;
        Self::check(&def)?;
        Ok(def)
    }

    /// Verify names are unique and every reference points at a defined state
    fn check(def: &ScriptDefinition) -> Result<(), ScriptError> {
        if def.states.is_empty() {
            return Err(ScriptError::NoStates(def.name.clone()));
        }

        let mut names = HashSet::new();
        for state in &def.states {
            if !names.insert(state.name.as_str()) {
                return Err(ScriptError::DuplicateState(state.name.clone()));
            }
        }

        if let Some(start) = &def.start {
            if !names.contains(start.as_str()) {
                return Err(ScriptError::UnknownState {
                    from: def.name.clone(),
                    to: start.clone(),
                });
            }
        }

        for state in &def.states {
            match state.next.as_deref() {
                Some(next) if !next.is_empty() && !names.contains(next) => {
                    return Err(ScriptError::UnknownState {
                        from: state.name.clone(),
                        to: next.to_string(),
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}
