// SPDX-License-Identifier: MIT

//! State engine: callback gating, action execution and transitions

use std::collections::HashMap;

use super::context::Context;
use super::state::StateDefinition;
use crate::error::EngineError;

/// Runs named states for a user, gating each turn on the pending callback
#[derive(Debug)]
pub struct StateEngine {
    states: Vec<StateDefinition>,
    index: HashMap<String, usize>, // name -> position in `states`
}

impl StateEngine {
    /// Create an engine from state definitions; names must be unique
    pub fn new(states: Vec<StateDefinition>) -> Result<Self, EngineError> {
        let mut index = HashMap::with_capacity(states.len());
        for (i, state) in states.iter().enumerate() {
            if index.insert(state.name.clone(), i).is_some() {
                return Err(EngineError::DuplicateState {
                    name: state.name.clone(),
                });
            }
        }

        log::debug!("State engine created with {} states", states.len());
        Ok(Self { states, index })
    }

    /// Look up a state by exact name
    pub fn state(&self, name: &str) -> Option<&StateDefinition> {
        self.index.get(name).map(|&i| &self.states[i])
    }

    /// State names in declaration order
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Resolve the state named `name` for the context's user.
    ///
    /// The stored `current_state` is set to `name` before anything runs. If
    /// a callback is pending it gates the turn: a `false` from it returns
    /// `Ok(false)` without running this state's action, whatever `name` is.
    /// Once the gate passes, a state with its own callback arms it for the
    /// next turn, the action runs, and on success `current_state` moves to
    /// `next`.
    pub fn resolve(&self, ctx: &Context, name: &str) -> Result<bool, EngineError> {
        let state = self
            .state(name)
            .ok_or_else(|| EngineError::unknown_state(name))?;
        let user = ctx.user_id()?;
        let action = state
            .action
            .as_ref()
            .ok_or_else(|| EngineError::missing_action(name))?;

        let store = ctx.store();
        store.set_current_state(user, &state.name)?;

        if !self.run_pending_callback(ctx, user)? {
            log::info!("Callback gate rejected turn for '{}' ({})", name, user);
            return Ok(false);
        }

        if state.callback.is_some() {
            store.set_state_with_callback(user, &state.name)?;
        }

        let succeeded = action.handle(ctx);
        log::debug!("Action of '{}' returned {} for {}", name, succeeded, user);

        if succeeded {
            if let Some(next) = state.next_state() {
                store.set_current_state(user, next)?;
                log::debug!("{} moved from '{}' to '{}'", user, name, next);
            }
        }

        Ok(succeeded)
    }

    /// Resolve the user's stored `current_state`, or `fallback` if none is stored
    pub fn resolve_current(&self, ctx: &Context, fallback: &str) -> Result<bool, EngineError> {
        let current = ctx.current_state()?;
        let name = if current.is_empty() {
            fallback
        } else {
            current.as_str()
        };
        self.resolve(ctx, name)
    }

    /// Run the callback of the state named in `state_with_callback`.
    ///
    /// Passes when nothing is pending, or when the pending state is unknown
    /// or has no callback.
    fn run_pending_callback(&self, ctx: &Context, user: &str) -> Result<bool, EngineError> {
        let pending = ctx.store().state_with_callback(user)?;
        if pending.is_empty() {
            return Ok(true);
        }

        match self.state(&pending).and_then(|s| s.callback.as_ref()) {
            Some(callback) => {
                let passed = callback.handle(ctx);
                log::debug!("Callback of '{}' returned {} for {}", pending, passed, user);
                Ok(passed)
            }
            None => {
                if self.state(&pending).is_none() {
                    log::warn!("Pending callback names unknown state '{}'", pending);
                }
                Ok(true)
            }
        }
    }
}
