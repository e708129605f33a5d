// SPDX-License-Identifier: MIT

//! State definitions and the handler trait shared by actions and callbacks

use std::fmt;
use std::sync::Arc;

use super::context::Context;

/// Logic run by the engine on behalf of a state.
///
/// Returns `true` on success. Plain closures taking a `&Context` implement
/// this automatically.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &Context) -> bool;
}

impl<F> Handler for F
where
    F: Fn(&Context) -> bool + Send + Sync,
{
    fn handle(&self, ctx: &Context) -> bool {
        self(ctx)
    }
}

/// A named unit of dialogue logic
#[derive(Clone)]
pub struct StateDefinition {
    /// Unique, case-sensitive name
    pub name: String,
    /// Run when the state is resolved
    pub action: Option<Arc<dyn Handler>>,
    /// Run on the following turn to validate the reply to this state
    pub callback: Option<Arc<dyn Handler>>,
    /// State to move to after a successful action; `None` or empty stays put
    pub next: Option<String>,
}

impl StateDefinition {
    /// A state with no action, callback or next pointer yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: None,
            callback: None,
            next: None,
        }
    }

    pub fn action<F>(self, f: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.with_action(Arc::new(f))
    }

    pub fn callback<F>(self, f: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.with_callback(Arc::new(f))
    }

    /// Use an already shared handler as the action
    pub fn with_action(mut self, handler: Arc<dyn Handler>) -> Self {
        self.action = Some(handler);
        self
    }

    /// Use an already shared handler as the callback
    pub fn with_callback(mut self, handler: Arc<dyn Handler>) -> Self {
        self.callback = Some(handler);
        self
    }

    pub fn next(mut self, name: impl Into<String>) -> Self {
        self.next = Some(name.into());
        self
    }

    /// Next state, treating an empty name as "stay"
    pub fn next_state(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

impl fmt::Debug for StateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDefinition")
            .field("name", &self.name)
            .field("action", &self.action.is_some())
            .field("callback", &self.callback.is_some())
            .field("next", &self.next)
            .finish()
    }
}
