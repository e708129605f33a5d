// SPDX-License-Identifier: MIT

//! Request-scoped engine context
//!
//! A `Context` pairs the user being served with a handle to the store. It is
//! built per call rather than kept on the engine, so one engine can serve
//! many users without any shared "current user".

use std::sync::Arc;

use super::messages::MessageBuffer;
use crate::error::EngineError;
use crate::store::{Data, UserDataStore};

/// The user being served and the store that holds their record
#[derive(Clone)]
pub struct Context {
    user: Option<String>,
    store: Arc<dyn UserDataStore>,
}

impl Context {
    /// A context with no user selected
    pub fn new(store: Arc<dyn UserDataStore>) -> Self {
        Self { user: None, store }
    }

    pub fn for_user(store: Arc<dyn UserDataStore>, user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            store,
        }
    }

    pub fn select_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    /// Selected user id; an empty id counts as no user
    pub fn user_id(&self) -> Result<&str, EngineError> {
        match self.user.as_deref() {
            Some(user) if !user.is_empty() => Ok(user),
            _ => Err(EngineError::NoActiveUser),
        }
    }

    pub fn store(&self) -> &dyn UserDataStore {
        self.store.as_ref()
    }

    pub fn current_state(&self) -> Result<String, EngineError> {
        Ok(self.store.current_state(self.user_id()?)?)
    }

    /// Name of the state whose callback will gate the next turn
    pub fn pending_callback(&self) -> Result<String, EngineError> {
        Ok(self.store.state_with_callback(self.user_id()?)?)
    }

    /// Clear the pending callback so the next turn is not gated
    pub fn disarm_callback(&self) -> Result<(), EngineError> {
        Ok(self.store.set_state_with_callback(self.user_id()?, "")?)
    }

    pub fn field(&self, key: &str) -> Result<String, EngineError> {
        Ok(self.store.field(self.user_id()?, key)?)
    }

    pub fn data(&self) -> Result<Data, EngineError> {
        Ok(self.store.data(self.user_id()?)?)
    }

    pub fn set_data(&self, data: &Data) -> Result<(), EngineError> {
        Ok(self.store.set_data(self.user_id()?, data)?)
    }

    pub fn set_field(&self, key: &str, value: impl Into<String>) -> Result<(), EngineError> {
        let data = Data::from([(key.to_string(), value.into())]);
        self.set_data(&data)
    }

    /// Message buffer of the selected user
    pub fn messages(&self) -> MessageBuffer<'_> {
        MessageBuffer::new(self)
    }
}
