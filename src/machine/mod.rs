// SPDX-License-Identifier: MIT

//! Linear conversational state machine
//!
//! This module provides:
//! - `StateDefinition` - a named state with action, optional callback and next pointer
//! - `Context` - the user being served plus the store, created per call
//! - `StateEngine` - resolves states, gating each turn on the pending callback
//! - `MessageBuffer` - replies buffered in user data until the turn ends

mod context;
mod engine;
mod messages;
mod state;

pub use context::Context;
pub use engine::StateEngine;
pub use messages::{MessageBuffer, MESSAGES_KEY};
pub use state::{Handler, StateDefinition};
