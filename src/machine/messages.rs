// SPDX-License-Identifier: MIT

//! Outgoing message buffer kept in user data
//!
//! Handlers append replies during a turn and the caller drains them once the
//! turn is over. The buffer is a JSON array of strings under the
//! `messages` key.

use super::context::Context;
use crate::error::EngineError;

/// Data key holding the encoded buffer
pub const MESSAGES_KEY: &str = "messages";

/// Message buffer of the context's user
pub struct MessageBuffer<'a> {
    ctx: &'a Context,
}

impl<'a> MessageBuffer<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Append messages after the ones already buffered, keeping order.
    ///
    /// The buffer is written once; if that write fails the previously
    /// buffered messages are left as they were. An undecodable buffer is
    /// replaced, like `drain` discards it.
    pub fn append<S: AsRef<str>>(&self, messages: &[S]) -> Result<(), EngineError> {
        if messages.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let mut buffered = decode(&self.ctx.field(MESSAGES_KEY)?);
        buffered.extend(messages.iter().map(|m| m.as_ref().to_string()));

        let encoded = serde_json::to_string(&buffered)?;
        self.ctx.set_field(MESSAGES_KEY, encoded)
    }

    /// Take every buffered message, leaving the buffer empty.
    ///
    /// Never fails: a missing, unreadable or corrupted buffer yields an empty
    /// list, indistinguishable from "no messages".
    pub fn drain(&self) -> Vec<String> {
        let raw = match self.ctx.field(MESSAGES_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Could not read message buffer: {}", e);
                return Vec::new();
            }
        };

        if let Err(e) = self.ctx.set_field(MESSAGES_KEY, "") {
            log::warn!("Could not clear message buffer: {}", e);
        }

        decode(&raw)
    }
}

fn decode(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        log::warn!("Discarding undecodable message buffer: {}", e);
        Vec::new()
    })
}
