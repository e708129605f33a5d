// SPDX-License-Identifier: MIT

//! YAML dialogue scripts
//!
//! A script lists states with the messages they send, the reply they expect
//! and the state that follows. `Dialogue` compiles it onto a `StateEngine`.

pub mod builder;
pub mod loader;
pub mod types;

pub use builder::{Dialogue, Turn, INPUT_KEY};
pub use loader::ScriptLoader;
pub use types::{Expectation, ScriptDefinition, ScriptState};
