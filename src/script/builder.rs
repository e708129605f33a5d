// SPDX-License-Identifier: MIT

//! Script builder - compiles script definitions into a runnable dialogue
//!
//! Every script state becomes a `StateDefinition`: `say` turns into an action
//! that buffers messages, `expect` into a callback that validates the
//! user's reply on the following turn.

use std::path::Path;

use super::loader::ScriptLoader;
use super::types::{Expectation, ScriptDefinition, ScriptState};
use crate::error::{EngineError, ScriptError};
use crate::machine::{Context, StateDefinition, StateEngine, MESSAGES_KEY};
use crate::store::Data;

/// Data key the caller stores the user's latest reply under
pub const INPUT_KEY: &str = "input";

const DEFAULT_RETRY: &str = "Sorry, I didn't get that.";

/// Result of one dialogue turn
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Whether the gate and the action both succeeded
    pub accepted: bool,
    /// Messages produced during the turn
    pub messages: Vec<String>,
    /// State the user is in after the turn
    pub state: String,
}

/// A compiled script, ready to serve users
#[derive(Debug)]
pub struct Dialogue {
    name: String,
    description: String,
    start: String,
    engine: StateEngine,
}

impl Dialogue {
    /// Load a script file and compile it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let def = ScriptLoader::new().load_script(path)?;
        Self::from_definition(&def)
    }

    /// Compile an already parsed script
    pub fn from_definition(def: &ScriptDefinition) -> Result<Self, ScriptError> {
        let start = def
            .start_state()
            .ok_or_else(|| ScriptError::NoStates(def.name.clone()))?
            .to_string();

        let states = def.states.iter().map(compile_state).collect();
        let engine = StateEngine::new(states)?;

        log::info!(
            "Compiled dialogue '{}' with {} states, starting at '{}'",
            def.name,
            engine.len(),
            start
        );

        Ok(Self {
            name: def.name.clone(),
            description: def.description.clone(),
            start,
            engine,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn engine(&self) -> &StateEngine {
        &self.engine
    }

    /// Run one turn for the context's user.
    ///
    /// `input` is stored under `INPUT_KEY` first so the pending callback can
    /// validate it. A turn without input clears the key, so an earlier reply
    /// is never taken as the answer to a later question.
    pub fn turn(&self, ctx: &Context, input: Option<&str>) -> Result<Turn, EngineError> {
        ctx.set_field(INPUT_KEY, input.unwrap_or_default())?;

        let accepted = self.engine.resolve_current(ctx, &self.start)?;

        Ok(Turn {
            accepted,
            messages: ctx.messages().drain(),
            state: ctx.current_state()?,
        })
    }
}

fn compile_state(state: &ScriptState) -> StateDefinition {
    let mut def = StateDefinition::new(&state.name).action(say_action(
        state.say.clone(),
        state.expect.is_none(),
    ));

    if let Some(expect) = &state.expect {
        def = def.callback(expect_callback(expect.clone()));
    }
    if let Some(next) = &state.next {
        def = def.next(next);
    }
    def
}

/// Buffers the state's messages. States that expect nothing also clear the
/// pending callback, so the reply they get is not checked again.
fn say_action(say: Vec<String>, disarm: bool) -> impl Fn(&Context) -> bool + Send + Sync {
    move |ctx| {
        if disarm {
            if let Err(e) = ctx.disarm_callback() {
                log::warn!("Failed to clear pending callback: {}", e);
                return false;
            }
        }
        if say.is_empty() {
            return true;
        }

        let data = ctx.data().unwrap_or_default();
        let lines: Vec<String> = say.iter().map(|line| render(line, &data)).collect();
        match ctx.messages().append(&lines) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to buffer messages: {}", e);
                false
            }
        }
    }
}

/// Consumes `INPUT_KEY`, stores the accepted value, or buffers the retry text
fn expect_callback(expect: Expectation) -> impl Fn(&Context) -> bool + Send + Sync {
    move |ctx| {
        let input = ctx.field(INPUT_KEY).unwrap_or_default();
        if let Err(e) = ctx.set_field(INPUT_KEY, "") {
            log::warn!("Failed to consume input: {}", e);
            return false;
        }

        let accepted = match accept(&expect, input.trim()) {
            Some(value) => value,
            None => {
                let retry = expect.retry.as_deref().unwrap_or(DEFAULT_RETRY);
                if let Err(e) = ctx.messages().append(&[retry]) {
                    log::warn!("Failed to buffer retry message: {}", e);
                }
                return false;
            }
        };

        match &expect.store_as {
            Some(key) => match ctx.set_field(key, accepted) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to store '{}': {}", key, e);
                    false
                }
            },
            None => true,
        }
    }
}

/// The value to keep for `input`, or `None` if it is rejected
fn accept(expect: &Expectation, input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    if let Some(min) = expect.min_length {
        if input.chars().count() < min {
            return None;
        }
    }
    if expect.choices.is_empty() {
        return Some(input.to_string());
    }
    expect
        .choices
        .iter()
        .find(|choice| choice.eq_ignore_ascii_case(input))
        .cloned()
}

/// Replace `{key}` placeholders with values from user data in one pass.
///
/// Substituted values are not scanned again. Unknown keys and the internal
/// `messages`/`input` keys are left as written.
fn render(template: &str, data: &Data) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        match placeholder(data, &after[..close]) {
            Some(value) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn placeholder<'a>(data: &'a Data, key: &str) -> Option<&'a str> {
    if key == MESSAGES_KEY || key == INPUT_KEY {
        return None;
    }
    data.get(key).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UserDataStore};
    use std::sync::Arc;

    const SCRIPT: &str = r#"
name: signup
description: Collects a name and a favourite color
states:
  - name: greet
    say: ["Hi! What's your name?"]
    expect:
      store_as: name
      min_length: 2
      retry: "Your name, please."
    next: ask_color
  - name: ask_color
    say: ["Nice to meet you, {name}. Red or blue?"]
    expect:
      store_as: color
      choices: [Red, Blue]
    next: done
  - name: done
    say: ["{name} likes {color}."]
"#;

    fn dialogue() -> Dialogue {
        let def = ScriptLoader::parse_yaml(SCRIPT).unwrap();
        Dialogue::from_definition(&def).unwrap()
    }

    #[test]
    fn test_compile() {
        let dialogue = dialogue();

        assert_eq!(dialogue.name(), "signup");
        assert_eq!(dialogue.start(), "greet");
        assert_eq!(dialogue.engine().len(), 3);
        assert!(dialogue.engine().state("greet").unwrap().callback.is_some());
        assert!(dialogue.engine().state("done").unwrap().callback.is_none());
    }

    #[test]
    fn test_full_conversation() {
        let dialogue = dialogue();
        let store = Arc::new(MemoryStore::new());
        let ctx = Context::for_user(store.clone(), "ada");

        let turn = dialogue.turn(&ctx, None).unwrap();
        assert!(turn.accepted);
        assert_eq!(turn.messages, vec!["Hi! What's your name?"]);
        assert_eq!(turn.state, "ask_color");

        let turn = dialogue.turn(&ctx, Some("A")).unwrap();
        assert!(!turn.accepted);
        assert_eq!(turn.messages, vec!["Your name, please."]);
        assert_eq!(turn.state, "ask_color");

        let turn = dialogue.turn(&ctx, Some("  Ada ")).unwrap();
        assert!(turn.accepted);
        assert_eq!(turn.messages, vec!["Nice to meet you, Ada. Red or blue?"]);
        assert_eq!(turn.state, "done");

        let turn = dialogue.turn(&ctx, Some("green")).unwrap();
        assert!(!turn.accepted);
        assert_eq!(turn.messages, vec![DEFAULT_RETRY]);

        let turn = dialogue.turn(&ctx, Some("blue")).unwrap();
        assert!(turn.accepted);
        assert_eq!(turn.messages, vec!["Ada likes Blue."]);
        assert_eq!(store.state_with_callback("ada").unwrap(), "");
    }

    #[test]
    fn test_accept_rules() {
        let free = Expectation::default();
        assert_eq!(accept(&free, "anything"), Some("anything".to_string()));
        assert_eq!(accept(&free, ""), None);

        let long = Expectation {
            min_length: Some(3),
            ..Default::default()
        };
        assert_eq!(accept(&long, "ab"), None);
        assert_eq!(accept(&long, "abc"), Some("abc".to_string()));

        let choice = Expectation {
            choices: vec!["Yes".to_string(), "No".to_string()],
            ..Default::default()
        };
        assert_eq!(accept(&choice, "yes"), Some("Yes".to_string()));
        assert_eq!(accept(&choice, "maybe"), None);
    }

    #[test]
    fn test_render() {
        let data = Data::from([
            ("name".to_string(), "Ada".to_string()),
            ("color".to_string(), "Red".to_string()),
        ]);

        assert_eq!(render("{name} likes {color}", &data), "Ada likes Red");
        assert_eq!(render("{unknown} stays", &data), "{unknown} stays");
        assert_eq!(render("{{name}}", &data), "{Ada}");
        assert_eq!(render("open {name", &data), "open {name");
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let data = Data::from([
            ("name".to_string(), "{color}".to_string()),
            ("color".to_string(), "Red".to_string()),
            (MESSAGES_KEY.to_string(), r#"["queued"]"#.to_string()),
            (INPUT_KEY.to_string(), "raw".to_string()),
        ]);

        assert_eq!(render("{name} / {color}", &data), "{color} / Red");
        assert_eq!(render("{messages} {input}", &data), "{messages} {input}");
    }

    #[test]
    fn test_turn_without_input_does_not_reuse_earlier_reply() {
        let yaml = r#"
name: travel
states:
  - name: ask_name
    say: ["Name?"]
    expect:
      store_as: name
    next: ask_city
  - name: ask_city
    say: ["City?"]
    expect:
      store_as: city
    next: done
  - name: done
    say: ["{name} from {city}"]
"#;
        let def = ScriptLoader::parse_yaml(yaml).unwrap();
        let dialogue = Dialogue::from_definition(&def).unwrap();
        let store = Arc::new(MemoryStore::new());
        let ctx = Context::for_user(store.clone(), "ada");

        dialogue.turn(&ctx, None).unwrap();
        let turn = dialogue.turn(&ctx, Some("Ada")).unwrap();
        assert_eq!(turn.messages, vec!["City?"]);

        let turn = dialogue.turn(&ctx, None).unwrap();
        assert!(!turn.accepted);
        assert_eq!(turn.messages, vec![DEFAULT_RETRY]);
        assert_eq!(store.field("ada", "city").unwrap(), "");
        assert_eq!(store.field("ada", "name").unwrap(), "Ada");

        let turn = dialogue.turn(&ctx, Some("Lima")).unwrap();
        assert!(turn.accepted);
        assert_eq!(turn.messages, vec!["Ada from Lima"]);
    }

    #[test]
    fn test_callback_consumes_input() {
        let dialogue = dialogue();
        let store = Arc::new(MemoryStore::new());
        let ctx = Context::for_user(store.clone(), "ada");

        dialogue.turn(&ctx, None).unwrap();
        dialogue.turn(&ctx, Some("Ada")).unwrap();

        assert_eq!(store.field("ada", INPUT_KEY).unwrap(), "");
    }
}
