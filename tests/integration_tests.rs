//! Integration tests for dialogue scripts and state resolution
//!
//! These tests drive complete conversations through the public API, using
//! both the in-memory and the file-backed store.

use chatflow_rs::script::{Dialogue, ScriptLoader, INPUT_KEY};
use chatflow_rs::{
    Context, EngineError, FileStore, MemoryStore, StateDefinition, StateEngine, UserDataStore,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn signup_script() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts/signup.yaml")
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn test_question_and_answer_in_one_state() {
    let answers = Arc::new(Mutex::new(Vec::<String>::new()));
    let answers_in_callback = answers.clone();

    let engine = StateEngine::new(vec![
        StateDefinition::new("ask")
            .action(|ctx| ctx.messages().append(&["How old are you?"]).is_ok())
            .callback(move |ctx| {
                let input = ctx.field(INPUT_KEY).unwrap_or_default();
                if input.parse::<u8>().is_err() {
                    let _ = ctx.messages().append(&["That's not a number."]);
                    return false;
                }
                answers_in_callback.lock().unwrap().push(input);
                true
            })
            .next("thanks"),
        StateDefinition::new("thanks").action(|ctx| {
            let _ = ctx.disarm_callback();
            ctx.messages().append(&["Thanks!"]).is_ok()
        }),
    ])
    .unwrap();

    let store = Arc::new(MemoryStore::new());
    let ctx = Context::for_user(store.clone(), "bob");

    assert!(engine.resolve(&ctx, "ask").unwrap());
    assert_eq!(ctx.messages().drain(), vec!["How old are you?"]);

    ctx.set_field(INPUT_KEY, "old").unwrap();
    assert!(!engine.resolve_current(&ctx, "ask").unwrap());
    assert_eq!(ctx.messages().drain(), vec!["That's not a number."]);

    ctx.set_field(INPUT_KEY, "42").unwrap();
    assert!(engine.resolve_current(&ctx, "ask").unwrap());
    assert_eq!(ctx.messages().drain(), vec!["Thanks!"]);

    assert_eq!(*answers.lock().unwrap(), vec!["42"]);
    assert_eq!(store.state_with_callback("bob").unwrap(), "");
}

#[test]
fn test_errors_surface_to_caller() {
    let engine = StateEngine::new(vec![
        StateDefinition::new("ok").action(|_| true),
        StateDefinition::new("no_action"),
    ])
    .unwrap();
    let store: Arc<dyn UserDataStore> = Arc::new(MemoryStore::new());

    let anonymous = Context::new(store.clone());
    assert!(matches!(
        engine.resolve(&anonymous, "ok"),
        Err(EngineError::NoActiveUser)
    ));

    let ctx = Context::for_user(store, "carol");
    assert!(matches!(
        engine.resolve(&ctx, "nope"),
        Err(EngineError::UnknownState { .. })
    ));
    assert!(matches!(
        engine.resolve(&ctx, "no_action"),
        Err(EngineError::MissingAction { .. })
    ));
}

// ============================================================================
// Scripts
// ============================================================================

#[test]
fn test_bundled_script_loads() {
    let def = ScriptLoader::new().load_script(signup_script()).unwrap();

    assert_eq!(def.name, "signup");
    assert_eq!(def.start_state(), Some("greet"));
    assert_eq!(def.states.len(), 3);
}

#[test]
fn test_signup_conversation() {
    let dialogue = Dialogue::from_file(signup_script()).unwrap();
    let ctx = Context::for_user(Arc::new(MemoryStore::new()), "ada");

    let turn = dialogue.turn(&ctx, None).unwrap();
    assert_eq!(
        turn.messages,
        vec!["Hi! I'm the signup bot.", "What's your name?"]
    );

    let turn = dialogue.turn(&ctx, Some("Ada")).unwrap();
    assert!(turn.accepted);
    assert_eq!(
        turn.messages,
        vec!["Nice to meet you, Ada. Which do you like more, red or blue?"]
    );

    let turn = dialogue.turn(&ctx, Some("purple")).unwrap();
    assert!(!turn.accepted);
    assert_eq!(turn.messages, vec!["Please answer red or blue."]);

    let turn = dialogue.turn(&ctx, Some("Red")).unwrap();
    assert!(turn.accepted);
    assert_eq!(turn.messages, vec!["Thanks Ada, red it is. Bye!"]);
    assert_eq!(turn.state, "done");
}

#[test]
fn test_conversation_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let dialogue = Dialogue::from_file(signup_script()).unwrap();
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let ctx = Context::for_user(store, "ada");

        dialogue.turn(&ctx, None).unwrap();
        dialogue.turn(&ctx, Some("Ada")).unwrap();
    }

    // Fresh engine and store, same directory
    let dialogue = Dialogue::from_file(signup_script()).unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    assert_eq!(store.state_with_callback("ada").unwrap(), "ask_color");

    let ctx = Context::for_user(store.clone(), "ada");
    let turn = dialogue.turn(&ctx, Some("blue")).unwrap();

    assert!(turn.accepted);
    assert_eq!(turn.messages, vec!["Thanks Ada, blue it is. Bye!"]);
    assert_eq!(store.field("ada", "color").unwrap(), "blue");
}

#[test]
fn test_users_progress_independently() {
    let dialogue = Dialogue::from_file(signup_script()).unwrap();
    let store: Arc<dyn UserDataStore> = Arc::new(MemoryStore::new());
    let ada = Context::for_user(store.clone(), "ada");
    let bob = Context::for_user(store.clone(), "bob");

    dialogue.turn(&ada, None).unwrap();
    dialogue.turn(&ada, Some("Ada")).unwrap();
    dialogue.turn(&bob, None).unwrap();

    assert_eq!(store.current_state("ada").unwrap(), "done");
    assert_eq!(store.current_state("bob").unwrap(), "ask_color");

    // Bob's pending callback still wants a name
    let turn = dialogue.turn(&bob, Some("B")).unwrap();
    assert!(!turn.accepted);
    assert_eq!(
        turn.messages,
        vec!["I need at least two letters for your name."]
    );
}

#[test]
fn test_reset_starts_over() {
    let dialogue = Dialogue::from_file(signup_script()).unwrap();
    let store = Arc::new(MemoryStore::new());
    let ctx = Context::for_user(store.clone(), "ada");

    dialogue.turn(&ctx, None).unwrap();
    dialogue.turn(&ctx, Some("Ada")).unwrap();
    store.reset("ada").unwrap();

    let turn = dialogue.turn(&ctx, None).unwrap();
    assert_eq!(turn.messages[1], "What's your name?");
    assert_eq!(turn.state, "ask_color");
}
