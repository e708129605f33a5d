use anyhow::Context as _;
use chatflow_rs::script::{Dialogue, Turn};
use chatflow_rs::{Context, FileStore, UserDataStore};
use clap::{Parser, Subcommand};
use dotenv::dotenv;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_STORE_DIR: &str = ".chatflow";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding user records (defaults to $CHATFLOW_STORE_DIR or .chatflow)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with a script interactively
    Chat {
        /// Path to the dialogue script
        #[arg(short = 'f', long)]
        script: PathBuf,

        /// User id; a random one is generated when omitted
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Run a single turn and print the replies
    Turn {
        /// Path to the dialogue script
        #[arg(short = 'f', long)]
        script: PathBuf,

        /// User id
        #[arg(short, long)]
        user: String,

        /// The user's reply for this turn
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Forget everything stored for a user
    Reset {
        /// User id
        #[arg(short, long)]
        user: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let store_dir = args
        .store
        .or_else(|| std::env::var("CHATFLOW_STORE_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
    let store = Arc::new(
        FileStore::open(&store_dir)
            .with_context(|| format!("Failed to open store at {}", store_dir.display()))?,
    );
    log::info!("Using store: {}", store_dir.display());

    match args.command {
        Commands::Chat { script, user } => {
            let dialogue = load_dialogue(&script)?;
            let user = user.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let ctx = Context::for_user(store, user.clone());

            println!("Chatting with '{}' as {} (/quit to leave)", dialogue.name(), user);
            print_turn(&dialogue.turn(&ctx, None)?);

            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("Failed to read from stdin")?;
                if line.trim() == "/quit" {
                    break;
                }
                print_turn(&dialogue.turn(&ctx, Some(&line))?);
            }
        }
        Commands::Turn {
            script,
            user,
            input,
        } => {
            let dialogue = load_dialogue(&script)?;
            let ctx = Context::for_user(store, user);

            let turn = dialogue.turn(&ctx, input.as_deref())?;
            print_turn(&turn);
            if !turn.accepted {
                log::info!("Turn not accepted, still in '{}'", turn.state);
            }
        }
        Commands::Reset { user } => {
            store
                .reset(&user)
                .with_context(|| format!("Failed to reset user {}", user))?;
            println!("Reset {}", user);
        }
    }

    Ok(())
}

fn load_dialogue(path: &Path) -> anyhow::Result<Dialogue> {
    Dialogue::from_file(path)
        .with_context(|| format!("Failed to load script {}", path.display()))
}

fn print_turn(turn: &Turn) {
    let mut out = io::stdout().lock();
    for message in &turn.messages {
        // Nothing sensible to do if stdout is gone
        let _ = writeln!(out, "bot> {}", message);
    }
    let _ = out.flush();
}
