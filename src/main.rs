//! navigatorx - inspect and exercise persisted keyboard shortcuts
//!
//! # Usage
//!
//! ```bash
//! navigatorx register docs control d --navigate /docs
//! navigatorx replay events.jsonl
//! navigatorx list
//! navigatorx clear
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use navigatorx::config::{self, NavigatorOptions};
use navigatorx::logging;
use navigatorx::shortcuts::{
    back_action, custom_action, navigate_action, parse_persisted, ActionData, FileStorage,
    HistoryNavigator, InputEvent, NavigatorX, ShortcutKeys, Storage,
};
use navigatorx::NavigatorError;

#[derive(Parser)]
#[command(name = "navigatorx")]
#[command(about = "Keyboard chord shortcuts with persisted actions")]
struct Cli {
    /// Storage slot (defaults to the configured key)
    #[arg(long, global = true)]
    storage_key: Option<String>,

    /// Directory holding storage files (defaults to ~/.navigatorx/storage)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print persisted shortcuts
    List,

    /// Replay JSON input events (one per line) against the persisted shortcuts
    Replay {
        /// File with one event object per line
        events: PathBuf,

        /// Starting location of the navigator
        #[arg(long, default_value = "/")]
        start: String,
    },

    /// Register a shortcut with a persistable action
    Register {
        id: String,
        /// Shift, Control, Alt or Meta (aliases like ctrl/cmd accepted)
        modifier: String,
        key: String,
        #[command(flatten)]
        action: ActionArgs,
    },

    /// Remove a persisted shortcut
    Unregister { id: String },

    /// Delete the persisted record entirely
    Clear,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ActionArgs {
    /// Navigate to URL
    #[arg(long)]
    navigate: Option<String>,

    /// Go back, or to FALLBACK when there is no history
    #[arg(long, num_args = 0..=1, default_missing_value = "/")]
    back: Option<String>,

    /// Log MESSAGE
    #[arg(long)]
    custom: Option<String>,
}

impl ActionArgs {
    fn into_action_data(self) -> Option<ActionData> {
        if let Some(url) = self.navigate {
            return Some(navigate_action(url));
        }
        if let Some(fallback) = self.back {
            return Some(back_action(Some(&fallback)));
        }
        self.custom.map(custom_action)
    }
}

fn resolve_options(cli: &Cli) -> NavigatorOptions {
    let mut options = config::load_config();
    if let Some(key) = &cli.storage_key {
        options.storage_key = key.clone();
    }
    if let Some(dir) = &cli.storage_dir {
        options.storage_dir = Some(dir.to_string_lossy().into_owned());
    }
    options
}

fn open_engine(options: &NavigatorOptions, history: &HistoryNavigator) -> NavigatorX {
    NavigatorX::new(
        options.clone(),
        FileStorage::new(config::storage_dir(options)),
        Rc::new(history.clone()),
    )
}

fn list(options: &NavigatorOptions) -> Result<()> {
    let storage = FileStorage::new(config::storage_dir(options));
    let Some(text) = storage
        .get(&options.storage_key)
        .context("Failed to read shortcut storage")?
    else {
        println!("No shortcuts stored under '{}'", options.storage_key);
        return Ok(());
    };

    let state = parse_persisted(&text).context("Stored shortcuts are not valid JSON")?;
    for (id, record) in state.records {
        let action = match (&record.action_data, &record.unrecognized_action) {
            (Some(data), _) => serde_json::to_string(data)?,
            (None, Some(raw)) => format!("(unrecognized) {}", raw),
            (None, None) => "(not restorable)".to_string(),
        };
        println!("{:<20} {:<12} {}", id, record.keys.display(), action);
    }
    for (id, raw) in state.retained {
        println!("{:<20} {:<12} {}", id, "(unreadable)", raw);
    }
    Ok(())
}

fn replay(options: &NavigatorOptions, events: &Path, start: &str) -> Result<()> {
    let content = fs::read_to_string(events)
        .with_context(|| format!("Failed to read events file: {}", events.display()))?;

    let history = HistoryNavigator::new(start);
    let mut engine = open_engine(options, &history);

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: InputEvent = serde_json::from_str(line)
            .with_context(|| format!("Invalid event on line {}", line_no + 1))?;
        let outcome = engine.dispatch(&event);
        for id in &outcome.fired {
            println!("fired {} -> {}", id, history.location());
        }
    }

    println!("location: {}", history.location());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&logging::default_log_dir());
    let options = resolve_options(&cli);

    match cli.command {
        Commands::List => list(&options)?,
        Commands::Replay { events, start } => replay(&options, &events, &start)?,
        Commands::Register {
            id,
            modifier,
            key,
            action,
        } => {
            let keys = match ShortcutKeys::from_parts(&modifier, &key) {
                Ok(keys) => keys,
                Err(e) => bail!("{}", NavigatorError::from(e).user_message()),
            };
            let Some(action_data) = action.into_action_data() else {
                bail!("One of --navigate, --back or --custom is required");
            };

            let history = HistoryNavigator::default();
            let mut engine = open_engine(&options, &history);
            info!(shortcut_id = %id, keys = %keys, "Registering shortcut");
            engine.register(id.clone(), keys, || {}, Some(action_data));

            match engine.is_persisted(&id) {
                Ok(true) => println!("Registered '{}'", id),
                Ok(false) => bail!("Shortcut '{}' was not saved; see the log for details", id),
                Err(e) => bail!("{}", e.user_message()),
            }
        }
        Commands::Unregister { id } => {
            let history = HistoryNavigator::default();
            let mut engine = open_engine(&options, &history);
            if !engine.has(&id) {
                println!("No shortcut '{}'", id);
            }
            engine.unregister(&id);
        }
        Commands::Clear => {
            let history = HistoryNavigator::default();
            open_engine(&options, &history).clear();
        }
    }

    Ok(())
}
