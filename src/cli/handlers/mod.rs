mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use serde_json::Value;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::card_io::{self, CardStore};
use crate::io::config_io::{ConfigStore, TomlConfigStore};
use crate::io::project_io::{self, ProjectError};
use crate::io::watcher::{BoardEvent, BoardWatcher};
use crate::model::board::Board;
use crate::model::card::Card;
use crate::model::group::NO_VALUE_KEY;
use crate::model::record::GroupField;
use crate::ops::drag::Placement;
use crate::ops::index::column_key_of;
use crate::ops::session::BoardSession;

/// Global override for the board directory (set by -C flag)
static PROJECT_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

type Session = BoardSession<Card, TomlConfigStore>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    if let Some(ref dir) = cli.project_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        let _ = PROJECT_DIR_OVERRIDE.set(abs);
    }

    match cli.command {
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::Show => cmd_show(json),
        Commands::Columns => cmd_columns(json),
        Commands::Watch => cmd_watch(json),

        // Write commands
        Commands::Mv(args) => cmd_mv(args, json),
        Commands::Mvcol(args) => cmd_mvcol(args, json),
        Commands::Reset(args) => cmd_reset(args),
        Commands::Pin => cmd_pin(true),
        Commands::Unpin => cmd_pin(false),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The -C directory, or the current directory
fn start_dir() -> Result<PathBuf, ProjectError> {
    match PROJECT_DIR_OVERRIDE.get() {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(ProjectError::IoError),
    }
}

fn load_board_cwd() -> Result<Board, ProjectError> {
    let root = project_io::discover_board(&start_dir()?)?;
    project_io::load_board(&root)
}

/// Build a session over the board's cards, with the view state in board.toml
fn session_for(board: &Board) -> Result<Session, ProjectError> {
    let store = TomlConfigStore::open(&board.board_dir)?;
    let field = GroupField::new(&board.config.board.group_by);
    let groups = card_io::query_groups(&board.cards, &field);
    let mut session = BoardSession::new(store, field);
    session.refresh(groups);
    Ok(session)
}

fn open_session() -> Result<(Board, Session), ProjectError> {
    let board = load_board_cwd()?;
    let session = session_for(&board)?;
    Ok((board, session))
}

/// Map a `--to` argument onto the group value of an existing column. Unknown
/// columns are created by writing the argument as a string.
fn resolve_column_value<S: ConfigStore>(session: &BoardSession<Card, S>, column: &str) -> Value {
    if column == NO_VALUE_KEY {
        return Value::Null;
    }
    session
        .groups()
        .iter()
        .find(|g| column_key_of(&g.key) == column)
        .map(|g| g.key.clone())
        .unwrap_or_else(|| Value::String(column.to_string()))
}

/// Group value of the column holding `path`
fn column_value_of<S: ConfigStore>(session: &BoardSession<Card, S>, path: &str) -> Option<Value> {
    let pos = session.index().by_path.get(path)?;
    session.groups().get(pos.column).map(|g| g.key.clone())
}

fn anchor(before: Option<String>, after: Option<String>) -> Option<(String, Placement)> {
    match (before, after) {
        (Some(b), _) => Some((b, Placement::Before)),
        (None, Some(a)) => Some((a, Placement::After)),
        (None, None) => None,
    }
}

fn print_board(board: &Board, session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let out = BoardJson {
            name: board.config.board.name.clone(),
            group_by: board.config.board.group_by.clone(),
            pinned: session.pinned(),
            columns: session.groups().iter().map(column_to_json).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let pin = if session.pinned() { " [pinned]" } else { "" };
        println!(
            "{} (by {}){}",
            board.config.board.name, board.config.board.group_by, pin
        );
        println!();
        for line in format_board(session.groups(), COLUMN_WIDTH) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (board, session) = open_session()?;
    print_board(&board, &session, json)
}

fn cmd_columns(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_, session) = open_session()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&session.column_keys())?);
    } else {
        for line in format_columns(session.groups()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_watch(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let root = project_io::discover_board(&start_dir()?)?;
    let board = project_io::load_board(&root)?;
    let watcher = BoardWatcher::start(&board.board_dir)?;
    let mut session = session_for(&board)?;
    print_board(&board, &session, json)?;

    loop {
        let events = watcher.wait(Duration::from_millis(500));
        if events.is_empty() {
            continue;
        }
        let mut config_changed = false;
        for BoardEvent::Changed(paths) in &events {
            tracing::debug!(?paths, "board changed on disk");
            config_changed |= paths
                .iter()
                .any(|p| p.file_name().is_some_and(|n| n == "board.toml"));
        }

        let board = match project_io::load_board(&root) {
            Ok(b) => b,
            Err(e) => {
                // Mid-write reads can fail; the next event retries
                tracing::warn!(error = %e, "could not reload board");
                continue;
            }
        };
        if config_changed {
            session = session_for(&board)?;
        } else {
            let groups = card_io::query_groups(&board.cards, session.group_field());
            session.refresh(groups);
        }
        if !json {
            println!();
        }
        print_board(&board, &session, json)?;
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_mv(args: MvArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (board, mut session) = open_session()?;

    for path in &args.paths {
        if !session.index().contains(path) {
            return Err(format!("card not found: {}", path).into());
        }
    }
    let source = args.paths.first().ok_or("no card given")?.clone();

    let anchor = anchor(args.before, args.after);
    if let Some((target, _)) = &anchor
        && !session.index().contains(target)
    {
        return Err(format!("card not found: {}", target).into());
    }

    let value = match (&args.to, &anchor) {
        (Some(column), _) => resolve_column_value(&session, column),
        (None, Some((target, _))) => column_value_of(&session, target).unwrap_or(Value::Null),
        (None, None) => return Err("give a column with --to, or a card with --before/--after".into()),
    };

    session.clear_selection();
    for path in &args.paths {
        session.add_to_selection(path);
    }
    session.start_card_drag(&source);

    let mut cards = CardStore::new(&board.cards_dir());
    let (target, placement) = match anchor {
        Some((t, p)) => (Some(t), Some(p)),
        None => (None, None),
    };
    let outcome = session.drop_card(&mut cards, &value, target.as_deref(), placement)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&drop_to_json(&outcome))?);
    } else {
        println!("{}", format_drop(&outcome));
    }
    Ok(())
}

fn cmd_mvcol(args: MvcolArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_, mut session) = open_session()?;

    let (target, placement) =
        anchor(args.before, args.after).ok_or("give a column with --before or --after")?;
    if !session.column_keys().contains(&target) {
        return Err(format!("column not found: {}", target).into());
    }
    if session.start_column_drag(&args.key).is_none() {
        return Err(format!("column not found: {}", args.key).into());
    }
    let outcome = session.drop_column(&target, placement)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&drop_to_json(&outcome))?);
    } else {
        println!("{}", format_drop(&outcome));
    }
    Ok(())
}

fn cmd_reset(args: ResetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, mut session) = open_session()?;
    let both = !args.columns && !args.cards;

    if args.columns || both {
        session.reset_column_order()?;
        println!("Reset column order");
    }
    if args.cards || both {
        session.reset_card_order()?;
        println!("Reset card order");
    }
    Ok(())
}

fn cmd_pin(pinned: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (board, mut session) = open_session()?;
    session.set_pinned(pinned)?;
    let verb = if pinned { "Pinned" } else { "Unpinned" };
    println!("{} \"{}\"", verb, board.config.board.name);
    Ok(())
}
