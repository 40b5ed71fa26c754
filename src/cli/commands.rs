use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cb", about = concat!("cardboard v", env!("CARGO_PKG_VERSION"), " - a kanban board of markdown cards"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different board directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new board in the current directory
    Init(InitArgs),
    /// Show the arranged board
    Show,
    /// List column keys in display order
    Columns,
    /// Move cards to a column (the first path is the one dragged)
    Mv(MvArgs),
    /// Move a column next to another one
    Mvcol(MvcolArgs),
    /// Clear persisted order overrides
    Reset(ResetArgs),
    /// Pin the board
    Pin,
    /// Unpin the board
    Unpin,
    /// Reprint the board whenever cards or board.toml change
    Watch,
}

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Field that defines the columns
    #[arg(long, default_value = "note.status")]
    pub group_by: String,
    /// Reinitialize even if board/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
#[command(group(ArgGroup::new("anchor").args(["before", "after"])))]
pub struct MvArgs {
    /// Card paths, relative to board/cards/
    #[arg(required = true)]
    pub paths: Vec<String>,
    /// Column to move into (use __no_value__ for the no-value column).
    /// Defaults to the column of the --before/--after card.
    #[arg(long)]
    pub to: Option<String>,
    /// Place before this card
    #[arg(long)]
    pub before: Option<String>,
    /// Place after this card
    #[arg(long)]
    pub after: Option<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("anchor").required(true).args(["before", "after"])))]
pub struct MvcolArgs {
    /// Column key to move
    pub key: String,
    /// Place before this column
    #[arg(long)]
    pub before: Option<String>,
    /// Place after this column
    #[arg(long)]
    pub after: Option<String>,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Reset only the column order
    #[arg(long)]
    pub columns: bool,
    /// Reset only the card order
    #[arg(long)]
    pub cards: bool,
}
