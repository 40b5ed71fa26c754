use std::fs;
use std::path::{Path, PathBuf};

use crate::io::card_io;
use crate::model::board::Board;
use crate::model::config::BoardConfig;

/// Error type for board I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a board: no board/ directory found")]
    NotABoard,
    #[error("board already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse {path}: {source}")]
    DocumentError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the board by walking up from the given directory, looking for
/// a `board/` subdirectory with a `board.toml`.
pub fn discover_board(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        let board_dir = current.join("board");
        if board_dir.is_dir() && board_dir.join("board.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotABoard);
        }
    }
}

/// Load a complete board from the given root directory.
pub fn load_board(root: &Path) -> Result<Board, ProjectError> {
    let board_dir = root.join("board");
    if !board_dir.is_dir() {
        return Err(ProjectError::NotABoard);
    }

    let config_path = board_dir.join("board.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&config_text)?;

    let cards = card_io::load_cards(&board_dir.join("cards"))?;
    tracing::debug!(root = %root.display(), cards = cards.len(), "loaded board");

    Ok(Board {
        root: root.to_path_buf(),
        board_dir,
        config,
        cards,
    })
}

/// Create `board/board.toml` and `board/cards/` under `root`.
pub fn init_board(root: &Path, name: &str, group_by: &str, force: bool) -> Result<PathBuf, ProjectError> {
    let board_dir = root.join("board");
    let config_path = board_dir.join("board.toml");
    if config_path.exists() && !force {
        return Err(ProjectError::AlreadyExists(board_dir));
    }
    fs::create_dir_all(board_dir.join("cards"))?;

    let mut doc = toml_edit::DocumentMut::new();
    let mut board = toml_edit::Table::new();
    board["name"] = toml_edit::value(name);
    board["group_by"] = toml_edit::value(group_by);
    doc["board"] = toml_edit::Item::Table(board);
    let mut view = toml_edit::Table::new();
    view["column_order"] = toml_edit::value("");
    view["card_order"] = toml_edit::value("");
    doc["view"] = toml_edit::Item::Table(view);

    fs::write(&config_path, doc.to_string())?;
    Ok(board_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_then_load() {
        let tmp = TempDir::new().unwrap();
        init_board(tmp.path(), "demo", "note.stage", false).unwrap();
        let board = load_board(tmp.path()).unwrap();
        assert_eq!(board.config.board.name, "demo");
        assert_eq!(board.config.board.group_by, "note.stage");
        assert!(board.cards.is_empty());
        assert!(board.cards_dir().is_dir());
    }

    #[test]
    fn init_refuses_existing_board() {
        let tmp = TempDir::new().unwrap();
        init_board(tmp.path(), "demo", "status", false).unwrap();
        assert!(matches!(
            init_board(tmp.path(), "demo", "status", false),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(init_board(tmp.path(), "again", "status", true).is_ok());
    }

    #[test]
    fn discover_walks_up() {
        let tmp = TempDir::new().unwrap();
        init_board(tmp.path(), "demo", "status", false).unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(discover_board(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn discover_outside_board_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_board(tmp.path()),
            Err(ProjectError::NotABoard)
        ));
    }
}
