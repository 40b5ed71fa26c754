use std::path::PathBuf;

use super::card::Card;
use super::config::BoardConfig;

/// A fully loaded board directory
#[derive(Debug)]
pub struct Board {
    /// Root directory of the board (parent of `board/`)
    pub root: PathBuf,
    /// Path to the `board/` directory
    pub board_dir: PathBuf,
    /// Parsed board.toml
    pub config: BoardConfig,
    /// Loaded cards, sorted by path
    pub cards: Vec<Card>,
}

impl Board {
    /// Directory holding the card files
    pub fn cards_dir(&self) -> PathBuf {
        self.board_dir.join("cards")
    }
}
