use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::project_io::ProjectError;
use crate::model::config::BoardConfig;

/// Config key holding the comma-joined column order
pub const COLUMN_ORDER_KEY: &str = "column_order";
/// Config key holding the JSON card order
pub const CARD_ORDER_KEY: &str = "card_order";
/// Config key holding the pinned flag
pub const PINNED_KEY: &str = "pinned";

/// Table in board.toml that holds the view keys
const VIEW_TABLE: &str = "view";

/// Error type for config store writes
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Opaque string storage for the board's view state.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;
}

/// In-memory store, for embedding hosts that persist elsewhere
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: HashMap<String, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by the `[view]` table of board.toml. Every `set` rewrites
/// the file, preserving the rest of its formatting.
#[derive(Debug)]
pub struct TomlConfigStore {
    board_dir: PathBuf,
    doc: toml_edit::DocumentMut,
}

impl TomlConfigStore {
    pub fn open(board_dir: &Path) -> Result<Self, ProjectError> {
        let (_, doc) = read_config(board_dir)?;
        Ok(TomlConfigStore {
            board_dir: board_dir.to_path_buf(),
            doc,
        })
    }
}

impl ConfigStore for TomlConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.doc
            .get(VIEW_TABLE)?
            .get(key)?
            .as_str()
            .map(str::to_string)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        set_view_value(&mut self.doc, key, value);
        write_config(&self.board_dir, &self.doc)
    }
}

/// Read the board config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(board_dir: &Path) -> Result<(BoardConfig, toml_edit::DocumentMut), ProjectError> {
    let config_path = board_dir.join("board.toml");
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut =
        config_text
            .parse()
            .map_err(|e: toml_edit::TomlError| ProjectError::DocumentError {
                path: config_path,
                source: e,
            })?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(board_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let config_path = board_dir.join("board.toml");
    fs::write(&config_path, doc.to_string()).map_err(|e| ConfigError::WriteError {
        path: config_path,
        source: e,
    })
}

/// Set a string value in the `[view]` table, creating the table if needed
pub fn set_view_value(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) {
    if !doc.contains_key(VIEW_TABLE) {
        doc[VIEW_TABLE] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[VIEW_TABLE][key] = toml_edit::value(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# my board
[board]
name = "test"
group_by = "note.status"

[view]
column_order = "done,todo"   # keep done first
"#
    }

    fn board_dir_with(text: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let board_dir = tmp.path().join("board");
        fs::create_dir_all(&board_dir).unwrap();
        fs::write(board_dir.join("board.toml"), text).unwrap();
        (tmp, board_dir)
    }

    #[test]
    fn test_round_trip_config() {
        let (_tmp, board_dir) = board_dir_with(sample_config());
        let (config, doc) = read_config(&board_dir).unwrap();
        assert_eq!(config.board.name, "test");
        write_config(&board_dir, &doc).unwrap();
        let written = fs::read_to_string(board_dir.join("board.toml")).unwrap();
        assert_eq!(written, sample_config());
    }

    #[test]
    fn test_toml_store_get_and_set() {
        let (_tmp, board_dir) = board_dir_with(sample_config());
        let mut store = TomlConfigStore::open(&board_dir).unwrap();
        assert_eq!(store.get(COLUMN_ORDER_KEY).as_deref(), Some("done,todo"));
        assert_eq!(store.get(CARD_ORDER_KEY), None);

        store.set(CARD_ORDER_KEY, r#"{"todo":["a.md"]}"#).unwrap();

        let (config, _) = read_config(&board_dir).unwrap();
        assert_eq!(config.view.card_order, r#"{"todo":["a.md"]}"#);
        assert_eq!(config.view.column_order, "done,todo");
        let written = fs::read_to_string(board_dir.join("board.toml")).unwrap();
        assert!(written.starts_with("# my board\n"));
    }

    #[test]
    fn test_set_creates_view_table() {
        let (_tmp, board_dir) = board_dir_with("[board]\nname = \"x\"\n");
        let mut store = TomlConfigStore::open(&board_dir).unwrap();
        store.set(PINNED_KEY, "true").unwrap();
        let (config, _) = read_config(&board_dir).unwrap();
        assert_eq!(config.view.pinned, "true");
    }

    #[test]
    fn test_read_missing_config() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            read_config(tmp.path()),
            Err(ProjectError::ReadError { .. })
        ));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryConfigStore::new();
        assert_eq!(store.get(COLUMN_ORDER_KEY), None);
        store.set(COLUMN_ORDER_KEY, "a,b").unwrap();
        assert_eq!(store.get(COLUMN_ORDER_KEY).as_deref(), Some("a,b"));
    }
}
