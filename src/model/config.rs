use serde::{Deserialize, Serialize};

/// Configuration from board.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
    /// Field the cards are grouped by
    #[serde(default = "default_group_by")]
    pub group_by: String,
}

/// Persisted view state. Every value is an opaque string owned by the
/// board session; see `io::config_io` for the keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Comma-joined column keys (empty = natural order)
    #[serde(default)]
    pub column_order: String,
    /// JSON object of column key -> card paths (empty = natural order)
    #[serde(default)]
    pub card_order: String,
    #[serde(default)]
    pub pinned: String,
}

fn default_group_by() -> String {
    "note.status".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: BoardConfig = toml::from_str("[board]\nname = \"demo\"\n").unwrap();
        assert_eq!(config.board.name, "demo");
        assert_eq!(config.board.group_by, "note.status");
        assert_eq!(config.view.column_order, "");
        assert_eq!(config.view.card_order, "");
    }

    #[test]
    fn view_section_is_read() {
        let text = r#"[board]
name = "demo"
group_by = "stage"

[view]
column_order = "done,todo"
card_order = '{"todo":["a.md"]}'
pinned = "true"
"#;
        let config: BoardConfig = toml::from_str(text).unwrap();
        assert_eq!(config.board.group_by, "stage");
        assert_eq!(config.view.column_order, "done,todo");
        assert_eq!(config.view.card_order, r#"{"todo":["a.md"]}"#);
        assert_eq!(config.view.pinned, "true");
    }
}
