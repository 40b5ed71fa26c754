use serde_json::Value;

use super::record::RecordHandle;

/// A markdown card loaded from `board/cards/`
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Path relative to the cards directory, `/`-separated
    pub path: String,
    /// First `# ` heading, or the file stem when there is none
    pub title: String,
    /// Parsed front matter (empty when the file has none)
    pub fields: toml::Table,
}

impl Card {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Card {
            path: path.into(),
            title: title.into(),
            fields: toml::Table::new(),
        }
    }

    /// Builder used by tests and fixtures
    pub fn with_field(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// File name without extension
    pub fn stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.strip_suffix(".md").unwrap_or(name)
    }

    /// Containing folder relative to the cards directory ("" at top level)
    pub fn folder(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..i],
            None => "",
        }
    }
}

impl RecordHandle for Card {
    fn path(&self) -> &str {
        &self.path
    }

    fn field(&self, id: &str) -> Option<Value> {
        match id {
            "file.name" => return Some(Value::String(self.stem().to_string())),
            "file.path" => return Some(Value::String(self.path.clone())),
            "file.folder" => return Some(Value::String(self.folder().to_string())),
            _ => {}
        }
        let key = id.strip_prefix("note.").unwrap_or(id);
        self.fields.get(key).map(toml_to_json)
    }
}

/// Convert a front matter value to the JSON value model the board works in.
pub fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => Value::from(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn note_fields_read_front_matter() {
        let card = Card::new("todo/a.md", "A").with_field("status", "todo");
        assert_eq!(card.field("note.status"), Some(json!("todo")));
        assert_eq!(card.field("status"), Some(json!("todo")));
        assert_eq!(card.field("note.missing"), None);
    }

    #[test]
    fn file_fields_are_derived() {
        let card = Card::new("sprint/one/a.md", "A");
        assert_eq!(card.field("file.name"), Some(json!("a")));
        assert_eq!(card.field("file.folder"), Some(json!("sprint/one")));
        assert_eq!(card.field("file.path"), Some(json!("sprint/one/a.md")));
    }

    #[test]
    fn top_level_folder_is_empty() {
        assert_eq!(Card::new("a.md", "A").folder(), "");
    }

    #[test]
    fn toml_values_convert() {
        let card = Card::new("a.md", "A")
            .with_field("points", 3)
            .with_field("flag", true)
            .with_field("tags", toml::Value::Array(vec!["x".into(), "y".into()]));
        assert_eq!(card.field("points"), Some(json!(3)));
        assert_eq!(card.field("flag"), Some(json!(true)));
        assert_eq!(card.field("tags"), Some(json!(["x", "y"])));
    }
}
