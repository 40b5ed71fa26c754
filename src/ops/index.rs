use std::collections::HashMap;

use serde_json::Value;

use crate::model::group::{ColumnKey, Group, NO_VALUE_KEY};
use crate::model::record::RecordHandle;

/// Derive the column key for a group value.
///
/// `null` and the empty string both map to [`NO_VALUE_KEY`]. Everything else
/// uses its plain string form: strings verbatim, numbers and booleans as
/// displayed, arrays as their comma-joined elements, objects as compact JSON.
pub fn column_key_of(value: &Value) -> ColumnKey {
    match value {
        Value::Null => NO_VALUE_KEY.to_string(),
        Value::String(s) if s.is_empty() => NO_VALUE_KEY.to_string(),
        other => display_value(other),
    }
}

/// Same as [`column_key_of`] for an optional (possibly absent) value
pub fn column_key_of_opt(value: Option<&Value>) -> ColumnKey {
    value.map_or_else(|| NO_VALUE_KEY.to_string(), column_key_of)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Location of a record within the arranged groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPos {
    pub column: usize,
    pub row: usize,
}

/// Path lookup plus the flattened board order.
///
/// `board_order` concatenates every column's records in display order and is
/// the only source of indices for range selection and for the order in which
/// a multi-card drag is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardIndex {
    pub by_path: HashMap<String, RecordPos>,
    pub board_order: Vec<String>,
}

impl BoardIndex {
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Position of `path` in the board order
    pub fn position(&self, path: &str) -> Option<usize> {
        self.board_order.iter().position(|p| p == path)
    }

    /// Resolve a path to its record in the groups this index was built from
    pub fn record<'a, R>(&self, groups: &'a [Group<R>], path: &str) -> Option<&'a R> {
        let pos = self.by_path.get(path)?;
        groups.get(pos.column)?.entries.get(pos.row)
    }
}

/// Build the path index for the given (already arranged) groups.
pub fn build_index<R: RecordHandle>(groups: &[Group<R>]) -> BoardIndex {
    let mut index = BoardIndex::default();
    for (column, group) in groups.iter().enumerate() {
        for (row, record) in group.entries.iter().enumerate() {
            let path = record.path().to_string();
            index.by_path.insert(path.clone(), RecordPos { column, row });
            index.board_order.push(path);
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use serde_json::json;

    #[test]
    fn no_value_sentinel() {
        assert_eq!(column_key_of(&Value::Null), NO_VALUE_KEY);
        assert_eq!(column_key_of(&json!("")), NO_VALUE_KEY);
        assert_eq!(column_key_of_opt(None), NO_VALUE_KEY);
    }

    #[test]
    fn scalar_keys() {
        assert_eq!(column_key_of(&json!("todo")), "todo");
        assert_eq!(column_key_of(&json!(3)), "3");
        assert_eq!(column_key_of(&json!(1.5)), "1.5");
        assert_eq!(column_key_of(&json!(false)), "false");
    }

    #[test]
    fn number_and_string_share_a_key() {
        assert_eq!(column_key_of(&json!(1)), column_key_of(&json!("1")));
    }

    #[test]
    fn array_keys_join_elements() {
        assert_eq!(column_key_of(&json!(["a", 2, "c"])), "a,2,c");
        assert_eq!(column_key_of(&json!([])), "");
    }

    #[test]
    fn build_index_flattens_columns_in_order() {
        let groups = vec![
            Group::new(json!("todo"), vec![Card::new("a.md", "A"), Card::new("b.md", "B")]),
            Group::new(json!("done"), vec![Card::new("c.md", "C")]),
        ];
        let index = build_index(&groups);
        assert_eq!(index.board_order, vec!["a.md", "b.md", "c.md"]);
        assert_eq!(index.by_path["c.md"], RecordPos { column: 1, row: 0 });
        assert_eq!(index.position("b.md"), Some(1));
        assert_eq!(index.record(&groups, "b.md").map(|c| c.title.as_str()), Some("B"));
        assert!(!index.contains("zzz.md"));
    }
}
