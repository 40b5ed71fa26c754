use serde_json::Value;

/// Normalized string identity of a column
pub type ColumnKey = String;

/// Reserved column key for records whose group field has no value.
pub const NO_VALUE_KEY: &str = "__no_value__";

/// One bucket of records as delivered by the query engine
#[derive(Debug, Clone)]
pub struct Group<R> {
    /// The raw group value (`Value::Null` when the records have none)
    pub key: Value,
    /// Whether the engine reported an actual value for this group
    pub has_key: bool,
    /// Records in display order
    pub entries: Vec<R>,
}

impl<R> Group<R> {
    pub fn new(key: Value, entries: Vec<R>) -> Self {
        let has_key = !key.is_null();
        Group {
            key,
            has_key,
            entries,
        }
    }
}
