use serde_json::Value;

/// Read access to one external record.
///
/// The board never owns record content. It only needs a stable path to
/// identify the record and a way to read the current value of a field.
pub trait RecordHandle {
    /// Unique, stable identity of the record
    fn path(&self) -> &str;

    /// Current value of the field with the given display id, or `None` when
    /// the record does not carry it
    fn field(&self, id: &str) -> Option<Value>;
}

/// The field a board groups its cards by.
///
/// `id` is the display identifier (`note.status`, `file.folder`, or a bare
/// `status`). `write_key` is the key rewritten in the record's own storage
/// when a card moves between columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupField {
    pub id: String,
    pub write_key: String,
}

impl GroupField {
    pub fn new(id: &str) -> Self {
        let write_key = id.strip_prefix("note.").unwrap_or(id).to_string();
        GroupField {
            id: id.to_string(),
            write_key,
        }
    }

    /// Derived fields (`file.*`) and computed ones (`formula.*`) have no
    /// backing storage to rewrite.
    pub fn is_writable(&self) -> bool {
        !(self.id.starts_with("file.") || self.id.starts_with("formula."))
    }

    /// Read this field from a record
    pub fn read<R: RecordHandle + ?Sized>(&self, record: &R) -> Option<Value> {
        record.field(&self.id)
    }
}

/// A single field rewrite requested by the board
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    /// Set the field to this value
    Set(Value),
    /// Remove the field entirely
    Delete,
}

/// Error type for external field rewrites
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("field is read-only: {0}")]
    ReadOnly(String),
    #[error("could not rewrite {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Rewrites one field on one record's persisted storage.
pub trait FieldMutator {
    fn write_field(&mut self, path: &str, key: &str, write: FieldWrite)
    -> Result<(), MutationError>;
}
