use serde_json::Value;

use crate::model::group::{ColumnKey, Group, NO_VALUE_KEY};
use crate::model::record::{FieldWrite, GroupField, RecordHandle};
use crate::ops::drag::Placement;
use crate::ops::index::{BoardIndex, column_key_of, column_key_of_opt};

/// Splice `dragged` into `current` next to `target`.
///
/// The dragged paths are first removed from `current`. A missing or unknown
/// target appends at the end. Dropping onto one of the dragged paths changes
/// nothing and returns `current` as is.
pub fn insert_paths(
    current: &[String],
    dragged: &[String],
    target: Option<&str>,
    placement: Placement,
) -> Vec<String> {
    if let Some(t) = target
        && dragged.iter().any(|d| d == t)
    {
        return current.to_vec();
    }

    let mut result: Vec<String> = current
        .iter()
        .filter(|p| !dragged.contains(p))
        .cloned()
        .collect();

    let at = target
        .and_then(|t| result.iter().position(|p| p == t))
        .map(|i| match placement {
            Placement::Before => i,
            Placement::After => i + 1,
        })
        .unwrap_or(result.len());

    result.splice(at..at, dragged.iter().cloned());
    result
}

/// Move `source` next to `target` in a column order.
///
/// Returns `None` when the two are the same or either is missing.
pub fn move_column(
    order: &[ColumnKey],
    source: &str,
    target: &str,
    placement: Placement,
) -> Option<Vec<ColumnKey>> {
    if source == target {
        return None;
    }
    let from = order.iter().position(|k| k == source)?;
    let to = order.iter().position(|k| k == target)?;

    let mut result = order.to_vec();
    let moved = result.remove(from);
    let mut at = match placement {
        Placement::Before => to,
        Placement::After => to + 1,
    };
    // Removal shifted everything after `from` one slot left
    if from < at {
        at -= 1;
    }
    result.insert(at, moved);
    Some(result)
}

/// Paths currently displayed in the column with the given key
pub fn column_paths<R: RecordHandle>(groups: &[Group<R>], column: &str) -> Vec<String> {
    groups
        .iter()
        .find(|g| column_key_of(&g.key) == column)
        .map(|g| g.entries.iter().map(|r| r.path().to_string()).collect())
        .unwrap_or_default()
}

/// Everything a card drop needs to persist and rewrite
#[derive(Debug, Clone, PartialEq)]
pub struct CardDropPlan {
    pub source_column: ColumnKey,
    pub target_column: ColumnKey,
    /// New local order per affected column (source first when they differ)
    pub columns: Vec<(ColumnKey, Vec<String>)>,
    /// Field rewrites, one per dragged record whose value must change
    pub writes: Vec<(String, FieldWrite)>,
}

/// A card drop gesture, resolved against the arranged board
#[derive(Debug, Clone)]
pub struct CardDrop<'a> {
    /// The path the drag started on
    pub source: &'a str,
    /// All paths moving, in board order
    pub dragged: &'a [String],
    /// Group value of the column dropped into
    pub target_value: &'a Value,
    /// Card dropped on, `None` for empty column space
    pub target_path: Option<&'a str>,
    pub placement: Placement,
}

/// Compute the local orders and field rewrites for a card drop.
pub fn plan_card_drop<R: RecordHandle>(
    groups: &[Group<R>],
    index: &BoardIndex,
    field: &GroupField,
    drop: &CardDrop<'_>,
) -> CardDropPlan {
    let current_key = |path: &str| {
        let value = index.record(groups, path).and_then(|r| field.read(r));
        column_key_of_opt(value.as_ref())
    };

    let source_column = current_key(drop.source);
    let target_column = column_key_of(drop.target_value);

    let target_current = column_paths(groups, &target_column);
    let target_order = insert_paths(
        &target_current,
        drop.dragged,
        drop.target_path,
        drop.placement,
    );

    let columns = if source_column == target_column {
        vec![(target_column.clone(), target_order)]
    } else {
        let source_order: Vec<String> = column_paths(groups, &source_column)
            .into_iter()
            .filter(|p| !drop.dragged.contains(p))
            .collect();
        vec![
            (source_column.clone(), source_order),
            (target_column.clone(), target_order),
        ]
    };

    let writes = drop
        .dragged
        .iter()
        .filter(|path| index.contains(path))
        .filter(|path| current_key(path) != target_column)
        .map(|path| {
            let write = if target_column == NO_VALUE_KEY {
                FieldWrite::Delete
            } else {
                FieldWrite::Set(drop.target_value.clone())
            };
            (path.clone(), write)
        })
        .collect();

    CardDropPlan {
        source_column,
        target_column,
        columns,
        writes,
    }
}
