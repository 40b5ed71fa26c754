use serde::Serialize;
use serde_json::Value;

use crate::model::card::Card;
use crate::model::group::{ColumnKey, Group, NO_VALUE_KEY};
use crate::model::record::RecordHandle;
use crate::ops::index::column_key_of;
use crate::ops::session::DropOutcome;
use crate::util::unicode::{display_width, fit_to_width};

/// Cells per column in the text board
pub const COLUMN_WIDTH: usize = 24;

const COLUMN_GAP: &str = "  ";

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardJson {
    pub name: String,
    pub group_by: String,
    pub pinned: bool,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub key: ColumnKey,
    /// The group value as the records carry it; null for the no-value column
    pub value: Value,
    pub cards: Vec<CardJson>,
}

#[derive(Serialize)]
pub struct CardJson {
    pub path: String,
    pub title: String,
}

#[derive(Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum DropJson {
    Ignored {
        reason: String,
    },
    Moved {
        moved: Vec<String>,
        rewritten: Vec<String>,
    },
    Reordered {
        columns: Vec<ColumnKey>,
    },
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn column_to_json(group: &Group<Card>) -> ColumnJson {
    ColumnJson {
        key: column_key_of(&group.key),
        value: group.key.clone(),
        cards: group
            .entries
            .iter()
            .map(|c| CardJson {
                path: c.path().to_string(),
                title: c.title.clone(),
            })
            .collect(),
    }
}

pub fn drop_to_json(outcome: &DropOutcome) -> DropJson {
    match outcome {
        DropOutcome::Ignored(reason) => DropJson::Ignored {
            reason: format!("{:?}", reason),
        },
        DropOutcome::Cards { moved, rewritten } => DropJson::Moved {
            moved: moved.clone(),
            rewritten: rewritten.clone(),
        },
        DropOutcome::Columns { order } => DropJson::Reordered {
            columns: order.clone(),
        },
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Human label for a column key
pub fn column_label(key: &str) -> &str {
    if key == NO_VALUE_KEY { "(no value)" } else { key }
}

/// Render the board as side-by-side columns, one card title per row.
pub fn format_board(groups: &[Group<Card>], width: usize) -> Vec<String> {
    if groups.is_empty() {
        return vec!["(no cards)".to_string()];
    }

    let headers: Vec<String> = groups
        .iter()
        .map(|g| {
            let key = column_key_of(&g.key);
            format!("{} ({})", column_label(&key), g.entries.len())
        })
        .collect();
    let depth = groups.iter().map(|g| g.entries.len()).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(depth + 2);
    lines.push(join_row(headers.iter().map(|h| fit_to_width(h, width))));
    lines.push(join_row(groups.iter().map(|_| "-".repeat(width))));
    for row in 0..depth {
        lines.push(join_row(groups.iter().map(|g| {
            let title = g.entries.get(row).map(|c| c.title.as_str()).unwrap_or("");
            fit_to_width(title, width)
        })));
    }
    lines
}

fn join_row(cells: impl Iterator<Item = String>) -> String {
    let row: Vec<String> = cells.collect();
    row.join(COLUMN_GAP).trim_end().to_string()
}

/// One line per column: key and card count, keys aligned
pub fn format_columns(groups: &[Group<Card>]) -> Vec<String> {
    let keys: Vec<ColumnKey> = groups.iter().map(|g| column_key_of(&g.key)).collect();
    let pad = keys.iter().map(|k| display_width(k)).max().unwrap_or(0);
    keys.iter()
        .zip(groups)
        .map(|(k, g)| format!("{}{}  {}", k, " ".repeat(pad - display_width(k)), g.entries.len()))
        .collect()
}

pub fn format_drop(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Ignored(reason) => format!("nothing to do ({:?})", reason),
        DropOutcome::Cards { moved, rewritten } => format!(
            "moved {} card(s), rewrote {}",
            moved.len(),
            rewritten.len()
        ),
        DropOutcome::Columns { order } => format!("columns: {}", order.join(", ")),
    }
}
