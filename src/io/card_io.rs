//! Card files: markdown with optional TOML front matter.
//!
//! ```text
//! +++
//! status = "todo"
//! +++
//! # Write the release notes
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::io::project_io::ProjectError;
use crate::model::card::Card;
use crate::model::group::Group;
use crate::model::record::{FieldMutator, FieldWrite, GroupField, MutationError};

const FENCE: &str = "+++";

/// Split a card file into its front matter (without fences) and body.
/// Files that do not open with a fence, or never close it, have no front
/// matter.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text
        .strip_prefix("+++\n")
        .or_else(|| text.strip_prefix("+++\r\n"))
    else {
        return (None, text);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

/// Parse one card file. `path` is relative to the cards directory.
pub fn parse_card(path: &str, text: &str) -> Card {
    let (front, body) = split_front_matter(text);
    let fields = match front.map(toml::from_str::<toml::Table>) {
        Some(Ok(table)) => table,
        Some(Err(e)) => {
            tracing::warn!(path, error = %e, "ignoring malformed front matter");
            toml::Table::new()
        }
        None => toml::Table::new(),
    };
    let mut card = Card::new(path, "");
    card.fields = fields;
    card.title = body
        .lines()
        .find_map(|l| l.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| card.stem().to_string());
    card
}

/// Load every `*.md` file under `cards_dir`, sorted by path.
pub fn load_cards(cards_dir: &Path) -> Result<Vec<Card>, ProjectError> {
    let mut files = Vec::new();
    if cards_dir.is_dir() {
        collect_md_files(cards_dir, &mut files)?;
    }
    let mut cards = Vec::with_capacity(files.len());
    for file in files {
        let text = fs::read_to_string(&file).map_err(|e| ProjectError::ReadError {
            path: file.clone(),
            source: e,
        })?;
        cards.push(parse_card(&relative_path(cards_dir, &file), &text));
    }
    cards.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(cards)
}

fn collect_md_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ProjectError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_md_files(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("md") {
            out.push(path);
        }
    }
    Ok(())
}

fn relative_path(base: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(base).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Group cards by the exact value of `field`, in order of first appearance.
///
/// This is deliberately naive: `""` and a missing field, or `1` and `"1"`,
/// come out as separate groups. Folding those together is the board's job.
pub fn query_groups(cards: &[Card], field: &GroupField) -> Vec<Group<Card>> {
    let mut groups: Vec<Group<Card>> = Vec::new();
    for card in cards {
        let value = field.read(card).unwrap_or(Value::Null);
        match groups.iter().position(|g| g.key == value) {
            Some(i) => groups[i].entries.push(card.clone()),
            None => groups.push(Group::new(value, vec![card.clone()])),
        }
    }
    groups
}

/// Convert a board value into a front matter value
pub fn json_to_toml(value: &Value) -> toml_edit::Value {
    match value {
        Value::Null => toml_edit::Value::from(""),
        Value::Bool(b) => toml_edit::Value::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => toml_edit::Value::from(i),
            None => toml_edit::Value::from(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => toml_edit::Value::from(s.as_str()),
        Value::Array(items) => {
            let mut array = toml_edit::Array::new();
            for item in items.iter().filter(|v| !v.is_null()) {
                array.push(json_to_toml(item));
            }
            toml_edit::Value::Array(array)
        }
        Value::Object(map) => {
            let mut table = toml_edit::InlineTable::new();
            for (k, v) in map.iter().filter(|(_, v)| !v.is_null()) {
                table.insert(k.as_str(), json_to_toml(v));
            }
            toml_edit::Value::InlineTable(table)
        }
    }
}

/// Rewrite a card's front matter with one field changed.
///
/// Returns `None` when nothing changes (deleting a field the card does not
/// have).
pub fn rewrite_field(text: &str, key: &str, write: &FieldWrite) -> Result<Option<String>, toml_edit::TomlError> {
    let (front, body) = split_front_matter(text);
    let mut doc: toml_edit::DocumentMut = front.unwrap_or("").parse()?;
    match write {
        FieldWrite::Set(value) => {
            doc[key] = toml_edit::Item::Value(json_to_toml(value));
        }
        FieldWrite::Delete => {
            if doc.remove(key).is_none() {
                return Ok(None);
            }
        }
    }
    let mut front = doc.to_string();
    if !front.is_empty() && !front.ends_with('\n') {
        front.push('\n');
    }
    Ok(Some(format!("{FENCE}\n{front}{FENCE}\n{body}")))
}

/// Field mutator over the card files of one board
#[derive(Debug, Clone)]
pub struct CardStore {
    cards_dir: PathBuf,
}

impl CardStore {
    pub fn new(cards_dir: &Path) -> Self {
        CardStore {
            cards_dir: cards_dir.to_path_buf(),
        }
    }
}

impl FieldMutator for CardStore {
    fn write_field(
        &mut self,
        path: &str,
        key: &str,
        write: FieldWrite,
    ) -> Result<(), MutationError> {
        let file = self.cards_dir.join(path);
        if !file.is_file() {
            return Err(MutationError::NotFound(path.to_string()));
        }
        let wrap = |e: Box<dyn std::error::Error + Send + Sync>| MutationError::Write {
            path: path.to_string(),
            source: e,
        };

        let text = fs::read_to_string(&file).map_err(|e| wrap(Box::new(e)))?;
        let Some(updated) = rewrite_field(&text, key, &write).map_err(|e| wrap(Box::new(e)))?
        else {
            return Ok(());
        };

        let dir = file.parent().unwrap_or(&self.cards_dir);
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| wrap(Box::new(e)))?;
        tmp.write_all(updated.as_bytes())
            .map_err(|e| wrap(Box::new(e)))?;
        tmp.persist(&file).map_err(|e| wrap(Box::new(e)))?;
        tracing::info!(path, key, "rewrote card field");
        Ok(())
    }
}
