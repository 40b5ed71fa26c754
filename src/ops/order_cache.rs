//! Parsing, serialization and memoization of the persisted order overrides.
//!
//! Both overrides live in configuration as opaque strings: the column order
//! as a comma-joined list, the per-column card order as a JSON object. A
//! malformed value never surfaces as an error; it degrades to "no override".

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::model::group::ColumnKey;

/// Per-column card order, in the order the columns were written
pub type CardOrder = IndexMap<ColumnKey, Vec<String>>;

/// Outcome of the last [`OrderCache::resolve`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Raw value was empty or absent
    Empty,
    /// Raw value matched the cached one; no parse
    Hit,
    /// Raw value was parsed from scratch
    Miss,
}

/// Memo of the last parsed raw string.
///
/// `parsed == None` forces the next resolve to reparse, even when the raw
/// string is unchanged.
#[derive(Debug, Clone, Default)]
pub struct OrderCache<T> {
    parsed: Option<T>,
    raw: String,
    empty: T,
    status: Option<CacheStatus>,
}

impl<T: Default> OrderCache<T> {
    pub fn new() -> Self {
        OrderCache {
            parsed: None,
            raw: String::new(),
            empty: T::default(),
            status: None,
        }
    }

    /// Resolve the persisted raw value through the cache.
    pub fn resolve(&mut self, raw: Option<&str>, parse: impl FnOnce(&str) -> T) -> &T {
        let raw = raw.unwrap_or("");
        if raw.is_empty() {
            self.parsed = None;
            self.raw.clear();
            self.status = Some(CacheStatus::Empty);
            return &self.empty;
        }
        if self.parsed.is_some() && self.raw == raw {
            tracing::trace!("order cache hit");
            self.status = Some(CacheStatus::Hit);
        } else {
            tracing::trace!(len = raw.len(), "order cache miss");
            self.parsed = Some(parse(raw));
            self.raw = raw.to_string();
            self.status = Some(CacheStatus::Miss);
        }
        self.parsed.as_ref().unwrap_or(&self.empty)
    }

    /// Force the next resolve to reparse. Called after every write.
    pub fn invalidate(&mut self) {
        self.parsed = None;
    }

    pub fn last_status(&self) -> Option<CacheStatus> {
        self.status
    }
}

// ---------------------------------------------------------------------------
// Column order
// ---------------------------------------------------------------------------

pub fn parse_column_order(raw: &str) -> Vec<ColumnKey> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn serialize_column_order(order: &[ColumnKey]) -> String {
    order.join(",")
}

// ---------------------------------------------------------------------------
// Card order
// ---------------------------------------------------------------------------

pub fn parse_card_order(raw: &str) -> CardOrder {
    let parsed: IndexMap<String, Value> = match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed card order");
            return CardOrder::new();
        }
    };

    let mut order = CardOrder::new();
    for (column, value) in parsed {
        let Value::Array(items) = value else {
            continue;
        };
        let paths: IndexSet<String> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        if !paths.is_empty() {
            order.insert(column, paths.into_iter().collect());
        }
    }
    order
}

pub fn serialize_card_order(order: &CardOrder) -> String {
    let kept: IndexMap<&str, &Vec<String>> = order
        .iter()
        .filter(|(_, paths)| !paths.is_empty())
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    if kept.is_empty() {
        return String::new();
    }
    serde_json::to_string(&kept).unwrap_or_default()
}
