use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::model::group::{ColumnKey, Group};
use crate::model::record::RecordHandle;
use crate::ops::index::column_key_of;
use crate::ops::order_cache::CardOrder;

/// Merge groups that normalize to the same column key.
///
/// Output order is the order of first appearance. The first group for a key
/// provides the representative `key`; later groups append their records and
/// OR in their `has_key` flag.
pub fn merge_groups<R>(groups: Vec<Group<R>>) -> Vec<Group<R>> {
    let mut merged: IndexMap<ColumnKey, Group<R>> = IndexMap::new();
    for group in groups {
        let column = column_key_of(&group.key);
        match merged.get_mut(&column) {
            Some(existing) => {
                existing.has_key |= group.has_key;
                existing.entries.extend(group.entries);
            }
            None => {
                merged.insert(column, group);
            }
        }
    }
    merged.into_values().collect()
}

/// Sort groups by the persisted column order.
///
/// Columns missing from `order` go last. The sort is stable, so unlisted
/// columns (and any with the same rank) keep their merge order.
pub fn sort_groups<R>(groups: &mut [Group<R>], order: &[ColumnKey]) {
    if order.is_empty() {
        return;
    }
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, key)| (key.as_str(), i))
        .collect();
    groups.sort_by_key(|g| {
        rank.get(column_key_of(&g.key).as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });
}

/// Reorder one column's records by its persisted path list.
///
/// Persisted paths that still exist come out in persisted order. Records the
/// list does not mention are new to this column: they keep their external
/// order and go on top. Persisted paths without a record are dropped.
pub fn apply_local_card_order<R: RecordHandle>(entries: Vec<R>, order: &[String]) -> Vec<R> {
    if order.is_empty() {
        return entries;
    }
    let listed: HashSet<&str> = order.iter().map(String::as_str).collect();

    let mut unseen = Vec::new();
    let mut by_path: HashMap<String, R> = HashMap::new();
    for record in entries {
        if listed.contains(record.path()) {
            by_path.insert(record.path().to_string(), record);
        } else {
            unseen.push(record);
        }
    }

    let mut result = unseen;
    for path in order {
        if let Some(record) = by_path.remove(path) {
            result.push(record);
        }
    }
    result
}

/// Run the whole arrangement pipeline: merge, sort columns, order cards.
pub fn arrange_groups<R: RecordHandle>(
    groups: Vec<Group<R>>,
    column_order: &[ColumnKey],
    card_order: &CardOrder,
) -> Vec<Group<R>> {
    let mut groups = merge_groups(groups);
    sort_groups(&mut groups, column_order);
    for group in &mut groups {
        let column = column_key_of(&group.key);
        if let Some(order) = card_order.get(&column) {
            let entries = std::mem::take(&mut group.entries);
            group.entries = apply_local_card_order(entries, order);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::group::NO_VALUE_KEY;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn group(key: Value, paths: &[&str]) -> Group<Card> {
        Group::new(key, paths.iter().map(|p| Card::new(*p, *p)).collect())
    }

    fn paths(group: &Group<Card>) -> Vec<&str> {
        group.entries.iter().map(|c| c.path.as_str()).collect()
    }

    fn keys(groups: &[Group<Card>]) -> Vec<String> {
        groups.iter().map(|g| column_key_of(&g.key)).collect()
    }

    #[test]
    fn merge_keeps_first_group_entries_first() {
        let merged = merge_groups(vec![
            group(json!("todo"), &["a", "b"]),
            group(json!("done"), &["x"]),
            group(json!("todo"), &["c"]),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(paths(&merged[0]), vec!["a", "b", "c"]);
        assert_eq!(paths(&merged[1]), vec!["x"]);
    }

    #[test]
    fn merge_folds_empty_string_into_null() {
        let merged = merge_groups(vec![
            group(Value::Null, &["a"]),
            group(json!(""), &["b"]),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(column_key_of(&merged[0].key), NO_VALUE_KEY);
        assert!(merged[0].has_key);
        assert_eq!(merged[0].key, Value::Null);
    }

    #[test]
    fn merge_number_and_string() {
        let merged = merge_groups(vec![group(json!(1), &["a"]), group(json!("1"), &["b"])]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].key, json!(1));
        assert_eq!(paths(&merged[0]), vec!["a", "b"]);
    }

    #[test]
    fn sort_sends_unlisted_last() {
        let mut groups = vec![
            group(json!("doing"), &[]),
            group(json!("todo"), &[]),
            group(json!("done"), &[]),
        ];
        sort_groups(&mut groups, &["done".to_string(), "todo".to_string()]);
        assert_eq!(keys(&groups), vec!["done", "todo", "doing"]);
    }

    #[test]
    fn sort_is_stable_for_unlisted() {
        let mut groups = vec![
            group(json!("c"), &[]),
            group(json!("a"), &[]),
            group(json!("x"), &[]),
            group(json!("b"), &[]),
        ];
        sort_groups(&mut groups, &["x".to_string()]);
        assert_eq!(keys(&groups), vec!["x", "c", "a", "b"]);
    }

    #[test]
    fn sort_ignores_stale_keys() {
        let mut groups = vec![group(json!("a"), &[]), group(json!("b"), &[])];
        sort_groups(&mut groups, &["gone".to_string(), "b".to_string()]);
        assert_eq!(keys(&groups), vec!["b", "a"]);
    }

    #[test]
    fn apply_prepends_unseen_records() {
        let entries = vec![Card::new("A", "A"), Card::new("B", "B"), Card::new("C", "C")];
        let result = apply_local_card_order(entries, &["C".to_string(), "A".to_string()]);
        let result: Vec<&str> = result.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(result, vec!["B", "C", "A"]);
    }

    #[test]
    fn apply_drops_stale_paths() {
        let entries = vec![Card::new("A", "A"), Card::new("B", "B")];
        let result = apply_local_card_order(
            entries,
            &["gone".to_string(), "B".to_string(), "A".to_string()],
        );
        let result: Vec<&str> = result.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(result, vec!["B", "A"]);
    }

    #[test]
    fn arrange_runs_full_pipeline() {
        let mut card_order = CardOrder::new();
        card_order.insert("todo".into(), vec!["c".into(), "a".into()]);
        let groups = arrange_groups(
            vec![
                group(json!("todo"), &["a", "b"]),
                group(json!("done"), &["d"]),
                group(json!("todo"), &["c"]),
            ],
            &["done".to_string()],
            &card_order,
        );
        assert_eq!(keys(&groups), vec!["done", "todo"]);
        assert_eq!(paths(&groups[1]), vec!["b", "c", "a"]);
    }
}
