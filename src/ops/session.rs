//! The board session: one board's arranged groups plus the user's
//! selection and drag state.
//!
//! Everything observable hangs off plain getters. `version()` increases on
//! every observable change so a display layer can skip redraws.
//!
//! Local order is updated optimistically on drop, before the external field
//! rewrites are issued. A failed rewrite is returned to the caller and the
//! local order is left as written; the next `refresh` reconciles it with
//! whatever the records actually say.

use std::collections::HashSet;

use serde_json::Value;

use crate::io::config_io::{
    CARD_ORDER_KEY, COLUMN_ORDER_KEY, ConfigError, ConfigStore, PINNED_KEY,
};
use crate::model::group::{ColumnKey, Group};
use crate::model::record::{FieldMutator, FieldWrite, GroupField, MutationError, RecordHandle};
use crate::ops::drag::{
    DragKind, DragPayload, DragSnapshot, DragState, FrameGate, FrameTicket, Placement, Rect,
};
use crate::ops::drop_ops::{self, CardDrop};
use crate::ops::group_ops::{arrange_groups, merge_groups};
use crate::ops::index::{BoardIndex, build_index, column_key_of};
use crate::ops::order_cache::{
    CardOrder, OrderCache, parse_card_order, parse_column_order, serialize_card_order,
    serialize_column_order,
};
use crate::ops::selection::SelectionState;

/// Error type for board session operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("could not persist board order: {0}")]
    Config(#[from] ConfigError),
    #[error("could not move card: {0}")]
    Mutation(#[from] MutationError),
}

/// Why a drop did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoActiveDrag,
    UnknownSource,
    OntoItself,
    UnknownColumn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Ignored(IgnoreReason),
    Cards {
        /// Every path that moved, in board order
        moved: Vec<String>,
        /// Paths whose group field was rewritten
        rewritten: Vec<String>,
    },
    Columns {
        order: Vec<ColumnKey>,
    },
}

/// A drag-over event waiting for the next animation frame
#[derive(Debug, Clone)]
struct Hover {
    kind: DragKind,
    target: String,
    x: f64,
    y: f64,
    rect: Rect,
}

pub struct BoardSession<R, S> {
    store: S,
    field: GroupField,
    /// Merged groups as last delivered, before any local ordering
    source_groups: Vec<Group<R>>,
    groups: Vec<Group<R>>,
    index: BoardIndex,
    column_cache: OrderCache<Vec<ColumnKey>>,
    card_cache: OrderCache<CardOrder>,
    selection: SelectionState,
    card_drag: DragState,
    column_drag: DragState,
    hover: FrameGate<Hover>,
    version: u64,
}

impl<R: RecordHandle + Clone, S: ConfigStore> BoardSession<R, S> {
    pub fn new(store: S, field: GroupField) -> Self {
        BoardSession {
            store,
            field,
            source_groups: Vec::new(),
            groups: Vec::new(),
            index: BoardIndex::default(),
            column_cache: OrderCache::new(),
            card_cache: OrderCache::new(),
            selection: SelectionState::new(),
            card_drag: DragState::new(DragKind::Card),
            column_drag: DragState::new(DragKind::Column),
            hover: FrameGate::new(),
            version: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Getters
    // -----------------------------------------------------------------------

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn group_field(&self) -> &GroupField {
        &self.field
    }

    /// Arranged groups: merged, sorted, locally ordered
    pub fn groups(&self) -> &[Group<R>] {
        &self.groups
    }

    pub fn index(&self) -> &BoardIndex {
        &self.index
    }

    pub fn board_order(&self) -> &[String] {
        &self.index.board_order
    }

    pub fn record(&self, path: &str) -> Option<&R> {
        self.index.record(&self.groups, path)
    }

    /// Column keys in display order
    pub fn column_keys(&self) -> Vec<ColumnKey> {
        self.groups.iter().map(|g| column_key_of(&g.key)).collect()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn card_drag(&self) -> &DragState {
        &self.card_drag
    }

    pub fn column_drag(&self) -> &DragState {
        &self.column_drag
    }

    /// Snapshots of every active drag (normally zero or one)
    pub fn drag_snapshots(&self) -> Vec<DragSnapshot> {
        [self.card_drag.snapshot(), self.column_drag.snapshot()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Persisted column order (empty = natural order)
    pub fn column_order(&mut self) -> Vec<ColumnKey> {
        let raw = self.store.get(COLUMN_ORDER_KEY);
        self.column_cache
            .resolve(raw.as_deref(), parse_column_order)
            .clone()
    }

    /// Persisted per-column card order
    pub fn card_order(&mut self) -> CardOrder {
        let raw = self.store.get(CARD_ORDER_KEY);
        self.card_cache
            .resolve(raw.as_deref(), parse_card_order)
            .clone()
    }

    pub fn pinned(&self) -> bool {
        self.store.get(PINNED_KEY).as_deref() == Some("true")
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Take a new delivery of grouped records from the query engine.
    ///
    /// Selection is pruned to paths that still exist. Drags are reset when
    /// the set of known paths changed.
    pub fn refresh(&mut self, groups: Vec<Group<R>>) {
        let before: HashSet<String> = self.index.by_path.keys().cloned().collect();

        self.source_groups = merge_groups(groups);
        self.rearrange();

        let paths_changed = before.len() != self.index.by_path.len()
            || before.iter().any(|p| !self.index.contains(p));

        let index = &self.index;
        self.selection.sync(|p| index.contains(p));

        if paths_changed && (self.card_drag.is_active() || self.column_drag.is_active()) {
            tracing::debug!("known paths changed; resetting drags");
            self.card_drag.end();
            self.column_drag.end();
            self.hover.cancel();
        }
        self.touch();
    }

    /// Re-apply the persisted orders to the last delivered groups.
    fn rearrange(&mut self) {
        let raw_columns = self.store.get(COLUMN_ORDER_KEY);
        let raw_cards = self.store.get(CARD_ORDER_KEY);
        let column_order = self
            .column_cache
            .resolve(raw_columns.as_deref(), parse_column_order);
        let card_order = self
            .card_cache
            .resolve(raw_cards.as_deref(), parse_card_order);
        self.groups = arrange_groups(self.source_groups.clone(), column_order, card_order);
        self.index = build_index(&self.groups);
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Click on a card; `extend` is the shift-click range gesture.
    /// Returns `false` for unknown paths.
    pub fn select(&mut self, path: &str, extend: bool) -> bool {
        let Some(index) = self.index.position(path) else {
            return false;
        };
        self.selection
            .select(path, index, extend, &self.index.board_order);
        self.touch();
        true
    }

    /// Add a card to the selection without replacing it
    pub fn add_to_selection(&mut self, path: &str) -> bool {
        let Some(index) = self.index.position(path) else {
            return false;
        };
        self.selection.add(path, index);
        self.touch();
        true
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.index.board_order);
        self.touch();
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.touch();
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Drag gestures
    // -----------------------------------------------------------------------

    pub fn start_card_drag(&mut self, path: &str) -> Option<DragPayload> {
        if !self.index.contains(path) {
            tracing::debug!(path, "card drag from unknown path");
            return None;
        }
        let payload = self.card_drag.start(path);
        self.touch();
        Some(payload)
    }

    pub fn start_column_drag(&mut self, key: &str) -> Option<DragPayload> {
        if !self.groups.iter().any(|g| column_key_of(&g.key) == key) {
            tracing::debug!(key, "column drag from unknown column");
            return None;
        }
        let payload = self.column_drag.start(key);
        self.touch();
        Some(payload)
    }

    /// Pointer moved over a drop target. Placement is computed on the next
    /// frame; fire the returned ticket through [`Self::on_frame`].
    pub fn drag_over(&mut self, target: &str, x: f64, y: f64, rect: Rect) -> Option<FrameTicket> {
        let kind = if self.card_drag.is_active() {
            DragKind::Card
        } else if self.column_drag.is_active() {
            DragKind::Column
        } else {
            return None;
        };
        Some(self.hover.request(Hover {
            kind,
            target: target.to_string(),
            x,
            y,
            rect,
        }))
    }

    /// Animation frame callback for a drag-over ticket. Returns whether the
    /// drag target changed.
    pub fn on_frame(&mut self, ticket: FrameTicket) -> bool {
        let Some(hover) = self.hover.fire(ticket) else {
            return false;
        };
        let placement = Placement::from_rect(hover.x, hover.y, hover.rect, hover.kind.axis());
        self.set_target(hover.kind, &hover.target, placement)
    }

    /// Set the drop target directly, bypassing frame throttling
    pub fn set_target(&mut self, kind: DragKind, target: &str, placement: Placement) -> bool {
        let drag = match kind {
            DragKind::Card => &mut self.card_drag,
            DragKind::Column => &mut self.column_drag,
        };
        let changed = drag.set_target(target, placement);
        if changed {
            self.touch();
        }
        changed
    }

    /// The pointer left every drop zone; drags stay alive.
    pub fn leave_targets(&mut self) -> bool {
        self.hover.cancel();
        let changed = self.card_drag.clear_target() | self.column_drag.clear_target();
        if changed {
            self.touch();
        }
        changed
    }

    /// Abort any drag without dropping
    pub fn cancel_drag(&mut self) {
        self.end_card_drag();
        self.end_column_drag();
    }

    fn end_card_drag(&mut self) {
        self.card_drag.end();
        self.hover.cancel();
        self.touch();
    }

    fn end_column_drag(&mut self) {
        self.column_drag.end();
        self.hover.cancel();
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Drops
    // -----------------------------------------------------------------------

    /// Drop the dragged card(s) into the column with group value `group_key`.
    ///
    /// `target_path` is the card dropped on, `None` for empty column space
    /// (placement then defaults to after). Local orders are persisted first;
    /// then one field rewrite is issued per card whose group value changes.
    /// The card drag always ends, including when a rewrite fails.
    pub fn drop_card<M: FieldMutator>(
        &mut self,
        mutator: &mut M,
        group_key: &Value,
        target_path: Option<&str>,
        placement: Option<Placement>,
    ) -> Result<DropOutcome, BoardError> {
        let Some(source) = self.card_drag.source().map(str::to_string) else {
            tracing::debug!("card drop without an active drag");
            return Ok(DropOutcome::Ignored(IgnoreReason::NoActiveDrag));
        };
        if !self.index.contains(&source) {
            tracing::debug!(source = %source, "card drop from a path no longer on the board");
            self.end_card_drag();
            return Ok(DropOutcome::Ignored(IgnoreReason::UnknownSource));
        }

        let dragged = self
            .selection
            .dragged_paths(&source, &self.index.board_order);
        let plan = drop_ops::plan_card_drop(
            &self.groups,
            &self.index,
            &self.field,
            &CardDrop {
                source: &source,
                dragged: &dragged,
                target_value: group_key,
                target_path,
                placement: placement.unwrap_or(Placement::After),
            },
        );

        // Dropped onto a dragged card in its own column: that column keeps
        // its order, but selected cards from other columns still move in.
        let onto_itself = target_path.is_some_and(|t| dragged.iter().any(|d| d == t))
            && plan.source_column == plan.target_column;
        if onto_itself && plan.writes.is_empty() {
            tracing::debug!(source = %source, "card dropped onto itself");
            self.end_card_drag();
            return Ok(DropOutcome::Ignored(IgnoreReason::OntoItself));
        }

        if !onto_itself {
            let mut card_order = self.card_order();
            for (column, paths) in &plan.columns {
                if paths.is_empty() {
                    card_order.shift_remove(column);
                } else {
                    card_order.insert(column.clone(), paths.clone());
                }
            }
            if let Err(e) = self.write_card_order(&card_order) {
                self.end_card_drag();
                return Err(e.into());
            }
            self.rearrange();
        }

        let mut rewritten = Vec::new();
        let result = self.issue_writes(mutator, &plan.writes, &mut rewritten);
        self.end_card_drag();
        result?;

        tracing::info!(
            moved = dragged.len(),
            rewritten = rewritten.len(),
            from = %plan.source_column,
            to = %plan.target_column,
            "cards dropped"
        );
        Ok(DropOutcome::Cards {
            moved: dragged,
            rewritten,
        })
    }

    fn issue_writes<M: FieldMutator>(
        &self,
        mutator: &mut M,
        writes: &[(String, FieldWrite)],
        done: &mut Vec<String>,
    ) -> Result<(), MutationError> {
        if writes.is_empty() {
            return Ok(());
        }
        if !self.field.is_writable() {
            return Err(MutationError::ReadOnly(self.field.id.clone()));
        }
        for (path, write) in writes {
            mutator.write_field(path, &self.field.write_key, write.clone())?;
            done.push(path.clone());
        }
        Ok(())
    }

    /// Drop the dragged column next to `target`.
    pub fn drop_column(
        &mut self,
        target: &str,
        placement: Placement,
    ) -> Result<DropOutcome, BoardError> {
        let Some(source) = self.column_drag.source().map(str::to_string) else {
            tracing::debug!("column drop without an active drag");
            return Ok(DropOutcome::Ignored(IgnoreReason::NoActiveDrag));
        };
        let order = self.effective_column_order();
        let moved = drop_ops::move_column(&order, &source, target, placement);
        self.end_column_drag();

        let Some(order) = moved else {
            let reason = if source == target {
                IgnoreReason::OntoItself
            } else {
                IgnoreReason::UnknownColumn
            };
            tracing::debug!(source = %source, to = target, ?reason, "column drop ignored");
            return Ok(DropOutcome::Ignored(reason));
        };
        self.set_column_order(&order)?;
        Ok(DropOutcome::Columns { order })
    }

    /// The persisted column order, extended with displayed columns it does
    /// not list yet. Falls back to the display order when nothing is
    /// persisted.
    fn effective_column_order(&mut self) -> Vec<ColumnKey> {
        let mut order = self.column_order();
        for key in self.column_keys() {
            if !order.contains(&key) {
                order.push(key);
            }
        }
        order
    }

    // -----------------------------------------------------------------------
    // Direct writes
    // -----------------------------------------------------------------------

    pub fn set_column_order(&mut self, order: &[ColumnKey]) -> Result<(), BoardError> {
        let raw = serialize_column_order(order);
        let result = self.store.set(COLUMN_ORDER_KEY, &raw);
        self.column_cache.invalidate();
        result?;
        tracing::info!(order = %raw, "column order saved");
        self.rearrange();
        self.touch();
        Ok(())
    }

    fn write_card_order(&mut self, order: &CardOrder) -> Result<(), ConfigError> {
        let raw = serialize_card_order(order);
        let result = self.store.set(CARD_ORDER_KEY, &raw);
        self.card_cache.invalidate();
        result?;
        tracing::info!(columns = order.len(), "card order saved");
        Ok(())
    }

    /// Drop the column order override
    pub fn reset_column_order(&mut self) -> Result<(), BoardError> {
        self.set_column_order(&[])
    }

    /// Drop every per-column card order override
    pub fn reset_card_order(&mut self) -> Result<(), BoardError> {
        self.write_card_order(&CardOrder::new())?;
        self.rearrange();
        self.touch();
        Ok(())
    }

    pub fn set_pinned(&mut self, pinned: bool) -> Result<(), BoardError> {
        self.store
            .set(PINNED_KEY, if pinned { "true" } else { "false" })?;
        self.touch();
        Ok(())
    }
}
