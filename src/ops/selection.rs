use indexmap::IndexSet;

/// Selected cards plus the anchor for shift-range extension.
///
/// Invariant: `last_selected` is `None` exactly when nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: IndexSet<String>,
    last_selected: Option<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.selected.contains(path)
    }

    pub fn last_selected(&self) -> Option<usize> {
        self.last_selected
    }

    /// Selected paths in the order they were selected
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Click-style selection.
    ///
    /// With `extend` and an existing anchor, every path between the anchor and
    /// `index` in `board_order` is added (the range crosses column
    /// boundaries). Otherwise the click toggles: a selected path is removed,
    /// an unselected one replaces the whole selection.
    pub fn select(&mut self, path: &str, index: usize, extend: bool, board_order: &[String]) {
        if extend && let Some(anchor) = self.last_selected {
            let (lo, hi) = if anchor <= index {
                (anchor, index)
            } else {
                (index, anchor)
            };
            for p in board_order.iter().take(hi + 1).skip(lo) {
                self.selected.insert(p.clone());
            }
            self.last_selected = Some(index);
            return;
        }

        if self.selected.shift_remove(path) {
            if self.selected.is_empty() {
                self.last_selected = None;
            }
        } else {
            self.selected.clear();
            self.selected.insert(path.to_string());
            self.last_selected = Some(index);
        }
    }

    /// Add a path without touching the rest of the selection.
    pub fn add(&mut self, path: &str, index: usize) {
        self.selected.insert(path.to_string());
        self.last_selected = Some(index);
    }

    /// Select every card on the board.
    pub fn select_all(&mut self, board_order: &[String]) {
        self.selected = board_order.iter().cloned().collect();
        self.last_selected = board_order.len().checked_sub(1);
    }

    /// Empty the selection. Returns `false` (and changes nothing) when it was
    /// already empty, so callers can skip downstream updates.
    pub fn clear(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.selected.clear();
        self.last_selected = None;
        true
    }

    /// Drop paths that no longer exist. Must run after every refresh.
    /// Returns whether anything was removed.
    pub fn sync(&mut self, is_valid: impl Fn(&str) -> bool) -> bool {
        let before = self.selected.len();
        self.selected.retain(|p| is_valid(p));
        if self.selected.is_empty() {
            self.last_selected = None;
        }
        self.selected.len() != before
    }

    /// Paths a drag starting on `source` moves: the source alone when it is
    /// not selected, otherwise the whole selection in board order.
    pub fn dragged_paths(&self, source: &str, board_order: &[String]) -> Vec<String> {
        if !self.selected.contains(source) {
            return vec![source.to_string()];
        }
        board_order
            .iter()
            .filter(|p| self.selected.contains(p.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    fn sorted(state: &SelectionState) -> Vec<&str> {
        let mut v: Vec<&str> = state.paths().collect();
        v.sort();
        v
    }

    #[test]
    fn range_select_extends_from_anchor() {
        let order = board(4);
        let mut sel = SelectionState::new();
        sel.select("p1", 1, false, &order);
        sel.select("p3", 3, true, &order);
        assert_eq!(sorted(&sel), vec!["p1", "p2", "p3"]);
        assert_eq!(sel.last_selected(), Some(3));
    }

    #[test]
    fn range_select_backwards() {
        let order = board(5);
        let mut sel = SelectionState::new();
        sel.select("p3", 3, false, &order);
        sel.select("p0", 0, true, &order);
        assert_eq!(sorted(&sel), vec!["p0", "p1", "p2", "p3"]);
        assert_eq!(sel.last_selected(), Some(0));
    }

    #[test]
    fn extend_without_anchor_behaves_like_click() {
        let order = board(3);
        let mut sel = SelectionState::new();
        sel.select("p2", 2, true, &order);
        assert_eq!(sorted(&sel), vec!["p2"]);
        assert_eq!(sel.last_selected(), Some(2));
    }

    #[test]
    fn click_replaces_selection() {
        let order = board(3);
        let mut sel = SelectionState::new();
        sel.select("p0", 0, false, &order);
        sel.select("p2", 2, false, &order);
        assert_eq!(sorted(&sel), vec!["p2"]);
        assert_eq!(sel.last_selected(), Some(2));
    }

    #[test]
    fn click_on_selected_toggles_off() {
        let order = board(4);
        let mut sel = SelectionState::new();
        sel.select("p0", 0, false, &order);
        sel.select("p2", 2, true, &order);
        sel.select("p1", 1, false, &order);
        // p1 was selected, so it is removed and the anchor stays put
        assert_eq!(sorted(&sel), vec!["p0", "p2"]);
        assert_eq!(sel.last_selected(), Some(2));

        sel.select("p0", 0, false, &order);
        sel.select("p2", 2, false, &order);
        assert!(sel.is_empty());
        assert_eq!(sel.last_selected(), None);
    }

    #[test]
    fn clear_reports_change() {
        let order = board(2);
        let mut sel = SelectionState::new();
        assert!(!sel.clear());
        sel.select("p0", 0, false, &order);
        assert!(sel.clear());
        assert!(sel.is_empty());
        assert_eq!(sel.last_selected(), None);
    }

    #[test]
    fn sync_prunes_missing_paths() {
        let order = board(3);
        let mut sel = SelectionState::new();
        sel.select_all(&order);
        assert!(sel.sync(|p| p != "p1"));
        assert_eq!(sorted(&sel), vec!["p0", "p2"]);
        assert_eq!(sel.last_selected(), Some(2));

        assert!(sel.sync(|_| false));
        assert!(sel.is_empty());
        assert_eq!(sel.last_selected(), None);
    }

    #[test]
    fn dragged_paths_follow_board_order() {
        let order = board(4);
        let mut sel = SelectionState::new();
        sel.add("p3", 3);
        sel.add("p1", 1);
        assert_eq!(sel.dragged_paths("p3", &order), vec!["p1", "p3"]);
        assert_eq!(sel.dragged_paths("p0", &order), vec!["p0"]);
    }
}
