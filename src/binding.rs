//! Binds an `items` state stream to a rendered list.
//!
//! [`ListBinding`] is the read-only projection a screen draws from.  Each new
//! emission on the items stream replaces the rendered rows wholesale; there is
//! no diffing.  Activating a row publishes the item on a selection stream
//! that the owning screen drains for navigation.

use ratatui::widgets::ListState;
use tokio::sync::{mpsc, watch};

use crate::paging::is_near_end;

pub struct ListBinding<T> {
    items: watch::Receiver<Vec<T>>,
    /// Snapshot of the last emission; what the list widget draws.
    rows: Vec<T>,
    /// Selection and scroll offset of the list widget.
    pub list_state: ListState,
    /// Rows that fit in the list area at the last draw.
    viewport_rows: usize,
    selections: mpsc::UnboundedSender<T>,
}

impl<T: Clone> ListBinding<T> {
    /// Subscribe to `items`.  Returns the binding and its selection stream.
    pub fn new(items: watch::Receiver<Vec<T>>) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (selections, selected) = mpsc::unbounded_channel();
        let rows = items.borrow().clone();
        let binding = Self {
            items,
            rows,
            list_state: ListState::default(),
            viewport_rows: 0,
            selections,
        };
        (binding, selected)
    }

    /// Pick up the latest emission, if any.  Returns `true` when the rows
    /// were replaced.
    pub fn sync(&mut self) -> bool {
        if !self.items.has_changed().unwrap_or(false) {
            return false;
        }
        self.rows = self.items.borrow_and_update().clone();
        self.clamp_selection();
        true
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    #[cfg(test)]
    pub fn selected(&self) -> Option<&T> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    /// Publish the row at `index` on the selection stream.
    pub fn on_select(&mut self, index: usize) -> Option<T> {
        let item = self.rows.get(index)?.clone();
        self.list_state.select(Some(index));
        let _ = self.selections.send(item.clone());
        Some(item)
    }

    /// Publish the currently highlighted row.
    pub fn activate(&mut self) -> Option<T> {
        let index = self.list_state.selected()?;
        self.on_select(index)
    }

    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows;
    }

    /// Index of the lowest row on screen.
    ///
    /// The widget keeps the selection visible, so the selection counts even
    /// when the stored offset has not caught up yet.
    pub fn last_visible(&self) -> Option<usize> {
        if self.rows.is_empty() {
            return None;
        }
        let bottom = self.list_state.offset() + self.viewport_rows.max(1) - 1;
        let bottom = bottom.max(self.list_state.selected().unwrap_or(0));
        Some(bottom.min(self.rows.len() - 1))
    }

    /// Whether the bottom of the viewport is within `lookahead` rows of the
    /// last row.
    pub fn is_near_end(&self, lookahead: usize) -> bool {
        self.last_visible()
            .is_some_and(|last| is_near_end(last, self.rows.len(), lookahead))
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.rows.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    fn clamp_selection(&mut self) {
        match (self.list_state.selected(), self.rows.len()) {
            (Some(_), 0) => self.list_state.select(None),
            (Some(i), len) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Bound = (
        watch::Sender<Vec<String>>,
        ListBinding<String>,
        mpsc::UnboundedReceiver<String>,
    );

    fn binding(rows: &[&str]) -> Bound {
        let (tx, rx) = watch::channel(rows.iter().map(|s| s.to_string()).collect());
        let (binding, selected) = ListBinding::new(rx);
        (tx, binding, selected)
    }

    // -- sync ----------------------------------------------------------------

    #[test]
    fn starts_with_current_value() {
        let (_tx, binding, _sel) = binding(&["a", "b"]);
        assert_eq!(binding.rows(), ["a", "b"]);
    }

    #[test]
    fn each_emission_replaces_rows() {
        let (tx, mut binding, _sel) = binding(&["a", "b", "c"]);
        assert!(!binding.sync(), "nothing new yet");

        tx.send_replace(vec!["x".to_string()]);
        assert!(binding.sync());
        assert_eq!(binding.rows(), ["x"]);
        assert!(!binding.sync());
    }

    #[test]
    fn selection_clamped_when_rows_shrink() {
        let (tx, mut binding, _sel) = binding(&["a", "b", "c"]);
        binding.select_last();

        tx.send_replace(vec!["a".to_string()]);
        binding.sync();
        assert_eq!(binding.list_state.selected(), Some(0));

        tx.send_replace(Vec::new());
        binding.sync();
        assert_eq!(binding.list_state.selected(), None);
    }

    // -- selection stream ----------------------------------------------------

    #[test]
    fn activate_publishes_highlighted_row() {
        let (_tx, mut binding, mut selected) = binding(&["a", "b", "c"]);
        binding.select_next();
        binding.select_next();

        assert_eq!(binding.activate().as_deref(), Some("b"));
        assert_eq!(selected.try_recv().unwrap(), "b");
    }

    #[test]
    fn activate_without_selection_is_noop() {
        let (_tx, mut binding, mut selected) = binding(&["a"]);
        assert!(binding.activate().is_none());
        assert!(selected.try_recv().is_err());
    }

    #[test]
    fn on_select_out_of_range_is_none() {
        let (_tx, mut binding, _sel) = binding(&["a"]);
        assert!(binding.on_select(3).is_none());
    }

    // -- proximity -----------------------------------------------------------

    #[test]
    fn near_end_when_viewport_reaches_bottom() {
        let rows: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let (_tx, mut binding, _sel) = binding(&refs);
        binding.set_viewport_rows(5);

        assert_eq!(binding.last_visible(), Some(4));
        assert!(!binding.is_near_end(1));

        binding.list_state.select(Some(8));
        assert!(binding.is_near_end(1));
    }

    #[test]
    fn short_list_is_always_near_end() {
        let (_tx, mut binding, _sel) = binding(&["a", "b"]);
        binding.set_viewport_rows(20);
        assert!(binding.is_near_end(1));
    }

    #[test]
    fn empty_list_is_never_near_end() {
        let (_tx, binding, _sel) = binding(&[]);
        assert!(!binding.is_near_end(1));
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn select_next_on_empty_is_noop() {
        let (_tx, mut binding, _sel) = binding(&[]);
        binding.select_next();
        assert!(binding.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_clamps() {
        let (_tx, mut binding, _sel) = binding(&["a", "b"]);
        binding.select_next();
        assert_eq!(binding.list_state.selected(), Some(0));
        binding.select_next();
        binding.select_next();
        assert_eq!(binding.list_state.selected(), Some(1));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let (_tx, mut binding, _sel) = binding(&["a", "b"]);
        binding.select_first();
        binding.select_previous();
        assert_eq!(binding.list_state.selected(), Some(0));
    }

    #[test]
    fn select_first_and_last_jump() {
        let (_tx, mut binding, _sel) = binding(&["a", "b", "c"]);
        binding.select_last();
        assert_eq!(binding.selected().map(String::as_str), Some("c"));
        binding.select_first();
        assert_eq!(binding.selected().map(String::as_str), Some("a"));
    }
}
