//! Tag selection widget
//!
//! The batch delete flow reads the chosen tags from a [`SelectionWidget`] and clears it
//! when the dialog is dismissed. [`TagTable`] is the terminal implementation: a
//! checkable list of tags rendered as a table.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use std::collections::BTreeSet;
use tracing::debug;

pub trait SelectionWidget {
    /// Identifiers of the selected rows, in row order.
    fn selected(&self) -> Vec<String>;
    fn clear_selection(&mut self);
    /// Persist the current selection so a later render restores it.
    fn save_state(&mut self);
}

pub struct TagTable {
    rows: Vec<String>,
    selected: BTreeSet<usize>,
    saved: Vec<String>,
}

impl TagTable {
    pub fn new(rows: Vec<String>) -> Self {
        Self {
            rows,
            selected: BTreeSet::new(),
            saved: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Select rows by tag name. Returns the names that matched no row.
    pub fn select<I, S>(&mut self, tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unknown = Vec::new();
        for tag in tags {
            let tag = tag.as_ref();
            match self.rows.iter().position(|row| row == tag) {
                Some(index) => {
                    self.selected.insert(index);
                }
                None => unknown.push(tag.to_string()),
            }
        }
        unknown
    }

    /// Replace the selection with the given row indices; out-of-range indices are ignored.
    pub fn set_selected_indices(&mut self, indices: &[usize]) {
        self.selected = indices
            .iter()
            .copied()
            .filter(|index| *index < self.rows.len())
            .collect();
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Per-row checked flags, for prompt defaults.
    pub fn checked(&self) -> Vec<bool> {
        (0..self.rows.len())
            .map(|index| self.selected.contains(&index))
            .collect()
    }

    /// Last persisted selection.
    pub fn saved_state(&self) -> &[String] {
        &self.saved
    }

    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["", "Tag"]);
        for (index, row) in self.rows.iter().enumerate() {
            let mark = if self.selected.contains(&index) { "x" } else { "" };
            table.add_row(vec![Cell::new(mark), Cell::new(row)]);
        }
        table.to_string()
    }
}

impl SelectionWidget for TagTable {
    fn selected(&self) -> Vec<String> {
        self.selected
            .iter()
            .filter_map(|index| self.rows.get(*index).cloned())
            .collect()
    }

    fn clear_selection(&mut self) {
        self.selected.clear();
    }

    fn save_state(&mut self) {
        self.saved = self.selected();
        debug!(saved = self.saved.len(), "Tag selection state saved");
    }
}
