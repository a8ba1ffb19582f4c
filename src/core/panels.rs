//! Result panel store: the ordered collection of resolved query results.
//!
//! Indices are issued monotonically and never reused; closing a panel
//! tombstones it instead of compacting, so the remaining panels keep their
//! dashboard placement and render identity.

use chrono::{DateTime, Utc};

use crate::core::results::Table;

#[derive(Debug, Clone)]
pub struct ResultPanel {
    pub index: u64,
    pub tables: Vec<Table>,
    pub source_query: String,
    pub submitted_at: DateTime<Utc>,
    cleared: bool,
}

impl ResultPanel {
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Display title: the single table's name, or a table count.
    pub fn title(&self) -> String {
        match self.tables.as_slice() {
            [table] => table.name.clone(),
            tables => format!("{} tables", tables.len()),
        }
    }
}

#[derive(Debug, Default)]
pub struct PanelStore {
    panels: Vec<ResultPanel>,
    next_index: u64,
    cleared_count: usize,
}

impl PanelStore {
    pub fn new() -> Self {
        PanelStore::default()
    }

    /// The only index-issuing operation; returns the new panel's index.
    pub fn append(&mut self, tables: Vec<Table>, source_query: impl Into<String>) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        self.panels.push(ResultPanel {
            index,
            tables,
            source_query: source_query.into(),
            submitted_at: Utc::now(),
            cleared: false,
        });
        index
    }

    /// Tombstone a panel. Returns false when the index is unknown or the
    /// panel was already cleared.
    pub fn clear(&mut self, index: u64) -> bool {
        match self
            .panels
            .iter_mut()
            .find(|panel| panel.index == index && !panel.cleared)
        {
            Some(panel) => {
                panel.cleared = true;
                self.cleared_count += 1;
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        for panel in self.panels.iter_mut().filter(|panel| !panel.cleared) {
            panel.cleared = true;
            self.cleared_count += 1;
        }
    }

    /// Active panels in append order.
    pub fn list(&self) -> impl Iterator<Item = &ResultPanel> {
        self.panels.iter().filter(|panel| !panel.cleared)
    }

    pub fn get(&self, index: u64) -> Option<&ResultPanel> {
        self.panels
            .iter()
            .find(|panel| panel.index == index && !panel.cleared)
    }

    pub fn cleared_count(&self) -> usize {
        self.cleared_count
    }

    pub fn active_len(&self) -> usize {
        self.panels.len() - self.cleared_count
    }
}
