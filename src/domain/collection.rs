//! Collection views
//!
//! A [`CollectionView`] owns one fetched collection and the row descriptors
//! derived from it. Every render replaces both wholesale, so the rows always
//! describe exactly one fetch.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

/// How to turn an item into a primary row and its detail row
pub struct Template<T> {
    pub columns: &'static [&'static str],
    /// Identifier of the item; also keys its detail row
    pub id: fn(&T) -> String,
    pub summary: fn(&T) -> Vec<String>,
    pub detail: fn(&T) -> Vec<(&'static str, String)>,
}

impl<T> Clone for Template<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Template<T> {}

/// One primary row plus the detail row that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDescriptor {
    /// Position in fetch order
    pub position: usize,
    pub id: String,
    /// `"<id>_expand"`
    pub detail_key: String,
    pub cells: Vec<String>,
    pub detail: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Build the row descriptors for a collection, in fetch order
pub fn rows<T>(template: &Template<T>, items: &[T]) -> Vec<RowDescriptor> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let id = (template.id)(item);
            RowDescriptor {
                position,
                detail_key: detail_key(&id),
                id,
                cells: (template.summary)(item),
                detail: (template.detail)(item),
            }
        })
        .collect()
}

pub fn detail_key(id: &str) -> String {
    format!("{id}_expand")
}

/// Identifiers used by more than one row
pub fn duplicate_ids(rows: &[RowDescriptor]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *seen.entry(row.id.as_str()).or_default() += 1;
    }
    let mut dups: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();
    dups.sort();
    dups
}

/// A rendered collection with cursor and expansion state
pub struct CollectionView<T> {
    title: &'static str,
    template: Template<T>,
    items: Vec<T>,
    rows: Vec<RowDescriptor>,
    expanded: BTreeSet<String>,
    cursor: usize,
    load: LoadState,
    seq: u64,
}

impl<T> CollectionView<T> {
    pub fn new(title: &'static str, template: Template<T>) -> Self {
        Self {
            title,
            template,
            items: Vec::new(),
            rows: Vec::new(),
            expanded: BTreeSet::new(),
            cursor: 0,
            load: LoadState::Idle,
            seq: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.template.columns
    }

    /// Replace the collection. Previous rows, expansion and cursor are dropped.
    pub fn render(&mut self, items: Vec<T>) {
        self.rows = rows(&self.template, &items);
        self.items = items;
        self.expanded.clear();
        self.cursor = 0;
        self.load = LoadState::Loaded;

        let dups = duplicate_ids(&self.rows);
        if !dups.is_empty() {
            warn!(view = self.title, ids = ?dups, "rows share an id; their detail rows expand together");
        }
    }

    /// Mark a fetch as started; the returned sequence identifies its response
    pub fn begin_fetch(&mut self) -> u64 {
        self.seq += 1;
        self.load = LoadState::Loading;
        self.seq
    }

    /// Apply a fetch result. Returns false when the response is stale.
    ///
    /// A failure leaves the current rows untouched.
    pub fn apply<E: std::fmt::Display>(&mut self, seq: u64, result: Result<Vec<T>, E>) -> bool {
        if seq != self.seq {
            return false;
        }
        match result {
            Ok(items) => self.render(items),
            Err(err) => self.load = LoadState::Failed(err.to_string()),
        }
        true
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn rows(&self) -> &[RowDescriptor] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_expanded(&self, row: &RowDescriptor) -> bool {
        self.expanded.contains(&row.detail_key)
    }

    /// Flip the detail row of the row at `position`
    pub fn toggle_expanded(&mut self, position: usize) -> bool {
        let Some(row) = self.rows.get(position) else {
            return false;
        };
        let key = row.detail_key.clone();
        if !self.expanded.remove(&key) {
            self.expanded.insert(key);
        }
        true
    }

    pub fn toggle_current(&mut self) -> bool {
        self.toggle_expanded(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    pub fn current_row(&self) -> Option<&RowDescriptor> {
        self.rows.get(self.cursor)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
    }

    pub fn go_to_top(&mut self) {
        self.cursor = 0;
    }

    pub fn go_to_bottom(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    /// Drop everything, back to the never-fetched state
    pub fn clear(&mut self) {
        self.items.clear();
        self.rows.clear();
        self.expanded.clear();
        self.cursor = 0;
        self.load = LoadState::Idle;
        // Responses to fetches started before the clear are now stale
        self.seq += 1;
    }
}
