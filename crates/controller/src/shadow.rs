//! The shadow tree: per-property, per-row, per-cell storage addressed by
//! [`PropertyId`], used identically for control states and error messages.
//! A single addressing walk serves both trees so the row/col resolution is
//! written once.

use std::collections::{BTreeMap, HashMap};

use propeller_model::PropertyId;

#[derive(Debug, Clone)]
struct RowEntry<T> {
    own: Option<T>,
    cols: BTreeMap<usize, T>,
}

impl<T> Default for RowEntry<T> {
    fn default() -> Self {
        RowEntry {
            own: None,
            cols: BTreeMap::new(),
        }
    }
}

impl<T> RowEntry<T> {
    fn is_empty(&self) -> bool {
        self.own.is_none() && self.cols.is_empty()
    }
}

#[derive(Debug, Clone)]
struct PropertyEntry<T> {
    own: Option<T>,
    rows: BTreeMap<usize, RowEntry<T>>,
}

impl<T> Default for PropertyEntry<T> {
    fn default() -> Self {
        PropertyEntry {
            own: None,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> PropertyEntry<T> {
    fn is_empty(&self) -> bool {
        self.own.is_none() && self.rows.is_empty()
    }
}

/// A sparse tree of `T` entries parallel to the property-value tree.
#[derive(Debug, Clone)]
pub struct ShadowTree<T> {
    entries: HashMap<String, PropertyEntry<T>>,
}

impl<T> Default for ShadowTree<T> {
    fn default() -> Self {
        ShadowTree {
            entries: HashMap::new(),
        }
    }
}

impl<T> ShadowTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: &PropertyId, value: T) {
        let entry = self.entries.entry(id.name.clone()).or_default();
        match (id.row, id.col) {
            (Some(row), Some(col)) => {
                entry.rows.entry(row).or_default().cols.insert(col, value);
            }
            (Some(row), None) => {
                entry.rows.entry(row).or_default().own = Some(value);
            }
            _ => entry.own = Some(value),
        }
    }

    pub fn get(&self, id: &PropertyId) -> Option<&T> {
        let entry = self.entries.get(&id.name)?;
        match (id.row, id.col) {
            (Some(row), Some(col)) => entry.rows.get(&row)?.cols.get(&col),
            (Some(row), None) => entry.rows.get(&row)?.own.as_ref(),
            _ => entry.own.as_ref(),
        }
    }

    pub fn remove(&mut self, id: &PropertyId) -> Option<T> {
        let entry = self.entries.get_mut(&id.name)?;
        let removed = match (id.row, id.col) {
            (Some(row), Some(col)) => {
                let row_entry = entry.rows.get_mut(&row)?;
                let removed = row_entry.cols.remove(&col);
                if row_entry.is_empty() {
                    entry.rows.remove(&row);
                }
                removed
            }
            (Some(row), None) => {
                let row_entry = entry.rows.get_mut(&row)?;
                let removed = row_entry.own.take();
                if row_entry.is_empty() {
                    entry.rows.remove(&row);
                }
                removed
            }
            _ => entry.own.take(),
        };
        if entry.is_empty() {
            self.entries.remove(&id.name);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Every stored entry with its materialized address, property order
    /// unspecified, rows and cells in index order within a property.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &T)> {
        self.entries.iter().flat_map(|(name, entry)| {
            let own = entry
                .own
                .iter()
                .map(move |value| (PropertyId::new(name.clone()), value));
            let rows = entry.rows.iter().flat_map(move |(row, row_entry)| {
                let row_own = row_entry
                    .own
                    .iter()
                    .map(move |value| (PropertyId::with_row(name.clone(), *row), value));
                let cols = row_entry.cols.iter().map(move |(col, value)| {
                    (PropertyId::with_cell(name.clone(), *row, *col), value)
                });
                row_own.chain(cols)
            });
            own.chain(rows)
        })
    }

    /// Renumbers the row-level entries of one property. The mapping returns
    /// the new index for an old row index, or `None` to drop that row's
    /// entries. Used to keep states and messages attached to the rows they
    /// describe across table row moves and removals.
    pub fn remap_rows<F>(&mut self, name: &str, mapping: F)
    where
        F: Fn(usize) -> Option<usize>,
    {
        let Some(entry) = self.entries.get_mut(name) else {
            return;
        };
        let rows = std::mem::take(&mut entry.rows);
        for (row, row_entry) in rows {
            if let Some(new_row) = mapping(row) {
                entry.rows.insert(new_row, row_entry);
            }
        }
        if entry.is_empty() {
            self.entries.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addressing_levels_are_independent() {
        let mut tree = ShadowTree::new();
        tree.set(&PropertyId::new("keys"), 1);
        tree.set(&PropertyId::with_row("keys", 0), 2);
        tree.set(&PropertyId::with_cell("keys", 0, 1), 3);

        assert_eq!(tree.get(&PropertyId::new("keys")), Some(&1));
        assert_eq!(tree.get(&PropertyId::with_row("keys", 0)), Some(&2));
        assert_eq!(tree.get(&PropertyId::with_cell("keys", 0, 1)), Some(&3));
        assert_eq!(tree.get(&PropertyId::with_cell("keys", 0, 0)), None);
        assert_eq!(tree.get(&PropertyId::with_row("keys", 1)), None);
    }

    #[test]
    fn test_remove_prunes_empty_entries() {
        let mut tree = ShadowTree::new();
        tree.set(&PropertyId::with_cell("a", 0, 0), "x");
        assert_eq!(tree.remove(&PropertyId::with_cell("a", 0, 0)), Some("x"));
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn test_remap_rows_moves_and_drops() {
        let mut tree = ShadowTree::new();
        tree.set(&PropertyId::with_cell("t", 0, 1), "row0");
        tree.set(&PropertyId::with_cell("t", 1, 1), "row1");
        tree.set(&PropertyId::with_row("t", 2), "row2");

        // Row 0 deleted, rows 1 and 2 shift down.
        tree.remap_rows("t", |row| if row == 0 { None } else { Some(row - 1) });

        assert_eq!(tree.get(&PropertyId::with_cell("t", 0, 1)), Some(&"row1"));
        assert_eq!(tree.get(&PropertyId::with_row("t", 1)), Some(&"row2"));
        assert_eq!(tree.get(&PropertyId::with_cell("t", 1, 1)), None);
    }
}
