//! Canonical storage for property values, control states, validation
//! messages, dataset metadata, and filtered enum sets.
//!
//! Values, states, and messages are three independent trees sharing the
//! `{name, row, col}` addressing scheme: a cell can be disabled without
//! carrying an error and vice versa. The store validates nothing itself;
//! the controller drives validation around these primitives.

use std::collections::HashMap;

use serde_json::{Map, Value};

use propeller_model::{
    ControlState, DatasetMetadata, ErrorMessage, MessageKind, PropertyId,
};

use crate::shadow::ShadowTree;

#[derive(Debug, Default)]
pub struct PropertyStore {
    values: Map<String, Value>,
    states: ShadowTree<ControlState>,
    messages: ShadowTree<ErrorMessage>,
    dataset: DatasetMetadata,
    filtered_enums: HashMap<String, Vec<String>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------- values

    /// Replaces the entire value tree. The store owns what it is given;
    /// callers keep no live reference into it.
    pub fn set_property_values(&mut self, values: Map<String, Value>) {
        self.values = values;
    }

    pub fn property_values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Writes one value at the id's addressing level. Row and cell writes
    /// grow intermediate arrays as needed, filling the gaps with `null`;
    /// they never fail on out-of-bounds indices.
    pub fn update_property_value(&mut self, id: &PropertyId, value: Value) {
        match (id.row, id.col) {
            (Some(row), Some(col)) => {
                let rows = ensure_array(self.values.entry(id.name.clone()).or_insert(Value::Null));
                grow_to(rows, row);
                let cells = ensure_array(&mut rows[row]);
                grow_to(cells, col);
                cells[col] = value;
            }
            (Some(row), None) => {
                let rows = ensure_array(self.values.entry(id.name.clone()).or_insert(Value::Null));
                grow_to(rows, row);
                rows[row] = value;
            }
            _ => {
                self.values.insert(id.name.clone(), value);
            }
        }
    }

    /// Reads the value at the id's addressing level. `None` means the
    /// property (or row/cell) is not present; a stored `null` comes back as
    /// `Some(&Value::Null)`.
    pub fn property_value(&self, id: &PropertyId) -> Option<&Value> {
        let mut value = self.values.get(&id.name)?;
        if let Some(row) = id.row {
            value = value.as_array()?.get(row)?;
            if let Some(col) = id.col {
                value = value.as_array()?.get(col)?;
            }
        }
        Some(value)
    }

    pub fn remove_property_value(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    // ------------------------------------------------------------- states

    pub fn update_control_state(&mut self, id: &PropertyId, state: ControlState) {
        self.states.set(id, state);
    }

    pub fn control_state(&self, id: &PropertyId) -> Option<ControlState> {
        self.states.get(id).copied()
    }

    /// True when the value at `id` is withheld from filtered reads: its own
    /// state, its row's, or its property's is hidden/disabled.
    pub fn state_suppresses(&self, id: &PropertyId) -> bool {
        let suppressed = |candidate: &PropertyId| {
            self.states
                .get(candidate)
                .is_some_and(ControlState::suppresses_value)
        };
        if suppressed(id) {
            return true;
        }
        if let (Some(row), Some(_)) = (id.row, id.col) {
            if suppressed(&PropertyId::with_row(id.name.clone(), row)) {
                return true;
            }
        }
        id.row.is_some() && suppressed(&id.property())
    }

    // ----------------------------------------------------------- messages

    /// Stores a message at `id`. An `info` message is "no message": it
    /// clears whatever is stored there instead of being kept.
    pub fn set_error_message(&mut self, id: &PropertyId, message: ErrorMessage) {
        if message.kind == MessageKind::Info {
            self.messages.remove(id);
        } else {
            self.messages.set(id, message);
        }
    }

    pub fn error_message(&self, id: &PropertyId) -> Option<&ErrorMessage> {
        self.messages.get(id)
    }

    pub fn clear_error_message(&mut self, id: &PropertyId) {
        self.messages.remove(id);
    }

    /// Clears the message at `id` only if it was produced by the named
    /// validation.
    pub fn clear_validation_message(&mut self, id: &PropertyId, validation_id: &str) {
        let owned = self
            .messages
            .get(id)
            .is_some_and(|msg| msg.validation_id.as_deref() == Some(validation_id));
        if owned {
            self.messages.remove(id);
        }
    }

    pub fn error_messages(&self) -> Vec<(PropertyId, ErrorMessage)> {
        self.messages
            .iter()
            .map(|(id, message)| (id, message.clone()))
            .collect()
    }

    pub fn clear_error_messages(&mut self) {
        self.messages.clear();
    }

    // ----------------------------------------------------------- row ops

    /// Moves one row of a table value from `from` to `to`, carrying the
    /// row's states and messages to its new index and renumbering the rows
    /// displaced by the move.
    pub fn move_row(&mut self, name: &str, from: usize, to: usize) {
        if from == to {
            return;
        }
        if let Some(rows) = self.values.get_mut(name).and_then(Value::as_array_mut) {
            if from >= rows.len() || to >= rows.len() {
                return;
            }
            let row = rows.remove(from);
            rows.insert(to, row);
        } else {
            return;
        }
        let mapping = |row: usize| -> Option<usize> {
            Some(if row == from {
                to
            } else if from < to && row > from && row <= to {
                row - 1
            } else if to < from && row >= to && row < from {
                row + 1
            } else {
                row
            })
        };
        self.states.remap_rows(name, &mapping);
        self.messages.remap_rows(name, &mapping);
    }

    /// Removes the given rows from a table value. States and messages of
    /// removed rows are dropped; those of surviving rows follow them down.
    pub fn remove_rows(&mut self, name: &str, removed: &[usize]) {
        let Some(rows) = self.values.get_mut(name).and_then(Value::as_array_mut) else {
            return;
        };
        let mut removed: Vec<usize> = removed.iter().copied().collect();
        removed.sort_unstable();
        removed.dedup();
        for row in removed.iter().rev() {
            if *row < rows.len() {
                rows.remove(*row);
            }
        }
        let mapping = |row: usize| -> Option<usize> {
            if removed.binary_search(&row).is_ok() {
                None
            } else {
                Some(row - removed.iter().filter(|r| **r < row).count())
            }
        };
        self.states.remap_rows(name, &mapping);
        self.messages.remap_rows(name, &mapping);
    }

    // ------------------------------------------------------------ dataset

    pub fn set_dataset_metadata(&mut self, dataset: DatasetMetadata) {
        self.dataset = dataset;
    }

    pub fn dataset_metadata(&self) -> &DatasetMetadata {
        &self.dataset
    }

    // ----------------------------------------------------- filtered enums

    /// Installs or removes the filtered subset of a parameter's enum
    /// values. `None` means no filter is in force (full set offered).
    pub fn set_filtered_enum(&mut self, name: &str, values: Option<Vec<String>>) {
        match values {
            Some(values) => {
                self.filtered_enums.insert(name.to_string(), values);
            }
            None => {
                self.filtered_enums.remove(name);
            }
        }
    }

    pub fn filtered_enum(&self, name: &str) -> Option<&[String]> {
        self.filtered_enums.get(name).map(Vec::as_slice)
    }

    /// Resets everything except dataset metadata, which survives a form
    /// reload unless explicitly replaced.
    pub fn reset(&mut self) {
        self.values = Map::new();
        self.states.clear();
        self.messages.clear();
        self.filtered_enums.clear();
    }
}

fn ensure_array(value: &mut Value) -> &mut Vec<Value> {
    if !value.is_array() {
        *value = Value::Array(Vec::new());
    }
    value.as_array_mut().expect("just set to array")
}

fn grow_to(arr: &mut Vec<Value>, index: usize) {
    while arr.len() <= index {
        arr.push(Value::Null);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_write_grows_sparse() {
        let mut store = PropertyStore::new();
        store.update_property_value(&PropertyId::with_cell("t", 2, 1), json!("x"));
        assert_eq!(
            store.property_value(&PropertyId::new("t")),
            Some(&json!([null, null, [null, "x"]]))
        );
    }

    #[test]
    fn test_out_of_bounds_read_is_none() {
        let mut store = PropertyStore::new();
        store.update_property_value(&PropertyId::new("t"), json!([[1, 2]]));
        assert_eq!(store.property_value(&PropertyId::with_row("t", 5)), None);
        assert_eq!(store.property_value(&PropertyId::with_cell("t", 0, 9)), None);
        assert_eq!(store.property_value(&PropertyId::new("missing")), None);
    }

    #[test]
    fn test_stored_null_is_some_null() {
        let mut store = PropertyStore::new();
        store.update_property_value(&PropertyId::new("n"), Value::Null);
        assert_eq!(store.property_value(&PropertyId::new("n")), Some(&Value::Null));
    }

    #[test]
    fn test_info_message_clears() {
        let mut store = PropertyStore::new();
        let id = PropertyId::new("x");
        store.set_error_message(&id, ErrorMessage::error("bad"));
        assert!(store.error_message(&id).is_some());
        store.set_error_message(
            &id,
            ErrorMessage {
                kind: MessageKind::Info,
                text: "fyi".to_string(),
                validation_id: None,
            },
        );
        assert!(store.error_message(&id).is_none());
    }

    #[test]
    fn test_move_row_down_carries_messages() {
        let mut store = PropertyStore::new();
        store.update_property_value(
            &PropertyId::new("keys"),
            json!([["Na", "Ascending"], ["Drug", "Descending"]]),
        );
        store.set_error_message(
            &PropertyId::with_cell("keys", 0, 0),
            ErrorMessage::error("bad cell"),
        );

        store.move_row("keys", 0, 1);

        assert_eq!(
            store.property_value(&PropertyId::new("keys")),
            Some(&json!([["Drug", "Descending"], ["Na", "Ascending"]]))
        );
        assert!(store.error_message(&PropertyId::with_cell("keys", 0, 0)).is_none());
        assert_eq!(
            store
                .error_message(&PropertyId::with_cell("keys", 1, 0))
                .map(|m| m.text.as_str()),
            Some("bad cell")
        );
    }

    #[test]
    fn test_remove_rows_drops_and_shifts_messages() {
        let mut store = PropertyStore::new();
        store.update_property_value(&PropertyId::new("t"), json!([[0], [1], [2]]));
        store.set_error_message(&PropertyId::with_row("t", 0), ErrorMessage::error("a"));
        store.set_error_message(&PropertyId::with_row("t", 2), ErrorMessage::error("c"));

        store.remove_rows("t", &[0]);

        assert_eq!(store.property_value(&PropertyId::new("t")), Some(&json!([[1], [2]])));
        assert!(store.error_message(&PropertyId::with_row("t", 0)).is_none());
        assert_eq!(
            store
                .error_message(&PropertyId::with_row("t", 1))
                .map(|m| m.text.as_str()),
            Some("c")
        );
    }
}
