//! The properties controller: the façade UI controls and embedding hosts
//! talk to. It owns the store and the per-form session, drives the
//! evaluator after every mutation, and notifies the registered listener.

use serde_json::{Map, Value};

use propeller_conditions::{condition_op, ConditionError, ConditionOp};
use propeller_model::{
    Control, ControlState, ControlType, DatasetMetadata, ErrorMessage, Form, PropertyId,
    SharedControlsGroup,
};

use crate::evaluator;
use crate::session::FormSession;
use crate::shared::filter_shared_fields;
use crate::store::PropertyStore;

/// Engine-level configuration, fixed per controller instance.
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Whether whitespace-only strings count as empty. On by default.
    pub trim_spaces: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig { trim_spaces: true }
    }
}

/// What the property listener is told after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEvent {
    Update { property: PropertyId, value: Value },
    SetProperties,
}

/// Host callbacks. All are invoked synchronously; the property listener
/// fires after every value mutation, the controller handler once at the
/// end of each `set_form`.
#[derive(Default)]
pub struct Handlers {
    pub property_listener: Option<Box<dyn FnMut(&PropertyEvent)>>,
    pub controller_handler: Option<Box<dyn FnMut()>>,
    pub action_handler: Option<Box<dyn FnMut(&str, &Value)>>,
}

/// Direction of a table row move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Default)]
pub struct PropertiesController {
    store: PropertyStore,
    session: FormSession,
    shared_groups: Vec<SharedControlsGroup>,
    handlers: Handlers,
    config: ControllerConfig,
}

impl PropertiesController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        PropertiesController {
            config,
            ..Self::default()
        }
    }

    // ---------------------------------------------------------- form load

    /// Loads a form document: builds a fresh session (controls + compiled
    /// conditions), resets the store, seeds values from the document's
    /// current parameters and control defaults, back-fills non-managed
    /// tables from the dataset, and runs one full validation pass.
    pub fn set_form(&mut self, form: &Form) -> Result<(), ConditionError> {
        let (controls, summary_panels) = form.flatten_controls();
        let compiled = propeller_conditions::compile(&form.conditions, &controls, summary_panels);

        let mut values = form.data.current_parameters.clone();
        seed_defaults(&controls, &mut values);

        self.session = FormSession::new(controls, compiled);
        self.shared_groups.clear();
        self.store.reset();
        if !form.data.dataset_metadata.schemas.is_empty() {
            self.store
                .set_dataset_metadata(form.data.dataset_metadata.clone());
        }
        self.store.set_property_values(values);
        self.backfill_tables();

        evaluator::validate_properties(&mut self.store, &self.session, self.config.trim_spaces)?;
        if let Some(handler) = &mut self.handlers.controller_handler {
            handler();
        }
        Ok(())
    }

    /// Adds rows to column-keyed tables that do not manage their own rows
    /// (`add_remove_rows == false`): one row per dataset field not already
    /// present, key cell set to the field name, other cells to the
    /// sub-control defaults.
    fn backfill_tables(&mut self) {
        let tables: Vec<(String, usize, Vec<Value>)> = self
            .session
            .controls()
            .iter()
            .filter(|control| control.control_type.is_table() && !control.add_remove_rows)
            .filter_map(|control| {
                control.key_column().map(|key_col| {
                    let defaults = control
                        .sub_controls
                        .iter()
                        .map(|sub| sub.value_def.default_value.clone().unwrap_or(Value::Null))
                        .collect();
                    (control.name.clone(), key_col, defaults)
                })
            })
            .collect();

        for (name, key_col, defaults) in tables {
            let id = PropertyId::new(name);
            let mut rows: Vec<Value> = self
                .store
                .property_value(&id)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let existing: Vec<String> = rows
                .iter()
                .filter_map(|row| row.as_array()?.get(key_col)?.as_str().map(String::from))
                .collect();
            let mut changed = false;
            for field in self.store.dataset_metadata().field_names() {
                if existing.contains(&field) {
                    continue;
                }
                let mut row = defaults.clone();
                if row.len() <= key_col {
                    row.resize(key_col + 1, Value::Null);
                }
                row[key_col] = Value::String(field);
                rows.push(Value::Array(row));
                changed = true;
            }
            if changed {
                self.store.update_property_value(&id, Value::Array(rows));
            }
        }
    }

    pub fn set_handlers(&mut self, handlers: Handlers) {
        self.handlers = handlers;
    }

    pub fn set_shared_controls(&mut self, groups: Vec<SharedControlsGroup>) {
        self.shared_groups = groups;
    }

    // ------------------------------------------------------------- values

    /// Writes one value, re-evaluates conditions, validates the edited
    /// property, and notifies the listener.
    pub fn update_property_value(
        &mut self,
        id: &PropertyId,
        value: Value,
    ) -> Result<(), ConditionError> {
        self.store.update_property_value(id, value.clone());
        evaluator::validate_conditions(&mut self.store, &self.session, self.config.trim_spaces)?;
        evaluator::validate_input(&mut self.store, &self.session, self.config.trim_spaces, id)?;
        self.notify(PropertyEvent::Update {
            property: id.clone(),
            value,
        });
        Ok(())
    }

    /// Replaces the whole value tree, re-evaluates conditions, and
    /// notifies the listener. Per-property input validation is not run
    /// here; call `validate_properties` for a full message refresh.
    pub fn set_property_values(
        &mut self,
        values: Map<String, Value>,
    ) -> Result<(), ConditionError> {
        self.store.set_property_values(values);
        evaluator::validate_conditions(&mut self.store, &self.session, self.config.trim_spaces)?;
        self.notify(PropertyEvent::SetProperties);
        Ok(())
    }

    /// Reads a value copy. With `filter_hidden_disabled`, values whose
    /// control state is hidden or disabled come back as `null` (for table
    /// values, cell by cell) without touching what is stored.
    pub fn get_property_value(
        &self,
        id: &PropertyId,
        filter_hidden_disabled: bool,
    ) -> Option<Value> {
        let value = self.store.property_value(id)?.clone();
        if !filter_hidden_disabled {
            return Some(value);
        }
        Some(self.filtered_copy(id, value))
    }

    fn filtered_copy(&self, id: &PropertyId, value: Value) -> Value {
        if self.store.state_suppresses(id) {
            return Value::Null;
        }
        match value {
            Value::Array(rows) if id.row.is_none() => Value::Array(
                rows.into_iter()
                    .enumerate()
                    .map(|(row, row_value)| {
                        let row_id = PropertyId::with_row(id.name.clone(), row);
                        if self.store.state_suppresses(&row_id) {
                            return Value::Null;
                        }
                        match row_value {
                            Value::Array(cells) => Value::Array(
                                cells
                                    .into_iter()
                                    .enumerate()
                                    .map(|(col, cell)| {
                                        let cell_id =
                                            PropertyId::with_cell(id.name.clone(), row, col);
                                        if self.store.state_suppresses(&cell_id) {
                                            Value::Null
                                        } else {
                                            cell
                                        }
                                    })
                                    .collect(),
                            ),
                            other => other,
                        }
                    })
                    .collect(),
            ),
            other => other,
        }
    }

    pub fn get_property_values(&self, filter_hidden_disabled: bool) -> Map<String, Value> {
        self.store
            .property_values()
            .keys()
            .filter_map(|name| {
                let id = PropertyId::new(name.clone());
                self.get_property_value(&id, filter_hidden_disabled)
                    .map(|value| (name.clone(), value))
            })
            .collect()
    }

    // ----------------------------------------------------------- table ops

    /// Moves the selected rows of a table value one step or to the ends.
    /// Relative order within the selection is preserved, and every stored
    /// per-row/per-cell state and message follows its row.
    pub fn move_table_rows(
        &mut self,
        name: &str,
        rows: &[usize],
        direction: MoveDirection,
    ) -> Result<(), ConditionError> {
        let len = self.table_len(name);
        let mut selected: Vec<usize> = rows.iter().copied().filter(|row| *row < len).collect();
        selected.sort_unstable();
        selected.dedup();
        if selected.is_empty() {
            return Ok(());
        }
        match direction {
            MoveDirection::Up => {
                let mut limit = 0;
                for row in selected {
                    if row <= limit {
                        limit = row + 1;
                    } else {
                        self.store.move_row(name, row, row - 1);
                    }
                }
            }
            MoveDirection::Down => {
                let mut limit = len;
                for row in selected.into_iter().rev() {
                    if row + 1 >= limit {
                        limit = row;
                    } else {
                        self.store.move_row(name, row, row + 1);
                    }
                }
            }
            MoveDirection::Top => {
                for (target, row) in selected.into_iter().enumerate() {
                    self.store.move_row(name, row, target);
                }
            }
            MoveDirection::Bottom => {
                for (offset, row) in selected.into_iter().rev().enumerate() {
                    self.store.move_row(name, row, len - 1 - offset);
                }
            }
        }
        self.after_table_change(name)
    }

    /// Removes the selected rows of a table value; their states and
    /// messages are dropped and the remaining rows' follow them down.
    pub fn remove_table_rows(
        &mut self,
        name: &str,
        rows: &[usize],
    ) -> Result<(), ConditionError> {
        self.store.remove_rows(name, rows);
        self.after_table_change(name)
    }

    fn table_len(&self, name: &str) -> usize {
        self.store
            .property_value(&PropertyId::new(name))
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn after_table_change(&mut self, name: &str) -> Result<(), ConditionError> {
        let id = PropertyId::new(name);
        evaluator::validate_conditions(&mut self.store, &self.session, self.config.trim_spaces)?;
        evaluator::validate_input(&mut self.store, &self.session, self.config.trim_spaces, &id)?;
        let value = self
            .store
            .property_value(&id)
            .cloned()
            .unwrap_or(Value::Null);
        self.notify(PropertyEvent::Update {
            property: id,
            value,
        });
        Ok(())
    }

    // ------------------------------------------------------------- states

    pub fn update_control_state(&mut self, id: &PropertyId, state: ControlState) {
        self.store.update_control_state(id, state);
    }

    /// `None` means no condition has touched this address: visible and
    /// enabled by default.
    pub fn get_control_state(&self, id: &PropertyId) -> Option<ControlState> {
        self.store.control_state(id)
    }

    // ----------------------------------------------------------- messages

    pub fn update_error_message(&mut self, id: &PropertyId, message: ErrorMessage) {
        self.store.set_error_message(id, message);
    }

    pub fn get_error_message(&self, id: &PropertyId) -> Option<ErrorMessage> {
        self.store.error_message(id).cloned()
    }

    pub fn get_all_error_messages(&self) -> Vec<(PropertyId, ErrorMessage)> {
        self.store.error_messages()
    }

    // ------------------------------------------------------------ dataset

    pub fn set_dataset_metadata(&mut self, dataset: DatasetMetadata) {
        self.store.set_dataset_metadata(dataset);
    }

    pub fn get_dataset_metadata(&self) -> &DatasetMetadata {
        self.store.dataset_metadata()
    }

    /// De-duplicated schema identifiers of the current dataset.
    pub fn get_dataset_metadata_schemas(&self) -> Vec<String> {
        self.store.dataset_metadata().schema_names()
    }

    /// The dataset fields to offer `id`'s column picker: shared-control
    /// exclusivity first, then the `filter` conditions declared for the
    /// parameter.
    pub fn get_filtered_dataset_metadata(
        &self,
        id: &PropertyId,
    ) -> Result<DatasetMetadata, ConditionError> {
        let dataset = self.store.dataset_metadata().clone();
        let dataset =
            filter_shared_fields(&self.store, &self.session, &self.shared_groups, id, dataset);
        evaluator::filter_dataset(
            &self.store,
            &self.session,
            self.config.trim_spaces,
            id,
            dataset,
        )
    }

    // ----------------------------------------------------------- controls

    pub fn get_control(&self, id: &PropertyId) -> Option<&Control> {
        self.session.control(id)
    }

    pub fn get_control_type(&self, id: &PropertyId) -> Option<ControlType> {
        self.session.control_type(id)
    }

    pub fn is_required(&self, id: &PropertyId) -> bool {
        self.session.compiled.is_required(&id.name)
    }

    pub fn is_summary(&self, id: &PropertyId) -> bool {
        self.session
            .control_by_name(&id.name)
            .is_some_and(|control| control.summary)
            || self
                .session
                .compiled
                .summary_panels
                .values()
                .any(|names| names.iter().any(|name| *name == id.name))
    }

    pub fn get_summary_panel_controls(&self, panel_id: &str) -> Option<&[String]> {
        self.session
            .compiled
            .summary_panels
            .get(panel_id)
            .map(Vec::as_slice)
    }

    /// Registers a control synthesized at runtime (custom panels), wiring
    /// it into the same lookup and validation machinery as parsed controls.
    pub fn create_control(&mut self, control: Control) {
        self.session.add_control(control);
    }

    /// The enum values a control should offer right now: the filtered
    /// subset when an `enum_filter` condition is in force, the control's
    /// full set otherwise.
    pub fn get_filtered_enum_items(&self, id: &PropertyId) -> Vec<String> {
        if let Some(values) = self.store.filtered_enum(&id.name) {
            return values.to_vec();
        }
        self.session
            .control_by_name(&id.name)
            .map(|control| control.values.clone())
            .unwrap_or_default()
    }

    // --------------------------------------------------------- conditions

    /// Looks up a condition operator by name. Unknown names are a
    /// programming error and return `None`.
    pub fn get_condition_op(&self, name: &str) -> Option<ConditionOp> {
        condition_op(name)
    }

    /// Full-form validation pass: conditions plus input validation for
    /// every control.
    pub fn validate_properties(&mut self) -> Result<(), ConditionError> {
        evaluator::validate_properties(&mut self.store, &self.session, self.config.trim_spaces)
    }

    // ------------------------------------------------------------ actions

    /// Forwards an action-control event to the registered action handler.
    pub fn notify_action(&mut self, action_id: &str, data: &Value) {
        if let Some(handler) = &mut self.handlers.action_handler {
            handler(action_id, data);
        }
    }

    fn notify(&mut self, event: PropertyEvent) {
        if let Some(listener) = &mut self.handlers.property_listener {
            listener(&event);
        }
    }
}

fn seed_defaults(controls: &[Control], values: &mut Map<String, Value>) {
    for control in controls {
        if values.contains_key(&control.name) {
            continue;
        }
        if let Some(default) = &control.value_def.default_value {
            values.insert(control.name.clone(), default.clone());
        }
    }
}
