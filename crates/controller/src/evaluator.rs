//! Recomputes derived state from the compiled conditions: control
//! visibility and enablement, filtered enum sets, validation messages, and
//! condition-filtered dataset fields.
//!
//! Operator errors (malformed authoring such as `equals` with no operand)
//! are not caught here; they propagate to the caller so the defect surfaces
//! during development.

use serde_json::{json, Value};

use propeller_conditions::ops::ParamResolver;
use propeller_conditions::parser::validation_id;
use propeller_conditions::{evaluate_tree, ConditionError, OperatorContext, ParamInfo};
use propeller_model::condition_decl::column_reference;
use propeller_model::{
    ControlState, DatasetMetadata, ErrorMessage, PropertyId, ValidationDecl,
};
use propeller_util::value_is_empty;

use crate::session::FormSession;
use crate::store::PropertyStore;

/// Resolves condition parameter references against the live store. `row`
/// carries the table-row context while one row is being validated, so a
/// `table[col]` reference reads that row's cell.
struct StoreResolver<'a> {
    store: &'a PropertyStore,
    session: &'a FormSession,
    row: Option<usize>,
}

impl ParamResolver for StoreResolver<'_> {
    fn param_info(&self, name: &str, col: Option<usize>) -> ParamInfo<'_> {
        let control = self.session.control_at(name, col);
        let value = match (col, self.row) {
            (Some(col), Some(row)) => self
                .store
                .property_value(&PropertyId::with_cell(name, row, col)),
            // A cell reference with no row in scope has no value to offer.
            (Some(_), None) => None,
            (None, _) => self.store.property_value(&PropertyId::new(name)),
        };
        ParamInfo::new(value, control)
    }
}

fn row_count(store: &PropertyStore, name: &str) -> usize {
    store
        .property_value(&PropertyId::new(name))
        .and_then(Value::as_array)
        .map(|rows| rows.len())
        .unwrap_or(0)
}

/// Expands one governed `parameter_ref` into the addresses a state applies
/// to: every current row's cell for a `table[col]` reference, the whole
/// property otherwise.
fn state_targets(store: &PropertyStore, parameter_ref: &str) -> Vec<PropertyId> {
    let (name, col) = column_reference(parameter_ref);
    match col {
        Some(col) => (0..row_count(store, name))
            .map(|row| PropertyId::with_cell(name, row, col))
            .collect(),
        None => vec![PropertyId::new(name)],
    }
}

/// One full pass over the visible, enabled, and enum-filter definitions,
/// writing the outcomes into the store. Visibility and enablement are
/// independent passes; within each, the most recently evaluated condition
/// wins for a parameter. Enablement never un-hides: a parameter a
/// visibility condition hid stays hidden regardless of its enabled result.
pub fn validate_conditions(
    store: &mut PropertyStore,
    session: &FormSession,
    trim_spaces: bool,
) -> Result<(), ConditionError> {
    let mut visibility: Vec<(PropertyId, ControlState)> = Vec::new();
    let mut enablement: Vec<(PropertyId, ControlState)> = Vec::new();
    let mut enum_filters: Vec<(String, Option<Vec<String>>)> = Vec::new();

    {
        let ctx = OperatorContext {
            dataset: store.dataset_metadata(),
            trim_spaces,
        };
        let resolver = StoreResolver {
            store,
            session,
            row: None,
        };

        for def in &session.compiled.visible_defs {
            let satisfied = evaluate_tree(&def.evaluate, None, &resolver, &ctx)?;
            let state = if satisfied {
                ControlState::Visible
            } else {
                ControlState::Hidden
            };
            for target in &def.parameter_refs {
                for id in state_targets(store, target) {
                    visibility.push((id, state));
                }
            }
        }

        for def in &session.compiled.enabled_defs {
            let satisfied = evaluate_tree(&def.evaluate, None, &resolver, &ctx)?;
            let state = if satisfied {
                ControlState::Enabled
            } else {
                ControlState::Disabled
            };
            for target in &def.parameter_refs {
                for id in state_targets(store, target) {
                    enablement.push((id, state));
                }
            }
        }

        for def in &session.compiled.enum_filter_defs {
            let satisfied = evaluate_tree(&def.evaluate, None, &resolver, &ctx)?;
            enum_filters.push((
                def.target.parameter_ref.clone(),
                satisfied.then(|| def.target.values.clone()),
            ));
        }
    }

    for (id, state) in visibility {
        store.update_control_state(&id, state);
    }
    for (id, state) in enablement {
        if store.control_state(&id) != Some(ControlState::Hidden) {
            store.update_control_state(&id, state);
        }
    }
    for (name, values) in enum_filters {
        store.set_filtered_enum(&name, values);
    }
    Ok(())
}

/// Runs the validation definitions applicable to one property (or one of
/// its rows), writing or clearing messages per the result. Also enforces
/// the required-parameter rule for the property.
pub fn validate_input(
    store: &mut PropertyStore,
    session: &FormSession,
    trim_spaces: bool,
    id: &PropertyId,
) -> Result<(), ConditionError> {
    validate_required(store, session, trim_spaces, &id.name);
    let defs: Vec<_> = session
        .compiled
        .validations_for(&id.name)
        .iter()
        .cloned()
        .collect();
    for def in defs {
        run_validation(store, session, trim_spaces, &def, id.row)?;
    }
    Ok(())
}

fn validate_required(
    store: &mut PropertyStore,
    session: &FormSession,
    trim_spaces: bool,
    name: &str,
) {
    if !session.compiled.is_required(name) {
        return;
    }
    let id = PropertyId::new(name);
    let empty = store
        .property_value(&id)
        .is_none_or(|value| value_is_empty(value, trim_spaces));
    let vid = format!("required_{name}");
    if empty {
        let label = session
            .control_by_name(name)
            .and_then(|control| control.label.clone())
            .unwrap_or_else(|| name.to_string());
        store.set_error_message(
            &id,
            ErrorMessage::error(format!("Required parameter \"{label}\" has no value"))
                .with_validation_id(vid),
        );
    } else {
        store.clear_validation_message(&id, &vid);
    }
}

fn run_validation(
    store: &mut PropertyStore,
    session: &FormSession,
    trim_spaces: bool,
    def: &ValidationDecl,
    row_hint: Option<usize>,
) -> Result<(), ConditionError> {
    let (focus_name, focus_col) = column_reference(&def.fail_message.focus_parameter_ref);
    match focus_col {
        Some(col) => {
            // Cell-focused validation runs per row: the hinted row after a
            // single-cell edit, every row on a full pass.
            let rows: Vec<usize> = match row_hint {
                Some(row) => vec![row],
                None => (0..row_count(store, focus_name)).collect(),
            };
            for row in rows {
                let satisfied = {
                    let ctx = OperatorContext {
                        dataset: store.dataset_metadata(),
                        trim_spaces,
                    };
                    let resolver = StoreResolver {
                        store,
                        session,
                        row: Some(row),
                    };
                    evaluate_tree(&def.evaluate, None, &resolver, &ctx)?
                };
                apply_validation(store, def, PropertyId::with_cell(focus_name, row, col), satisfied);
            }
        }
        None => {
            let satisfied = {
                let ctx = OperatorContext {
                    dataset: store.dataset_metadata(),
                    trim_spaces,
                };
                let resolver = StoreResolver {
                    store,
                    session,
                    row: row_hint,
                };
                evaluate_tree(&def.evaluate, None, &resolver, &ctx)?
            };
            apply_validation(store, def, PropertyId::new(focus_name), satisfied);
        }
    }
    Ok(())
}

fn apply_validation(
    store: &mut PropertyStore,
    def: &ValidationDecl,
    address: PropertyId,
    satisfied: bool,
) {
    let vid = validation_id(def);
    if satisfied {
        store.clear_validation_message(&address, &vid);
    } else {
        store.set_error_message(
            &address,
            ErrorMessage {
                kind: def.fail_message.kind,
                text: def.fail_message.message.default.clone(),
                validation_id: Some(vid),
            },
        );
    }
}

/// Full-form validation: the conditions pass plus input validation for
/// every control.
pub fn validate_properties(
    store: &mut PropertyStore,
    session: &FormSession,
    trim_spaces: bool,
) -> Result<(), ConditionError> {
    validate_conditions(store, session, trim_spaces)?;
    let names: Vec<String> = session
        .controls()
        .iter()
        .map(|control| control.name.clone())
        .collect();
    for name in names {
        validate_input(store, session, trim_spaces, &PropertyId::new(name))?;
    }
    Ok(())
}

/// Strips the fields the `filter` definitions for `id` exclude from a
/// dataset-metadata copy. The subject of each condition is the candidate
/// field, offered as a `{link_ref, field_name}` reference.
pub fn filter_dataset(
    store: &PropertyStore,
    session: &FormSession,
    trim_spaces: bool,
    id: &PropertyId,
    mut dataset: DatasetMetadata,
) -> Result<DatasetMetadata, ConditionError> {
    let defs = session.compiled.filters_for(&id.name);
    if defs.is_empty() {
        return Ok(dataset);
    }
    let control = session.control_by_name(&id.name);
    let ctx = OperatorContext {
        dataset: store.dataset_metadata(),
        trim_spaces,
    };
    let resolver = StoreResolver {
        store,
        session,
        row: None,
    };

    let idents = dataset.schema_names();
    let mut keep: Vec<Vec<bool>> = Vec::new();
    for (schema, ident) in dataset.schemas.iter().zip(&idents) {
        let mut flags = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let reference = json!({"link_ref": ident, "field_name": field.name});
            let subject = ParamInfo::new(Some(&reference), control);
            let mut keep_field = true;
            for def in defs {
                if !evaluate_tree(&def.evaluate, Some(&subject), &resolver, &ctx)? {
                    keep_field = false;
                    break;
                }
            }
            flags.push(keep_field);
        }
        keep.push(flags);
    }
    for (schema, flags) in dataset.schemas.iter_mut().zip(keep) {
        let mut flags = flags.into_iter();
        schema.fields.retain(|_| flags.next().unwrap_or(true));
    }
    Ok(dataset)
}
