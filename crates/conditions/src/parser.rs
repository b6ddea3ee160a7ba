//! Compiles a form document's raw `conditions` array into the lookup
//! structures the evaluator works from.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use propeller_model::condition_decl::base_parameter;
use propeller_model::{
    ConditionDecl, Control, EnumFilterDecl, FilterDecl, UiCondition, ValidationDecl,
};

/// The compiled form of every condition declaration, keyed by the parameter
/// names each condition touches (a condition referencing several parameters
/// is indexed under each of them). The flat `*_defs` lists hold each
/// definition once, for the full-form passes; the maps serve targeted
/// lookups when a single parameter changes.
#[derive(Debug, Clone, Default)]
pub struct CompiledConditions {
    pub visible_defs: Vec<Arc<UiCondition>>,
    pub enabled_defs: Vec<Arc<UiCondition>>,
    pub enum_filter_defs: Vec<Arc<EnumFilterDecl>>,
    pub visible: HashMap<String, Vec<Arc<UiCondition>>>,
    pub enabled: HashMap<String, Vec<Arc<UiCondition>>>,
    pub validations: HashMap<String, Vec<Arc<ValidationDecl>>>,
    pub filters: HashMap<String, Vec<Arc<FilterDecl>>>,
    pub enum_filters: HashMap<String, Vec<Arc<EnumFilterDecl>>>,
    /// Parameters declared required by their controls.
    pub required: Vec<String>,
    /// Summary-panel id to the names of the controls it contains.
    pub summary_panels: HashMap<String, Vec<String>>,
}

impl CompiledConditions {
    pub fn validations_for(&self, parameter: &str) -> &[Arc<ValidationDecl>] {
        self.validations
            .get(parameter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn filters_for(&self, parameter: &str) -> &[Arc<FilterDecl>] {
        self.filters
            .get(parameter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_required(&self, parameter: &str) -> bool {
        self.required.iter().any(|name| name == parameter)
    }
}

fn index_under<T>(map: &mut HashMap<String, Vec<Arc<T>>>, keys: &[String], def: &Arc<T>) {
    for key in keys {
        map.entry(key.clone()).or_default().push(Arc::clone(def));
    }
}

fn touched_parameters(governed: &[String], evaluate_refs: Vec<String>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for name in governed
        .iter()
        .map(|r| base_parameter(r).to_string())
        .chain(evaluate_refs)
    {
        if !keys.contains(&name) {
            keys.push(name);
        }
    }
    keys
}

/// The identifier a validation writes its messages under, so a later
/// passing evaluation clears only its own message.
pub fn validation_id(validation: &ValidationDecl) -> String {
    validation
        .fail_message
        .message
        .resource_key
        .clone()
        .unwrap_or_else(|| {
            format!(
                "validation_{}",
                base_parameter(&validation.fail_message.focus_parameter_ref)
            )
        })
}

/// Compiles raw condition declarations. A declaration must carry exactly
/// one category (`visible`, `enabled`, `validation`, `filter`,
/// `enum_filter`); anything else is logged as invalid and skipped, and
/// compilation continues with the rest.
pub fn compile(
    conditions: &[ConditionDecl],
    controls: &[Control],
    summary_panels: Vec<(String, Vec<String>)>,
) -> CompiledConditions {
    let mut compiled = CompiledConditions {
        required: controls
            .iter()
            .filter(|control| control.required)
            .map(|control| control.name.clone())
            .collect(),
        summary_panels: summary_panels.into_iter().collect(),
        ..CompiledConditions::default()
    };

    for decl in conditions {
        if decl.category_count() != 1 {
            warn!(
                "condition declaration must carry exactly one category, found {}; skipped",
                decl.category_count()
            );
            continue;
        }
        if let Some(visible) = &decl.visible {
            let def = Arc::new(visible.clone());
            let keys = touched_parameters(&visible.parameter_refs, visible.evaluate.parameter_refs());
            index_under(&mut compiled.visible, &keys, &def);
            compiled.visible_defs.push(def);
        } else if let Some(enabled) = &decl.enabled {
            let def = Arc::new(enabled.clone());
            let keys = touched_parameters(&enabled.parameter_refs, enabled.evaluate.parameter_refs());
            index_under(&mut compiled.enabled, &keys, &def);
            compiled.enabled_defs.push(def);
        } else if let Some(validation) = &decl.validation {
            let def = Arc::new(validation.clone());
            let focus = vec![validation.fail_message.focus_parameter_ref.clone()];
            let keys = touched_parameters(&focus, validation.evaluate.parameter_refs());
            index_under(&mut compiled.validations, &keys, &def);
        } else if let Some(filter) = &decl.filter {
            let def = Arc::new(filter.clone());
            let keys = vec![base_parameter(&filter.parameter_ref).to_string()];
            index_under(&mut compiled.filters, &keys, &def);
        } else if let Some(enum_filter) = &decl.enum_filter {
            let def = Arc::new(enum_filter.clone());
            let target = vec![enum_filter.target.parameter_ref.clone()];
            let keys = touched_parameters(&target, enum_filter.evaluate.parameter_refs());
            index_under(&mut compiled.enum_filters, &keys, &def);
            compiled.enum_filter_defs.push(def);
        }
    }

    compiled
}
