use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::MessageKind;

/// One leaf predicate: an operator name, the parameter under test, and at
/// most one comparison operand (either a second parameter or a literal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Absent only inside `filter` declarations, where the subject is the
    /// dataset field being considered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_ref: Option<String>,
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_2_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// The boolean structure of a condition: a single leaf or an `and`/`or`
/// group, nested to arbitrary depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evaluate {
    Condition { condition: ConditionSpec },
    And { and: Vec<Evaluate> },
    Or { or: Vec<Evaluate> },
}

impl Evaluate {
    /// Every `parameter_ref`/`parameter_2_ref` mentioned anywhere in the
    /// tree, in first-appearance order without duplicates.
    pub fn parameter_refs(&self) -> Vec<String> {
        let mut refs = Vec::new();
        self.collect_refs(&mut refs);
        refs
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        match self {
            Evaluate::Condition { condition } => {
                for name in [&condition.parameter_ref, &condition.parameter_2_ref]
                    .into_iter()
                    .flatten()
                {
                    let base = base_parameter(name).to_string();
                    if !refs.contains(&base) {
                        refs.push(base);
                    }
                }
            }
            Evaluate::And { and } => and.iter().for_each(|e| e.collect_refs(refs)),
            Evaluate::Or { or } => or.iter().for_each(|e| e.collect_refs(refs)),
        }
    }
}

/// Strips a `table[2]` column suffix down to the table parameter name.
pub fn base_parameter(parameter_ref: &str) -> &str {
    match parameter_ref.split_once('[') {
        Some((base, _)) => base,
        None => parameter_ref,
    }
}

/// Splits a `table[2]` reference into the parameter name and column index.
pub fn column_reference(parameter_ref: &str) -> (&str, Option<usize>) {
    if let Some((base, rest)) = parameter_ref.split_once('[') {
        if let Some(idx) = rest.strip_suffix(']').and_then(|s| s.parse().ok()) {
            return (base, Some(idx));
        }
    }
    (parameter_ref, None)
}

/// A `visible` or `enabled` declaration: the parameters it governs and the
/// condition that decides their state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiCondition {
    pub parameter_refs: Vec<String>,
    pub evaluate: Evaluate,
}

/// Text of a validation failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_key: Option<String>,
}

/// Severity, target, and text of a validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub focus_parameter_ref: String,
    pub message: MessageDef,
}

/// A `validation` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDecl {
    pub fail_message: FailMessage,
    pub evaluate: Evaluate,
}

/// A `filter` declaration: strips dataset fields failing the condition from
/// the named column-picker parameter's offered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDecl {
    pub parameter_ref: String,
    pub evaluate: Evaluate,
}

/// Target of an `enum_filter`: the parameter and the subset of its enum
/// values to offer while the condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumFilterTarget {
    pub parameter_ref: String,
    pub values: Vec<String>,
}

/// An `enum_filter` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumFilterDecl {
    pub target: EnumFilterTarget,
    pub evaluate: Evaluate,
}

/// One raw entry of a form document's `conditions` array. A valid entry
/// carries exactly one of the five category fields; the parser rejects and
/// skips anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<UiCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<UiCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_filter: Option<EnumFilterDecl>,
}

impl ConditionDecl {
    /// Number of category fields present. Exactly one is valid.
    pub fn category_count(&self) -> usize {
        [
            self.visible.is_some(),
            self.enabled.is_some(),
            self.validation.is_some(),
            self.filter.is_some(),
            self.enum_filter.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}
