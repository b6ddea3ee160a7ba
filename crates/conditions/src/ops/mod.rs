//! The condition-operator catalog.
//!
//! Every operator is a plain function with the same shape: the subject
//! parameter's info, an optional second parameter, an optional literal
//! operand, and the evaluation context. At most one of the second parameter
//! and the literal is meaningful; operators that require an operand return
//! [`ConditionError::MissingOperand`] when given neither.
//!
//! Operators applied to control types or value shapes outside their
//! contract log a warning and report `true` (condition satisfied). That
//! fail-open default keeps a form usable in the face of an authoring
//! mistake and is part of the observable contract, not a shortcut.

use serde_json::Value;

use propeller_model::{Control, DatasetMetadata, Evaluate};

use crate::error::ConditionError;

pub mod columns;
pub mod contains;
pub mod emptiness;
pub mod equality;
pub mod length;
pub mod metadata;
pub mod relational;

/// The subject (or second parameter) of an operator call: the current value
/// and the control it belongs to. A `None` value means the property is not
/// set at all, as distinct from an explicit JSON `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamInfo<'a> {
    pub value: Option<&'a Value>,
    pub control: Option<&'a Control>,
}

impl<'a> ParamInfo<'a> {
    pub fn new(value: Option<&'a Value>, control: Option<&'a Control>) -> Self {
        ParamInfo { value, control }
    }
}

/// Ambient inputs to operator evaluation: the dataset metadata for the
/// `dm*`/column operators and the emptiness-trimming config flag.
#[derive(Debug, Clone, Copy)]
pub struct OperatorContext<'a> {
    pub dataset: &'a DatasetMetadata,
    pub trim_spaces: bool,
}

/// A condition predicate.
pub type ConditionOp = for<'a> fn(
    &ParamInfo<'a>,
    Option<&ParamInfo<'a>>,
    Option<&Value>,
    &OperatorContext<'a>,
) -> Result<bool, ConditionError>;

/// Resolves an operator name to its predicate. Unknown names return `None`;
/// callers treat that as a programming error, not a runtime branch.
pub fn condition_op(name: &str) -> Option<ConditionOp> {
    let op: ConditionOp = match name {
        "equals" => equality::equals as ConditionOp,
        "notEquals" => equality::not_equals as ConditionOp,
        "contains" => contains::contains as ConditionOp,
        "notContains" => contains::not_contains as ConditionOp,
        "matches" => contains::matches as ConditionOp,
        "notMatches" => contains::not_matches as ConditionOp,
        "isEmpty" => emptiness::is_empty as ConditionOp,
        "isNotEmpty" => emptiness::is_not_empty as ConditionOp,
        "cellNotEmpty" => emptiness::cell_not_empty as ConditionOp,
        "lengthEquals" => length::length_equals as ConditionOp,
        "lengthGreaterThan" => length::length_greater_than as ConditionOp,
        "greaterThan" => relational::greater_than as ConditionOp,
        "lessThan" => relational::less_than as ConditionOp,
        "colNotExists" => columns::col_not_exists as ConditionOp,
        "dmTypeEquals" => metadata::dm_type_equals as ConditionOp,
        "dmTypeNotEquals" => metadata::dm_type_not_equals as ConditionOp,
        "dmRoleEquals" => metadata::dm_role_equals as ConditionOp,
        "dmRoleNotEquals" => metadata::dm_role_not_equals as ConditionOp,
        "dmMeasurementEquals" => metadata::dm_measurement_equals as ConditionOp,
        "dmMeasurementNotEquals" => metadata::dm_measurement_not_equals as ConditionOp,
        _ => return None,
    };
    Some(op)
}

/// Supplies `ParamInfo`s for the parameter references a condition tree
/// names. Implemented by the property store's controller, which knows the
/// current values, the control index, and (while validating one cell) the
/// row context a `table[col]` reference resolves within.
pub trait ParamResolver {
    fn param_info(&self, name: &str, col: Option<usize>) -> ParamInfo<'_>;
}

/// Evaluates a compiled condition tree.
///
/// `subject` stands in for leaves with no `parameter_ref` (used by `filter`
/// conditions, where the subject is the dataset field under test). `and`
/// groups short-circuit on the first false, `or` groups on the first true;
/// operator errors propagate unchanged.
pub fn evaluate_tree(
    tree: &Evaluate,
    subject: Option<&ParamInfo<'_>>,
    resolver: &dyn ParamResolver,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    match tree {
        Evaluate::And { and } => {
            for entry in and {
                if !evaluate_tree(entry, subject, resolver, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Evaluate::Or { or } => {
            for entry in or {
                if evaluate_tree(entry, subject, resolver, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Evaluate::Condition { condition } => {
            let op = condition_op(&condition.op)
                .ok_or_else(|| ConditionError::UnknownOperator(condition.op.clone()))?;

            let resolved_1 = condition.parameter_ref.as_deref().map(|name| {
                let (base, col) = propeller_model::condition_decl::column_reference(name);
                resolver.param_info(base, col)
            });
            let unresolved = ParamInfo::default();
            let p1 = match (&resolved_1, subject) {
                (Some(info), _) => info,
                (None, Some(subject)) => subject,
                (None, None) => &unresolved,
            };

            let resolved_2 = condition.parameter_2_ref.as_deref().map(|name| {
                let (base, col) = propeller_model::condition_decl::column_reference(name);
                resolver.param_info(base, col)
            });

            op(p1, resolved_2.as_ref(), condition.value.as_ref(), ctx)
        }
    }
}
