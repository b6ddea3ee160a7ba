//! `equals` / `notEquals`.

use serde_json::Value;

use propeller_util::deep_equal;

use super::{OperatorContext, ParamInfo};
use crate::error::ConditionError;

fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => deep_equal(a, b),
        // An unset property only equals another unset property.
        (None, None) => true,
        _ => false,
    }
}

/// Deep value equality. The comparison side is the second parameter when
/// one is supplied, otherwise the literal; supplying neither is a
/// programming error.
pub fn equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    match (p2, value) {
        (Some(p2), _) => Ok(values_equal(p1.value, p2.value)),
        (None, Some(value)) => Ok(values_equal(p1.value, Some(value))),
        (None, None) => Err(ConditionError::MissingOperand { op: "equals" }),
    }
}

/// Exact complement of [`equals`] for every non-erroring input.
pub fn not_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    equals(p1, p2, value, ctx)
        .map(|result| !result)
        .map_err(|_| ConditionError::MissingOperand { op: "notEquals" })
}
