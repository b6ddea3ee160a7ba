//! `greaterThan` / `lessThan`.

use log::warn;
use serde_json::Value;

use super::{OperatorContext, ParamInfo};
use crate::error::ConditionError;

fn operand_number(op: &'static str, operand: Option<&Value>) -> Option<f64> {
    match operand {
        Some(Value::Number(n)) => n.as_f64(),
        // Numeric strings are accepted on the comparison side only.
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!("{op}: comparison operand {s:?} is not numeric, condition ignored");
                None
            }
        },
        _ => {
            warn!("{op}: comparison operand is not numeric, condition ignored");
            None
        }
    }
}

fn relational_impl(
    op: &'static str,
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    compare: fn(f64, f64) -> bool,
) -> Result<bool, ConditionError> {
    let operand = match (p2, value) {
        (Some(p2), _) => p2.value,
        (None, Some(value)) => Some(value),
        (None, None) => return Err(ConditionError::MissingOperand { op }),
    };
    let subject = match p1.value {
        // Nothing to compare yet; the condition holds until a value exists.
        None | Some(Value::Null) => return Ok(true),
        // Not applicable to strings.
        Some(Value::String(_)) => return Ok(true),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(n) => n,
            None => return Ok(true),
        },
        Some(_) => {
            warn!("{op}: subject is not comparable, condition ignored");
            return Ok(true);
        }
    };
    Ok(match operand_number(op, operand) {
        Some(operand) => compare(subject, operand),
        None => true,
    })
}

/// Numeric comparison. String subjects are out of the operator's domain and
/// always satisfy the condition; calling with no operand at all is a
/// programming error.
pub fn greater_than(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    relational_impl("greaterThan", p1, p2, value, |a, b| a > b)
}

pub fn less_than(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    relational_impl("lessThan", p1, p2, value, |a, b| a < b)
}
