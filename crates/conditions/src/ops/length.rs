//! `lengthEquals` / `lengthGreaterThan`.
//!
//! Unlike `equals`, malformed operands here are authoring warnings, not
//! errors: the condition is ignored and reported satisfied.

use log::warn;
use serde_json::Value;

use super::{OperatorContext, ParamInfo};
use crate::error::ConditionError;

fn subject_length(op: &'static str, value: Option<&Value>) -> Option<usize> {
    match value {
        Some(Value::String(s)) => Some(s.chars().count()),
        Some(Value::Array(arr)) => Some(arr.len()),
        _ => {
            warn!("{op}: subject has no length, condition ignored");
            None
        }
    }
}

fn target_length(op: &'static str, p2: Option<&ParamInfo<'_>>, value: Option<&Value>) -> Option<f64> {
    let operand = match (p2, value) {
        (Some(p2), _) => p2.value,
        (None, Some(value)) => Some(value),
        (None, None) => {
            warn!("{op}: no comparison operand, condition ignored");
            return None;
        }
    };
    match operand {
        Some(Value::Number(n)) => n.as_f64(),
        _ => {
            warn!("{op}: comparison operand is not a number, condition ignored");
            None
        }
    }
}

pub fn length_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    let (Some(len), Some(target)) = (
        subject_length("lengthEquals", p1.value),
        target_length("lengthEquals", p2, value),
    ) else {
        return Ok(true);
    };
    Ok(len as f64 == target)
}

pub fn length_greater_than(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    let (Some(len), Some(target)) = (
        subject_length("lengthGreaterThan", p1.value),
        target_length("lengthGreaterThan", p2, value),
    ) else {
        return Ok(true);
    };
    Ok(len as f64 > target)
}
