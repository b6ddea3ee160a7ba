//! Content operators: `contains` / `notContains` / `matches` / `notMatches`.
//!
//! Password fields are exempt from all four: their content is never
//! inspected, so the condition is treated as satisfied.

use log::warn;
use regex::Regex;
use serde_json::Value;

use propeller_model::ControlType;
use propeller_util::deep_equal;

use super::{OperatorContext, ParamInfo};
use crate::error::ConditionError;

fn is_password(p1: &ParamInfo<'_>) -> bool {
    p1.control
        .is_some_and(|c| c.control_type == ControlType::Passwordfield)
}

/// `None` means the operator could not classify the value shape; wrappers
/// resolve that to the fail-open `true`.
fn contains_outcome(subject: &Value, operand: &Value) -> Option<bool> {
    match subject {
        Value::String(s) => match operand {
            Value::String(needle) => Some(s.contains(needle.as_str())),
            Value::Number(n) => Some(s.contains(&n.to_string())),
            _ => Some(false),
        },
        Value::Array(arr) => Some(arr.iter().any(|item| deep_equal(item, operand))),
        _ => None,
    }
}

fn contains_impl(
    op: &'static str,
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
) -> Result<Option<bool>, ConditionError> {
    if is_password(p1) {
        warn!("{op}: password fields are not checked, condition ignored");
        return Ok(None);
    }
    let operand = match (p2, value) {
        (Some(p2), _) => match p2.value {
            Some(v) => v,
            None => return Ok(Some(false)),
        },
        (None, Some(value)) => value,
        (None, None) => return Err(ConditionError::MissingOperand { op }),
    };
    let Some(subject) = p1.value else {
        return Ok(Some(false));
    };
    match contains_outcome(subject, operand) {
        Some(decided) => Ok(Some(decided)),
        None => {
            warn!("{op}: unsupported value shape, condition ignored");
            Ok(None)
        }
    }
}

/// Substring test for strings, membership test for arrays. Value shapes the
/// operator cannot classify resolve to `true`.
pub fn contains(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    Ok(contains_impl("contains", p1, p2, value)?.unwrap_or(true))
}

pub fn not_contains(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    Ok(contains_impl("notContains", p1, p2, value)?
        .map(|decided| !decided)
        .unwrap_or(true))
}

fn matches_impl(
    op: &'static str,
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
) -> Option<bool> {
    if is_password(p1) {
        warn!("{op}: password fields are not checked, condition ignored");
        return None;
    }
    let pattern = match (p2.and_then(|p| p.value), value) {
        (Some(Value::String(s)), _) | (None, Some(Value::String(s))) => s,
        _ => {
            warn!("{op}: missing or non-string pattern, condition ignored");
            return None;
        }
    };
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            warn!("{op}: invalid pattern {pattern:?} ({err}), condition ignored");
            return None;
        }
    };
    match p1.value {
        Some(Value::String(s)) => Some(regex.is_match(s)),
        Some(Value::Number(n)) => Some(regex.is_match(&n.to_string())),
        _ => Some(false),
    }
}

/// Regex test. A missing or malformed pattern is an authoring defect:
/// logged and treated as satisfied.
pub fn matches(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    Ok(matches_impl("matches", p1, p2, value).unwrap_or(true))
}

pub fn not_matches(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    Ok(matches_impl("notMatches", p1, p2, value)
        .map(|decided| !decided)
        .unwrap_or(true))
}
