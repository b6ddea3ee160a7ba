//! `isEmpty` / `isNotEmpty` / `cellNotEmpty`.

use log::warn;
use serde_json::Value;

use propeller_model::ControlType;
use propeller_util::{is_blank, value_is_empty};

use super::{OperatorContext, ParamInfo};
use crate::error::ConditionError;

/// True when the subject holds no content: unset, `null`, an empty string
/// (whitespace-only counts when `trim_spaces` is set), or an empty
/// array/object.
pub fn is_empty(
    p1: &ParamInfo<'_>,
    _p2: Option<&ParamInfo<'_>>,
    _value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    Ok(match p1.value {
        None => true,
        Some(value) => value_is_empty(value, ctx.trim_spaces),
    })
}

fn range_endpoint_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_blank(s),
        _ => false,
    }
}

/// Complement of [`is_empty`], with two date-shaped special cases: any
/// non-null value of a date/time control counts as content (there is no way
/// to type a "partial" date), and a 2-element date-range array is empty
/// only when both endpoints are blank.
pub fn is_not_empty(
    p1: &ParamInfo<'_>,
    _p2: Option<&ParamInfo<'_>>,
    _value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    let Some(value) = p1.value else {
        return Ok(false);
    };
    if let Some(control) = p1.control {
        if control.control_type == ControlType::DatepickerRange {
            if let Value::Array(arr) = value {
                if arr.len() == 2 {
                    return Ok(!(range_endpoint_blank(&arr[0])
                        && range_endpoint_blank(&arr[1])));
                }
            }
        } else if control.control_type.is_date_or_time() {
            return Ok(!value.is_null());
        }
    }
    Ok(!value_is_empty(value, ctx.trim_spaces))
}

/// Non-blank test for a structure-table cell. Any other control type is an
/// authoring defect: logged and treated as satisfied.
pub fn cell_not_empty(
    p1: &ParamInfo<'_>,
    _p2: Option<&ParamInfo<'_>>,
    _value: Option<&Value>,
    _ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    let in_table = p1.control.is_some_and(|c| {
        c.control_type == ControlType::Structuretable || c.column_index.is_some()
    });
    if !in_table {
        warn!("cellNotEmpty: only supported within a structuretable, condition ignored");
        return Ok(true);
    }
    Ok(match p1.value {
        None => false,
        Some(value) => !value_is_empty(value, true),
    })
}
