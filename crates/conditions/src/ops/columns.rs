//! `colNotExists` — does a candidate column name avoid colliding with the
//! dataset?

use log::warn;
use serde_json::Value;

use propeller_model::ControlType;

use super::{OperatorContext, ParamInfo};
use crate::error::ConditionError;

/// True when the subject's value does not name an existing dataset field.
/// Supported on the controls that can introduce a new column name: plain
/// text entry and structure-table cells; anything else is an authoring
/// defect, logged and treated as satisfied.
pub fn col_not_exists(
    p1: &ParamInfo<'_>,
    _p2: Option<&ParamInfo<'_>>,
    _value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    let supported = p1.control.is_some_and(|c| {
        matches!(c.control_type, ControlType::Textfield | ControlType::Structuretable)
            || c.column_index.is_some()
    });
    if !supported {
        warn!("colNotExists: unsupported control type, condition ignored");
        return Ok(true);
    }
    Ok(match p1.value {
        Some(Value::String(name)) => !ctx.dataset.contains_field(name),
        // No candidate name yet, so nothing can collide.
        _ => true,
    })
}
