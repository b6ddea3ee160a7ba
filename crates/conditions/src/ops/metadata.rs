//! Dataset-metadata comparisons: `dmTypeEquals`, `dmRoleEquals`,
//! `dmMeasurementEquals`, and their negations.
//!
//! The subject must be a column-role control whose value references a
//! dataset field (a bare name or a `{link_ref, field_name}` pair). A
//! reference that resolves to no field makes the comparison `false` for
//! both the positive and negated forms; there is nothing to compare.

use log::warn;
use serde_json::Value;

use propeller_model::{ControlType, Field, FieldRef, ParamRole};

use super::{OperatorContext, ParamInfo};
use crate::error::ConditionError;

fn resolve_field<'a>(
    p1: &ParamInfo<'_>,
    ctx: &OperatorContext<'a>,
) -> Option<&'a Field> {
    let fref = FieldRef::from_value(p1.value?)?;
    ctx.dataset.find_field(&fref)
}

fn dm_compare(
    op: &'static str,
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
    negate: bool,
    attribute: fn(&Field) -> Option<&str>,
) -> Result<bool, ConditionError> {
    let column_role = p1.control.is_some_and(|c| {
        c.role == Some(ParamRole::Column)
            || matches!(
                c.control_type,
                ControlType::Selectcolumn | ControlType::Selectcolumns
            )
    });
    if !column_role {
        warn!("{op}: control does not reference a dataset column, condition ignored");
        return Ok(true);
    }
    let expected = match (p2.and_then(|p| p.value), value) {
        (Some(Value::String(s)), _) | (None, Some(Value::String(s))) => s.as_str(),
        _ => {
            warn!("{op}: missing or non-string comparison operand, condition ignored");
            return Ok(true);
        }
    };
    Ok(match resolve_field(p1, ctx) {
        Some(field) => {
            let matches = attribute(field) == Some(expected);
            if negate {
                !matches
            } else {
                matches
            }
        }
        // Unresolvable reference: nothing to compare against.
        None => false,
    })
}

fn field_type(field: &Field) -> Option<&str> {
    Some(field.field_type.as_str())
}

fn field_role(field: &Field) -> Option<&str> {
    field.metadata.modeling_role.as_deref()
}

fn field_measure(field: &Field) -> Option<&str> {
    field.metadata.measure.as_deref()
}

pub fn dm_type_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    dm_compare("dmTypeEquals", p1, p2, value, ctx, false, field_type)
}

pub fn dm_type_not_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    dm_compare("dmTypeNotEquals", p1, p2, value, ctx, true, field_type)
}

pub fn dm_role_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    dm_compare("dmRoleEquals", p1, p2, value, ctx, false, field_role)
}

pub fn dm_role_not_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    dm_compare("dmRoleNotEquals", p1, p2, value, ctx, true, field_role)
}

pub fn dm_measurement_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    dm_compare("dmMeasurementEquals", p1, p2, value, ctx, false, field_measure)
}

pub fn dm_measurement_not_equals(
    p1: &ParamInfo<'_>,
    p2: Option<&ParamInfo<'_>>,
    value: Option<&Value>,
    ctx: &OperatorContext<'_>,
) -> Result<bool, ConditionError> {
    dm_compare("dmMeasurementNotEquals", p1, p2, value, ctx, true, field_measure)
}
