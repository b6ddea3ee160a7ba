use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The rendered widget kind of a control. `Custom` absorbs host-defined
/// control types the engine has no special handling for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlType {
    Textfield,
    Passwordfield,
    Textarea,
    Numberfield,
    Spinner,
    Checkbox,
    Radioset,
    Oneofselect,
    Someofselect,
    Selectcolumn,
    Selectcolumns,
    Structuretable,
    Structurelisteditor,
    Structureeditor,
    Datefield,
    Timefield,
    Datepicker,
    DatepickerRange,
    Toggletext,
    Expression,
    Readonly,
    Hidden,
    #[serde(other)]
    Custom,
}

impl ControlType {
    pub fn is_table(&self) -> bool {
        matches!(
            self,
            ControlType::Structuretable | ControlType::Structurelisteditor
        )
    }

    pub fn is_date_or_time(&self) -> bool {
        matches!(
            self,
            ControlType::Datefield
                | ControlType::Timefield
                | ControlType::Datepicker
                | ControlType::DatepickerRange
        )
    }
}

/// Role a parameter plays with respect to dataset metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamRole {
    Column,
    NewColumn,
    #[serde(other)]
    Unknown,
}

/// Declared value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Integer,
    Long,
    Double,
    Boolean,
    Date,
    Time,
    Timestamp,
    Structure,
    #[serde(other)]
    Unknown,
}

/// Shape of a parameter's value: its type, whether it is list-valued, and
/// the default used when the form document supplies no current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDef {
    pub prop_type: PropType,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl ValueDef {
    pub fn scalar(prop_type: PropType) -> Self {
        ValueDef {
            prop_type,
            is_list: false,
            default_value: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Definition of one editable control.
///
/// Table controls carry their per-column definitions in `sub_controls`;
/// each sub-control's `column_index` is its position within a row. The
/// flattened control index built at form load addresses sub-controls by
/// `(table name, column_index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Control {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub control_type: ControlType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ParamRole>,
    pub value_def: ValueDef,
    #[serde(default)]
    pub sub_controls: Vec<Control>,
    #[serde(default = "default_true")]
    pub add_remove_rows: bool,
    #[serde(default)]
    pub summary: bool,
    #[serde(default)]
    pub required: bool,
    /// Allowed values for enumerated controls (radio sets, selects).
    #[serde(default)]
    pub values: Vec<String>,
    /// Position of this sub-control within a table row. Assigned when the
    /// control list is flattened; `None` for top-level controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,
}

impl Control {
    pub fn new(name: impl Into<String>, control_type: ControlType, value_def: ValueDef) -> Self {
        Control {
            name: name.into(),
            label: None,
            control_type,
            role: None,
            value_def,
            sub_controls: Vec::new(),
            add_remove_rows: true,
            summary: false,
            required: false,
            values: Vec::new(),
            column_index: None,
        }
    }

    pub fn with_role(mut self, role: ParamRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The sub-control holding dataset field names, if this is a
    /// column-keyed table.
    pub fn key_column(&self) -> Option<usize> {
        self.sub_controls
            .iter()
            .position(|sc| sc.role == Some(ParamRole::Column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_deserialize_defaults() {
        let control: Control = serde_json::from_value(json!({
            "name": "age",
            "controlType": "numberfield",
            "valueDef": {"propType": "integer"}
        }))
        .unwrap();
        assert!(control.add_remove_rows);
        assert!(!control.required);
        assert!(control.sub_controls.is_empty());
        assert_eq!(control.value_def.prop_type, PropType::Integer);
    }

    #[test]
    fn test_unknown_control_type_is_custom() {
        let control: Control = serde_json::from_value(json!({
            "name": "x",
            "controlType": "somethingHostDefined",
            "valueDef": {"propType": "string"}
        }))
        .unwrap();
        assert_eq!(control.control_type, ControlType::Custom);
    }

    #[test]
    fn test_key_column() {
        let mut table = Control::new(
            "keys",
            ControlType::Structuretable,
            ValueDef::scalar(PropType::Structure),
        );
        table.sub_controls = vec![
            Control::new("field", ControlType::Selectcolumn, ValueDef::scalar(PropType::String))
                .with_role(ParamRole::Column),
            Control::new("order", ControlType::Toggletext, ValueDef::scalar(PropType::String)),
        ];
        assert_eq!(table.key_column(), Some(0));
    }
}
