//! Contract tests for the condition-operator catalog: exact edge-case
//! behavior, fail-open defaults, and the per-operator error policy.

use serde_json::{json, Value};

use propeller_conditions::{condition_op, ConditionError, OperatorContext, ParamInfo};
use propeller_model::{
    Control, ControlType, DatasetMetadata, ParamRole, PropType, ValueDef,
};

fn dataset() -> DatasetMetadata {
    serde_json::from_value(json!([
        {
            "name": "data",
            "fields": [
                {"name": "Age", "type": "integer",
                 "metadata": {"measure": "range", "modeling_role": "input"}},
                {"name": "Sex", "type": "string",
                 "metadata": {"measure": "discrete", "modeling_role": "input"}},
                {"name": "Drug", "type": "string",
                 "metadata": {"measure": "discrete", "modeling_role": "target"}}
            ]
        }
    ]))
    .unwrap()
}

fn control(control_type: ControlType) -> Control {
    Control::new("subject", control_type, ValueDef::scalar(PropType::String))
}

fn column_control() -> Control {
    control(ControlType::Selectcolumn).with_role(ParamRole::Column)
}

/// Runs an operator with a literal comparison operand.
fn run(
    op: &str,
    subject: Option<&Value>,
    subject_control: &Control,
    literal: Option<&Value>,
    trim_spaces: bool,
) -> Result<bool, ConditionError> {
    let dataset = dataset();
    let ctx = OperatorContext {
        dataset: &dataset,
        trim_spaces,
    };
    let p1 = ParamInfo::new(subject, Some(subject_control));
    condition_op(op).unwrap_or_else(|| panic!("operator {op} not registered"))(
        &p1, None, literal, &ctx,
    )
}

/// Runs an operator with a second-parameter comparison operand.
fn run2(
    op: &str,
    subject: Option<&Value>,
    other: Option<&Value>,
) -> Result<bool, ConditionError> {
    let dataset = dataset();
    let ctx = OperatorContext {
        dataset: &dataset,
        trim_spaces: true,
    };
    let c1 = control(ControlType::Textfield);
    let c2 = control(ControlType::Textfield);
    let p1 = ParamInfo::new(subject, Some(&c1));
    let p2 = ParamInfo::new(other, Some(&c2));
    condition_op(op).unwrap_or_else(|| panic!("operator {op} not registered"))(
        &p1,
        Some(&p2),
        None,
        &ctx,
    )
}

fn check(op: &str, subject: Value, literal: Value, expected: bool) {
    let result = run(
        op,
        Some(&subject),
        &control(ControlType::Textfield),
        Some(&literal),
        true,
    )
    .unwrap();
    assert_eq!(result, expected, "{op}({subject}, {literal})");
}

// ----------------------------------------------------------------- equals

#[test]
fn test_equals_scalars_and_structures() {
    check("equals", json!("a"), json!("a"), true);
    check("equals", json!("a"), json!("b"), false);
    check("equals", json!(3), json!(3), true);
    check("equals", json!([1, 2]), json!([1, 2]), true);
    check("equals", json!([1, 2]), json!([2, 1]), false);
    check("equals", json!({"a": 1, "b": 2}), json!({"b": 2, "a": 1}), true);
}

#[test]
fn test_equals_second_parameter() {
    assert!(run2("equals", Some(&json!("x")), Some(&json!("x"))).unwrap());
    assert!(!run2("equals", Some(&json!("x")), Some(&json!("y"))).unwrap());
    // Two unset parameters are equal; unset never equals a value.
    assert!(run2("equals", None, None).unwrap());
    assert!(!run2("equals", None, Some(&json!(null))).unwrap());
}

#[test]
fn test_equals_without_operand_is_an_error() {
    let err = run(
        "equals",
        Some(&json!("x")),
        &control(ControlType::Textfield),
        None,
        true,
    )
    .unwrap_err();
    assert!(matches!(err, ConditionError::MissingOperand { op: "equals" }));
}

#[test]
fn test_not_equals_is_exact_complement() {
    let pairs = [
        (json!("a"), json!("a")),
        (json!("a"), json!("b")),
        (json!(1), json!(1.0)),
        (json!([1, 2]), json!([1, 2])),
        (json!(null), json!(null)),
        (json!(null), json!("a")),
        (json!({"a": 1}), json!({"a": 2})),
    ];
    for (subject, operand) in pairs {
        let eq = run(
            "equals",
            Some(&subject),
            &control(ControlType::Textfield),
            Some(&operand),
            true,
        )
        .unwrap();
        let ne = run(
            "notEquals",
            Some(&subject),
            &control(ControlType::Textfield),
            Some(&operand),
            true,
        )
        .unwrap();
        assert_eq!(eq, !ne, "equals/notEquals({subject}, {operand})");
    }
}

// --------------------------------------------------------------- contains

#[test]
fn test_contains_strings_and_arrays() {
    check("contains", json!([1, 2, 3]), json!(2), true);
    check("contains", json!([1, 2, 3]), json!(4), false);
    check("contains", json!("sbeve"), json!("be"), true);
    check("contains", json!("she believed"), json!("sbeve"), false);
    check("notContains", json!("she believed"), json!("sbeve"), true);
    check("notContains", json!([1, 2, 3]), json!(2), false);
}

#[test]
fn test_contains_unclassifiable_shape_defaults_true() {
    // Neither a string nor an array: the operator cannot classify it.
    check("contains", json!(42), json!(2), true);
    check("notContains", json!(42), json!(2), true);
    check("contains", json!({"a": 1}), json!("a"), true);
}

#[test]
fn test_contains_password_field_is_exempt() {
    let result = run(
        "contains",
        Some(&json!("hunter2")),
        &control(ControlType::Passwordfield),
        Some(&json!("hunter")),
        true,
    )
    .unwrap();
    assert!(result);
}

#[test]
fn test_contains_without_operand_is_an_error() {
    let err = run(
        "contains",
        Some(&json!("abc")),
        &control(ControlType::Textfield),
        None,
        true,
    )
    .unwrap_err();
    assert!(matches!(err, ConditionError::MissingOperand { op: "contains" }));
}

// ---------------------------------------------------------------- matches

#[test]
fn test_matches_regex() {
    check("matches", json!("sbeve"), json!("^sb"), true);
    check("matches", json!("sbeve"), json!("^be"), false);
    check("notMatches", json!("sbeve"), json!("^be"), true);
}

#[test]
fn test_matches_malformed_pattern_defaults_true() {
    check("matches", json!("sbeve"), json!("("), true);
    check("notMatches", json!("sbeve"), json!("("), true);
}

#[test]
fn test_matches_missing_pattern_defaults_true() {
    let result = run(
        "matches",
        Some(&json!("sbeve")),
        &control(ControlType::Textfield),
        None,
        true,
    )
    .unwrap();
    assert!(result);
}

// --------------------------------------------------------------- emptiness

#[test]
fn test_is_empty() {
    let c = control(ControlType::Textfield);
    assert!(run("isEmpty", Some(&json!("")), &c, None, true).unwrap());
    assert!(run("isEmpty", Some(&json!("  ")), &c, None, true).unwrap());
    assert!(!run("isEmpty", Some(&json!("x")), &c, None, true).unwrap());
    assert!(run("isEmpty", Some(&json!([])), &c, None, true).unwrap());
    assert!(!run("isEmpty", Some(&json!({"a": 1})), &c, None, true).unwrap());
    assert!(run("isEmpty", Some(&json!(null)), &c, None, true).unwrap());
    assert!(run("isEmpty", None, &c, None, true).unwrap());
}

#[test]
fn test_is_not_empty_trim_spaces_config() {
    let c = control(ControlType::Textfield);
    assert!(!run("isNotEmpty", Some(&json!("  ")), &c, None, true).unwrap());
    // Whitespace counts as content when trimming is disabled.
    assert!(run("isNotEmpty", Some(&json!("  ")), &c, None, false).unwrap());
}

#[test]
fn test_is_not_empty_date_range() {
    let c = control(ControlType::DatepickerRange);
    assert!(!run("isNotEmpty", Some(&json!(["", "  "])), &c, None, true).unwrap());
    assert!(run("isNotEmpty", Some(&json!(["2024-01-01", ""])), &c, None, true).unwrap());
    assert!(run("isNotEmpty", Some(&json!(["", "2024-01-01"])), &c, None, true).unwrap());
}

#[test]
fn test_is_not_empty_date_control_any_value_counts() {
    let c = control(ControlType::Datefield);
    assert!(run("isNotEmpty", Some(&json!("not-a-real-date")), &c, None, true).unwrap());
    assert!(!run("isNotEmpty", Some(&json!(null)), &c, None, true).unwrap());
}

#[test]
fn test_cell_not_empty_requires_structuretable() {
    let table = control(ControlType::Structuretable);
    assert!(run("cellNotEmpty", Some(&json!("Na")), &table, None, true).unwrap());
    assert!(!run("cellNotEmpty", Some(&json!("")), &table, None, true).unwrap());
    assert!(!run("cellNotEmpty", None, &table, None, true).unwrap());
    // Any other control type is ignored and reports satisfied.
    let text = control(ControlType::Textfield);
    assert!(run("cellNotEmpty", Some(&json!("")), &text, None, true).unwrap());
}

// ------------------------------------------------------------------ length

#[test]
fn test_length_greater_than() {
    check("lengthGreaterThan", json!([1, 2, 3]), json!(2), true);
    check("lengthGreaterThan", json!([1, 2, 3]), json!(3), false);
    check("lengthGreaterThan", json!("test"), json!(3), true);
    // A string comparison operand cannot be a length: warn and satisfy.
    check("lengthGreaterThan", json!("test"), json!("test"), true);
}

#[test]
fn test_length_equals() {
    check("lengthEquals", json!([1, 2, 3]), json!(3), true);
    check("lengthEquals", json!("abc"), json!(3), true);
    check("lengthEquals", json!("abc"), json!(2), false);
    // Subjects without a length: warn and satisfy.
    check("lengthEquals", json!(42), json!(2), true);
}

#[test]
fn test_length_missing_operand_defaults_true() {
    let result = run(
        "lengthGreaterThan",
        Some(&json!([1, 2])),
        &control(ControlType::Textfield),
        None,
        true,
    )
    .unwrap();
    assert!(result);
}

// -------------------------------------------------------------- relational

#[test]
fn test_greater_and_less_than() {
    check("greaterThan", json!(5), json!(3), true);
    check("greaterThan", json!(3), json!(5), false);
    check("lessThan", json!(3), json!(5), true);
    check("lessThan", json!(5), json!(3), false);
    // Numeric strings are accepted on the comparison side.
    check("greaterThan", json!(5), json!("3"), true);
}

#[test]
fn test_relational_string_subject_defaults_true() {
    check("greaterThan", json!("abc"), json!(3), true);
    check("lessThan", json!("abc"), json!(3), true);
}

#[test]
fn test_relational_null_subject_defaults_true() {
    check("greaterThan", json!(null), json!(3), true);
}

#[test]
fn test_relational_without_operand_is_an_error() {
    let err = run(
        "greaterThan",
        Some(&json!(5)),
        &control(ControlType::Numberfield),
        None,
        true,
    )
    .unwrap_err();
    assert!(matches!(err, ConditionError::MissingOperand { op: "greaterThan" }));
}

// ----------------------------------------------------------------- columns

#[test]
fn test_col_not_exists() {
    let c = control(ControlType::Textfield);
    assert!(run("colNotExists", Some(&json!("BP")), &c, None, true).unwrap());
    assert!(!run("colNotExists", Some(&json!("Age")), &c, None, true).unwrap());
    assert!(run("colNotExists", None, &c, None, true).unwrap());
    // Unsupported control types are ignored and report satisfied.
    let checkbox = control(ControlType::Checkbox);
    assert!(run("colNotExists", Some(&json!("Age")), &checkbox, None, true).unwrap());
}

// ---------------------------------------------------------------- dm* ops

#[test]
fn test_dm_type_equals() {
    let c = column_control();
    assert!(run("dmTypeEquals", Some(&json!("Age")), &c, Some(&json!("integer")), true).unwrap());
    assert!(!run("dmTypeEquals", Some(&json!("Age")), &c, Some(&json!("string")), true).unwrap());
    // A reference that resolves to no field is false, never an error.
    assert!(!run("dmTypeEquals", Some(&json!("BP")), &c, Some(&json!("integer")), true).unwrap());
    assert!(!run("dmTypeNotEquals", Some(&json!("BP")), &c, Some(&json!("integer")), true).unwrap());
}

#[test]
fn test_dm_type_not_equals() {
    let c = column_control();
    assert!(!run("dmTypeNotEquals", Some(&json!("Age")), &c, Some(&json!("integer")), true).unwrap());
    assert!(run("dmTypeNotEquals", Some(&json!("Age")), &c, Some(&json!("string")), true).unwrap());
}

#[test]
fn test_dm_role_and_measurement() {
    let c = column_control();
    assert!(run("dmRoleEquals", Some(&json!("Drug")), &c, Some(&json!("target")), true).unwrap());
    assert!(!run("dmRoleEquals", Some(&json!("Age")), &c, Some(&json!("target")), true).unwrap());
    assert!(run("dmRoleNotEquals", Some(&json!("Age")), &c, Some(&json!("target")), true).unwrap());
    assert!(run("dmMeasurementEquals", Some(&json!("Age")), &c, Some(&json!("range")), true).unwrap());
    assert!(run("dmMeasurementNotEquals", Some(&json!("Sex")), &c, Some(&json!("range")), true).unwrap());
}

#[test]
fn test_dm_link_ref_reference() {
    let c = column_control();
    let reference = json!({"link_ref": "data", "field_name": "Age"});
    assert!(run("dmTypeEquals", Some(&reference), &c, Some(&json!("integer")), true).unwrap());
}

#[test]
fn test_dm_non_column_control_defaults_true() {
    let c = control(ControlType::Textfield);
    assert!(run("dmTypeEquals", Some(&json!("Age")), &c, Some(&json!("string")), true).unwrap());
}

// ---------------------------------------------------------------- registry

#[test]
fn test_unknown_operator_is_unregistered() {
    assert!(condition_op("noSuchOperator").is_none());
    assert!(condition_op("equals").is_some());
    assert!(condition_op("dmMeasurementNotEquals").is_some());
}
