//! Tests for condition-tree evaluation: leaf dispatch, `and`/`or`
//! grouping, second-parameter resolution, and the unknown-operator error.

use std::collections::HashMap;

use serde_json::{json, Value};

use propeller_conditions::ops::ParamResolver;
use propeller_conditions::{evaluate_tree, ConditionError, OperatorContext, ParamInfo};
use propeller_model::{Control, ControlType, DatasetMetadata, Evaluate, PropType, ValueDef};

struct MapResolver {
    values: HashMap<String, Value>,
    controls: HashMap<String, Control>,
}

impl MapResolver {
    fn new(values: &[(&str, Value)]) -> Self {
        MapResolver {
            values: values
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            controls: values
                .iter()
                .map(|(name, _)| {
                    (
                        name.to_string(),
                        Control::new(*name, ControlType::Textfield, ValueDef::scalar(PropType::String)),
                    )
                })
                .collect(),
        }
    }
}

impl ParamResolver for MapResolver {
    fn param_info(&self, name: &str, _col: Option<usize>) -> ParamInfo<'_> {
        ParamInfo::new(self.values.get(name), self.controls.get(name))
    }
}

fn eval(tree: Value, values: &[(&str, Value)]) -> Result<bool, ConditionError> {
    let tree: Evaluate = serde_json::from_value(tree).unwrap();
    let resolver = MapResolver::new(values);
    let dataset = DatasetMetadata::default();
    let ctx = OperatorContext {
        dataset: &dataset,
        trim_spaces: true,
    };
    evaluate_tree(&tree, None, &resolver, &ctx)
}

#[test]
fn test_leaf_condition() {
    let tree = json!({"condition": {"parameter_ref": "a", "op": "equals", "value": "x"}});
    assert!(eval(tree.clone(), &[("a", json!("x"))]).unwrap());
    assert!(!eval(tree, &[("a", json!("y"))]).unwrap());
}

#[test]
fn test_and_group() {
    let tree = json!({"and": [
        {"condition": {"parameter_ref": "a", "op": "isNotEmpty"}},
        {"condition": {"parameter_ref": "b", "op": "isNotEmpty"}}
    ]});
    assert!(eval(tree.clone(), &[("a", json!("1")), ("b", json!("2"))]).unwrap());
    assert!(!eval(tree, &[("a", json!("1")), ("b", json!(""))]).unwrap());
}

#[test]
fn test_or_group_nested() {
    let tree = json!({"or": [
        {"condition": {"parameter_ref": "a", "op": "equals", "value": "go"}},
        {"and": [
            {"condition": {"parameter_ref": "b", "op": "isNotEmpty"}},
            {"condition": {"parameter_ref": "c", "op": "greaterThan", "value": 10}}
        ]}
    ]});
    assert!(eval(tree.clone(), &[("a", json!("go")), ("b", json!("")), ("c", json!(0))]).unwrap());
    assert!(eval(tree.clone(), &[("a", json!("stop")), ("b", json!("x")), ("c", json!(11))]).unwrap());
    assert!(!eval(tree, &[("a", json!("stop")), ("b", json!("x")), ("c", json!(5))]).unwrap());
}

#[test]
fn test_and_short_circuits_before_error() {
    // The second leaf would error (equals with no operand), but the first
    // already decided the group.
    let tree = json!({"and": [
        {"condition": {"parameter_ref": "a", "op": "isNotEmpty"}},
        {"condition": {"parameter_ref": "b", "op": "equals"}}
    ]});
    assert!(!eval(tree, &[("a", json!("")), ("b", json!("x"))]).unwrap());
}

#[test]
fn test_operator_error_propagates() {
    let tree = json!({"condition": {"parameter_ref": "a", "op": "equals"}});
    let err = eval(tree, &[("a", json!("x"))]).unwrap_err();
    assert!(matches!(err, ConditionError::MissingOperand { op: "equals" }));
}

#[test]
fn test_unknown_operator_errors() {
    let tree = json!({"condition": {"parameter_ref": "a", "op": "fancyOp"}});
    let err = eval(tree, &[("a", json!("x"))]).unwrap_err();
    assert_eq!(err, ConditionError::UnknownOperator("fancyOp".to_string()));
}

#[test]
fn test_second_parameter_resolution() {
    let tree = json!({"condition": {
        "parameter_ref": "a", "op": "equals", "parameter_2_ref": "b"}});
    assert!(eval(tree.clone(), &[("a", json!("same")), ("b", json!("same"))]).unwrap());
    assert!(!eval(tree, &[("a", json!("one")), ("b", json!("two"))]).unwrap());
}
