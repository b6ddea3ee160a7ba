use thiserror::Error;

/// Programming errors in condition authoring. These surface to the caller
/// unchanged: a condition that cannot be evaluated at all should fail loudly
/// during development, unlike the fail-open authoring warnings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("\"{op}\" operator requires a second parameter or a literal value")]
    MissingOperand { op: &'static str },

    #[error("unknown condition operator \"{0}\"")]
    UnknownOperator(String),
}
