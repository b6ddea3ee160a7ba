//! propeller-model - data types for the propeller properties engine.
//!
//! Everything in this crate is plain data: the `{name, row, col}` addressing
//! scheme, control states, error messages, dataset metadata, control and
//! form-document definitions, and the raw condition declarations a form
//! document carries. Behavior lives in `propeller-conditions` and
//! `propeller-controller`.

pub mod condition_decl;
pub mod control;
pub mod dataset;
pub mod error;
pub mod form;
pub mod message;
pub mod property_id;
pub mod shared;
pub mod state;

// Re-exports for convenience
pub use condition_decl::{
    ConditionDecl, ConditionSpec, EnumFilterDecl, EnumFilterTarget, Evaluate, FailMessage,
    FilterDecl, MessageDef, UiCondition, ValidationDecl,
};
pub use control::{Control, ControlType, ParamRole, PropType, ValueDef};
pub use dataset::{DatasetMetadata, Field, FieldMetadata, FieldRef, Schema};
pub use error::FormError;
pub use form::{Form, FormData, Panel, PanelType, UiItem};
pub use message::{ErrorMessage, MessageKind};
pub use property_id::PropertyId;
pub use shared::{SharedControlName, SharedControlsGroup};
pub use state::ControlState;
