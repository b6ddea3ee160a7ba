//! propeller-controller - the runtime half of the propeller engine.
//!
//! [`PropertyStore`] holds values, control states, validation messages,
//! dataset metadata, and filtered enum sets behind one `{name, row, col}`
//! addressing scheme. [`PropertiesController`] is the façade UI controls
//! and embedders call: it owns the store and the per-form session, drives
//! the conditions evaluator after every mutation, filters dataset fields
//! for column pickers, and invokes the registered property listener.
//!
//! Everything here is synchronous and single-threaded by design: each
//! controller method runs to completion before returning, and one
//! controller instance exclusively owns its store.

pub mod controller;
pub mod evaluator;
pub mod session;
pub mod shadow;
pub mod shared;
pub mod store;

// Re-export the core public API
pub use controller::{
    ControllerConfig, Handlers, MoveDirection, PropertiesController, PropertyEvent,
};
pub use session::FormSession;
pub use shadow::ShadowTree;
pub use store::PropertyStore;
