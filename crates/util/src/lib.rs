//! propeller-util - shared value helpers for the propeller workspace.

pub mod deep_equal;
pub mod emptiness;

// Re-exports for convenience
pub use deep_equal::deep_equal;
pub use emptiness::{is_blank, value_is_empty};
