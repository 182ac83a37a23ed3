//! Recommendation creation and lifecycle.
//!
//! [`factory`] turns significant optimizer outcomes into operator-facing
//! recommendations; [`LifecycleManager`] drives them through the approval
//! state machine and expires the ones nobody acts on.

pub mod factory;
pub mod lifecycle;

pub use lifecycle::LifecycleManager;
