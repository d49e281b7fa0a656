//! ResourcePolicy is k8s custom resource that defines the desired resources of a Deployment.

// Export all spec types
mod spec;
pub use spec::*;

mod resource_limits;

// The controller is behind the controller flag to keep the deps to a minimum
#[cfg(feature = "controller")]
pub(crate) mod controller;

#[cfg(feature = "controller")]
pub use controller::run;
