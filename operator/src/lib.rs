//! Provides API for the operator and related tooling.
#![warn(missing_docs)]

/// Deployment module for the observed Deployment and per container updates.
pub mod deployment;
/// Policy module for the ResourcePolicy custom resource and its controller.
pub mod policy;
/// Resources module for comparing and reconciling container resources.
pub mod resources;
/// Utils module for shared utility functions.
#[cfg(feature = "controller")]
pub mod utils;

/// Name used as the field manager for every write made by the operator.
#[cfg(feature = "controller")]
const CONTROLLER_NAME: &str = "elasticsearch-operator";
