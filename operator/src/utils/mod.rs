//! Utils is shared functions and constants for the controller

use std::time::Duration;

use kube::client::Client;

/// Operator Context
pub struct Context {
    /// Kube client
    pub k_client: Client,
    /// Delay before a policy is reconciled again after a successful pass
    pub requeue: Duration,
}

impl Context {
    /// Create new context
    pub fn new(k_client: Client, requeue: Duration) -> Self {
        Context { k_client, requeue }
    }
}
