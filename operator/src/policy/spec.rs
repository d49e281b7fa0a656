//! Place all spec types into a single module so they can be used as a lightweight dependency
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Primary CRD describing the desired resources of the containers of a Deployment.
#[derive(CustomResource, Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[kube(
    group = "es.operator.io",
    version = "v1alpha1",
    kind = "ResourcePolicy",
    plural = "resourcepolicies",
    shortname = "rp",
    namespaced,
    status = "ResourcePolicyStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePolicySpec {
    /// Name of the Deployment, in the namespace of the policy, whose containers are kept aligned.
    pub deployment: String,
    /// Desired resources per container, matched to the Deployment containers by name.
    /// Unset or zero amounts leave the current amount of the container untouched.
    pub containers: Vec<ContainerResourcesSpec>,
}

/// Desired resources of a single container.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResourcesSpec {
    /// Name of the container
    pub name: String,
    /// Resource limits of the container
    pub limits: Option<ResourceLimitsSpec>,
    /// Resource requests of the container
    pub requests: Option<ResourceLimitsSpec>,
}

/// Describes cpu and memory amounts for either limits or requests.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimitsSpec {
    /// Cpu amount
    pub cpu: Option<Quantity>,
    /// Memory amount
    pub memory: Option<Quantity>,
}

/// Current status of the policy.
#[derive(Default, Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePolicyStatus {
    /// Containers whose resources were updated by the last reconcile pass.
    pub updated_containers: Vec<String>,
    /// Desired containers that do not exist in the Deployment.
    pub missing_containers: Vec<String>,
    /// Generation of the Deployment observed by the last reconcile pass.
    pub observed_generation: Option<i64>,
}
