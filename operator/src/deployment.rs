//! Read-only view of an observed Deployment and the per container resource update.
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Container};
use kube::ResourceExt;
use tracing::debug;

use crate::resources::{reconcile, ContainerSpec, QuantityError};

/// Wraps a Deployment as observed in the cluster.
#[derive(Debug, Clone)]
pub struct DeploymentNode {
    deployment: Deployment,
}

/// Outcome of aligning the containers of a [`DeploymentNode`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeUpdate {
    /// The Deployment to submit, present only if at least one container changed.
    pub deployment: Option<Deployment>,
    /// Names of the containers whose resources changed.
    pub updated_containers: Vec<String>,
    /// Names of desired containers not found in the Deployment.
    pub missing_containers: Vec<String>,
}

impl DeploymentNode {
    /// Wrap an observed Deployment
    pub fn new(deployment: Deployment) -> Self {
        Self { deployment }
    }

    /// Name of the Deployment
    pub fn name(&self) -> String {
        self.deployment.name_any()
    }

    /// Generation of the Deployment, if the API server assigned one.
    pub fn generation(&self) -> Option<i64> {
        self.deployment.metadata.generation
    }

    /// Containers of the pod template.
    pub fn containers(&self) -> &[Container] {
        self.deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod| pod.containers.as_slice())
            .unwrap_or_default()
    }

    /// Align every desired container with its counterpart of the same name.
    ///
    /// The observed Deployment is never modified, a changed copy is returned instead.
    pub fn update_containers(&self, desired: &[ContainerSpec]) -> Result<NodeUpdate, QuantityError> {
        let mut deployment = self.deployment.clone();
        let mut update = NodeUpdate::default();
        let containers = deployment
            .spec
            .as_mut()
            .and_then(|spec| spec.template.spec.as_mut())
            .map(|pod| &mut pod.containers);
        let Some(containers) = containers else {
            update.missing_containers = desired.iter().map(|d| d.name.clone()).collect();
            return Ok(update);
        };

        for want in desired {
            let Some(current) = containers.iter_mut().find(|c| c.name == want.name) else {
                debug!(deployment = %self.name(), container = %want.name, "container not found");
                update.missing_containers.push(want.name.clone());
                continue;
            };
            let (container, changed) = update_resources(self, current, want)?;
            if changed {
                *current = container;
                update.updated_containers.push(want.name.clone());
            }
        }

        if !update.updated_containers.is_empty() {
            update.deployment = Some(deployment);
        }
        Ok(update)
    }
}

/// Reconcile the resources of one container against the desired resources.
///
/// Returns the container with merged resources and whether they changed. Fields other
/// than the cpu and memory resources are carried over from `current`.
pub fn update_resources(
    node: &DeploymentNode,
    current: &Container,
    desired: &ContainerSpec,
) -> Result<(Container, bool), QuantityError> {
    let observed = ContainerSpec::try_from(current)?;
    let (merged, changed) = reconcile(&observed, desired);

    let mut container = current.clone();
    if changed {
        debug!(
            deployment = %node.name(),
            container = %current.name,
            from = %observed.resources,
            to = %merged.resources,
            "resources changed"
        );
        merged
            .resources
            .write_into(container.resources.get_or_insert_with(Default::default));
    }
    Ok((container, changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use k8s_openapi::{
        api::{
            apps::v1::DeploymentSpec,
            core::v1::{PodSpec, PodTemplateSpec, ResourceRequirements},
        },
        apimachinery::pkg::api::resource::Quantity,
    };
    use kube::core::ObjectMeta;

    use crate::resources::{ResourceDimension, ResourceKind, ResourceRequirements as Wanted, Slot};

    fn resource_list(cpu: &str, memory: &str) -> Option<BTreeMap<String, Quantity>> {
        Some(BTreeMap::from_iter([
            ("cpu".to_owned(), Quantity(cpu.to_owned())),
            ("memory".to_owned(), Quantity(memory.to_owned())),
        ]))
    }

    fn node_container(name: &str) -> Container {
        Container {
            name: name.to_owned(),
            image: Some("elasticsearch:8".to_owned()),
            resources: Some(ResourceRequirements {
                limits: resource_list("600m", "2Gi"),
                requests: resource_list("600m", "2Gi"),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn node(containers: Vec<Container>) -> DeploymentNode {
        DeploymentNode::new(Deployment {
            metadata: ObjectMeta {
                name: Some("test".to_owned()),
                generation: Some(3),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                template: PodTemplateSpec {
                    spec: Some(PodSpec {
                        containers,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn desired(name: &str, entries: &[(Slot, &str)]) -> ContainerSpec {
        let resources = entries.iter().fold(Wanted::new(), |acc, (slot, value)| {
            acc.with(*slot, value.parse().expect("valid quantity"))
        });
        ContainerSpec::new(name, resources)
    }

    #[test]
    fn exposes_name_and_containers() {
        let node = node(vec![node_container("elasticsearch"), node_container("proxy")]);
        assert_eq!(node.name(), "test");
        assert_eq!(node.generation(), Some(3));
        let names: Vec<&str> = node.containers().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["elasticsearch", "proxy"]);
    }

    #[test]
    fn update_resources_unchanged_returns_current() {
        let node = node(vec![node_container("elasticsearch")]);
        let want = desired(
            "elasticsearch",
            &[(Slot::new(ResourceKind::Limit, ResourceDimension::Cpu), "0.6")],
        );
        let (container, changed) =
            update_resources(&node, &node_container("elasticsearch"), &want).expect("valid");
        assert!(!changed);
        assert_eq!(container, node_container("elasticsearch"));
    }

    #[test]
    fn update_resources_keeps_other_fields() {
        let node = node(vec![node_container("elasticsearch")]);
        let want = desired(
            "elasticsearch",
            &[(Slot::new(ResourceKind::Request, ResourceDimension::Memory), "1Gi")],
        );
        let (container, changed) =
            update_resources(&node, &node_container("elasticsearch"), &want).expect("valid");
        assert!(changed);
        assert_eq!(container.image.as_deref(), Some("elasticsearch:8"));
        assert_eq!(
            container.resources,
            Some(ResourceRequirements {
                limits: resource_list("600m", "2Gi"),
                requests: resource_list("600m", "1Gi"),
                ..Default::default()
            })
        );
    }

    #[test]
    fn update_resources_keeps_observed_zero_request() {
        let current = Container {
            name: "elasticsearch".to_owned(),
            resources: Some(ResourceRequirements {
                limits: Some(BTreeMap::from_iter([(
                    "cpu".to_owned(),
                    Quantity("1".to_owned()),
                )])),
                requests: Some(BTreeMap::from_iter([(
                    "cpu".to_owned(),
                    Quantity("0".to_owned()),
                )])),
                ..Default::default()
            }),
            ..Default::default()
        };
        let node = node(vec![current.clone()]);
        let want = desired(
            "elasticsearch",
            &[(Slot::new(ResourceKind::Limit, ResourceDimension::Cpu), "2")],
        );
        let (container, changed) = update_resources(&node, &current, &want).expect("valid");
        assert!(changed);
        assert_eq!(
            container.resources,
            Some(ResourceRequirements {
                limits: Some(BTreeMap::from_iter([(
                    "cpu".to_owned(),
                    Quantity("2".to_owned()),
                )])),
                requests: Some(BTreeMap::from_iter([(
                    "cpu".to_owned(),
                    Quantity("0".to_owned()),
                )])),
                ..Default::default()
            })
        );
    }

    #[test]
    fn update_containers_only_reports_changes() {
        let node = node(vec![node_container("elasticsearch"), node_container("proxy")]);
        let update = node
            .update_containers(&[
                desired(
                    "elasticsearch",
                    &[(Slot::new(ResourceKind::Limit, ResourceDimension::Cpu), "1")],
                ),
                desired("proxy", &[]),
                desired("sidecar", &[]),
            ])
            .expect("valid");
        assert_eq!(update.updated_containers, vec!["elasticsearch".to_owned()]);
        assert_eq!(update.missing_containers, vec!["sidecar".to_owned()]);

        let deployment = update.deployment.expect("deployment should change");
        let updated = DeploymentNode::new(deployment);
        assert_eq!(
            updated.containers()[0]
                .resources
                .as_ref()
                .and_then(|r| r.limits.clone()),
            resource_list("1", "2Gi")
        );
        assert_eq!(updated.containers()[1], node_container("proxy"));
        // The observed deployment is left as it was.
        assert_eq!(node.containers()[0], node_container("elasticsearch"));
    }

    #[test]
    fn update_containers_without_change_has_no_deployment() {
        let node = node(vec![node_container("elasticsearch")]);
        let update = node
            .update_containers(&[desired("elasticsearch", &[])])
            .expect("valid");
        assert_eq!(update, NodeUpdate::default());
    }

    #[test]
    fn update_containers_surfaces_malformed_observed_quantity() {
        let mut broken = node_container("elasticsearch");
        broken.resources = Some(ResourceRequirements {
            limits: Some(BTreeMap::from_iter([(
                "cpu".to_owned(),
                Quantity("fast".to_owned()),
            )])),
            ..Default::default()
        });
        let node = node(vec![broken]);
        assert!(node
            .update_containers(&[desired("elasticsearch", &[])])
            .is_err());
    }

    #[test]
    fn deployment_without_pod_spec_reports_missing() {
        let node = DeploymentNode::new(Deployment::default());
        assert!(node.containers().is_empty());
        let update = node
            .update_containers(&[desired("elasticsearch", &[])])
            .expect("valid");
        assert_eq!(update.missing_containers, vec!["elasticsearch".to_owned()]);
        assert!(update.deployment.is_none());
    }
}
