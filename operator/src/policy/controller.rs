use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use futures::stream::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    api::{Patch, PatchParams, PostParams},
    client::Client,
    runtime::{
        controller::Action,
        reflector::ObjectRef,
        watcher::{self, Config},
        Controller,
    },
    Api, ResourceExt,
};
use tracing::{debug, error, info, warn};

use crate::{
    deployment::DeploymentNode,
    policy::{ResourcePolicy, ResourcePolicyStatus},
    resources::{ContainerSpec, QuantityError},
    utils::Context,
    CONTROLLER_NAME,
};

/// Handle errors during reconciliation.
fn on_error(_policy: Arc<ResourcePolicy>, _error: &Error, _context: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(5))
}

/// Errors produced by the reconcile function.
#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("App error: {source}")]
    App {
        #[from]
        source: anyhow::Error,
    },
    #[error("Kube error: {source}")]
    Kube {
        #[from]
        source: kube::Error,
    },
    #[error("Invalid resources: {source}")]
    Quantity {
        #[from]
        source: QuantityError,
    },
}

/// Start a controller for the ResourcePolicy CRD.
pub async fn run(requeue: Duration) -> anyhow::Result<()> {
    let k_client = Client::try_default().await?;
    let context = Arc::new(Context::new(k_client.clone(), requeue));

    let policies: Api<ResourcePolicy> = Api::all(k_client.clone());
    let deployments: Api<Deployment> = Api::all(k_client.clone());

    let controller = Controller::new(policies, Config::default());
    let store = controller.store();
    controller
        // Deployments are not owned by a policy, map them back to the policies naming them.
        .watches(deployments, watcher::Config::default(), move |deployment| {
            let ns = deployment.namespace();
            let name = deployment.name_any();
            store
                .state()
                .into_iter()
                .filter(move |policy| policy.namespace() == ns && policy.spec.deployment == name)
                .map(|policy| ObjectRef::from_obj(policy.as_ref()))
        })
        .run(reconcile, on_error, context)
        .for_each(|rec_res| async move {
            match rec_res {
                Ok((policy, _)) => {
                    debug!(policy.name, "reconcile success");
                }
                Err(err) => {
                    error!(?err, "reconcile error")
                }
            }
        })
        .await;
    Ok(())
}

/// Perform a reconcile pass for the ResourcePolicy CRD
async fn reconcile(policy: Arc<ResourcePolicy>, cx: Arc<Context>) -> Result<Action, Error> {
    let spec = &policy.spec;
    debug!(?spec, "reconcile");

    let ns = policy
        .namespace()
        .ok_or_else(|| anyhow!("resource policy {} has no namespace", policy.name_any()))?;

    // Reject malformed quantities before touching the cluster.
    let desired = spec
        .containers
        .iter()
        .map(|container| ContainerSpec::try_from(container))
        .collect::<Result<Vec<_>, _>>()?;

    let deployments: Api<Deployment> = Api::namespaced(cx.k_client.clone(), &ns);
    let node = DeploymentNode::new(deployments.get(&spec.deployment).await?);
    let update = node.update_containers(&desired)?;

    if let Some(deployment) = update.deployment {
        info!(
            deployment = %node.name(),
            containers = ?update.updated_containers,
            "updating deployment resources"
        );
        let params = PostParams {
            field_manager: Some(CONTROLLER_NAME.to_owned()),
            ..Default::default()
        };
        deployments
            .replace(&node.name(), &params, &deployment)
            .await?;
    }
    if !update.missing_containers.is_empty() {
        warn!(
            deployment = %node.name(),
            containers = ?update.missing_containers,
            "desired containers missing from deployment"
        );
    }

    let status = ResourcePolicyStatus {
        updated_containers: update.updated_containers,
        missing_containers: update.missing_containers,
        observed_generation: node.generation(),
    };
    let policies: Api<ResourcePolicy> = Api::namespaced(cx.k_client.clone(), &ns);
    let _patched = policies
        .patch_status(
            &policy.name_any(),
            &PatchParams::default(),
            &Patch::Merge(serde_json::json!({ "status": status })),
        )
        .await?;

    Ok(Action::requeue(cx.requeue))
}
