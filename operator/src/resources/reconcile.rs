use tracing::debug;

use super::{are_equal, quantity::is_unset, ContainerSpec, ResourceRequirements, Slot};

/// Merge the desired resources of a container into its current resources.
///
/// For each slot an unset desired value (absent or zero) keeps the current value,
/// anything else overrides it. Returns the merged container, carrying the current
/// container's name, and whether it differs from the current container.
pub fn reconcile(current: &ContainerSpec, desired: &ContainerSpec) -> (ContainerSpec, bool) {
    let mut merged = ResourceRequirements::new();
    for slot in Slot::ALL {
        let desired_value = desired.resources.get(slot);
        let effective = if is_unset(desired_value) {
            current.resources.get(slot)
        } else {
            desired_value
        };
        debug!(
            container = %current.name,
            %slot,
            retained = is_unset(desired_value),
            "effective resource"
        );
        merged.set(slot, effective.cloned());
    }

    let changed = !are_equal(&current.resources, &merged);
    (
        ContainerSpec {
            name: current.name.clone(),
            resources: merged,
        },
        changed,
    )
}
