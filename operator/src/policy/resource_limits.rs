use crate::policy::{ContainerResourcesSpec, ResourceLimitsSpec};
use crate::resources::{
    ContainerSpec, QuantityError, ResourceDimension, ResourceKind, ResourceQuantity,
    ResourceRequirements, Slot,
};

impl ResourceLimitsSpec {
    fn read_into(
        &self,
        kind: ResourceKind,
        requirements: &mut ResourceRequirements,
    ) -> Result<(), QuantityError> {
        for (dimension, value) in [
            (ResourceDimension::Cpu, &self.cpu),
            (ResourceDimension::Memory, &self.memory),
        ] {
            if let Some(value) = value {
                requirements.set(
                    Slot::new(kind, dimension),
                    Some(ResourceQuantity::try_from(value)?),
                );
            }
        }
        Ok(())
    }
}

impl TryFrom<&ContainerResourcesSpec> for ContainerSpec {
    type Error = QuantityError;

    fn try_from(spec: &ContainerResourcesSpec) -> Result<Self, Self::Error> {
        let mut resources = ResourceRequirements::new();
        if let Some(limits) = &spec.limits {
            limits.read_into(ResourceKind::Limit, &mut resources)?;
        }
        if let Some(requests) = &spec.requests {
            requests.read_into(ResourceKind::Request, &mut resources)?;
        }
        Ok(ContainerSpec::new(spec.name.clone(), resources))
    }
}
