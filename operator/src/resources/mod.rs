//! Resource requirements of a container and the logic to reconcile them.
//!
//! Everything in this module is a pure function over values. Raw quantities are read
//! into [`ResourceQuantity`] values when converting from the k8s types, so malformed
//! input is rejected before any comparison or merge happens.
use std::{collections::BTreeMap, fmt};

use k8s_openapi::api::core::v1::{Container, ResourceRequirements as K8sResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

mod compare;
mod quantity;
mod reconcile;

pub use compare::are_equal;
pub use quantity::{equal, is_unset, QuantityError, ResourceQuantity};
pub use reconcile::reconcile;

/// Resource dimensions managed by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceDimension {
    /// Processor time
    Cpu,
    /// Memory in bytes
    Memory,
}

impl ResourceDimension {
    /// All dimensions in a stable order.
    pub const ALL: [ResourceDimension; 2] = [ResourceDimension::Cpu, ResourceDimension::Memory];

    /// Key of the dimension in a k8s resource list.
    pub fn key(&self) -> &'static str {
        match self {
            ResourceDimension::Cpu => "cpu",
            ResourceDimension::Memory => "memory",
        }
    }
}

/// Whether an amount is an upper bound or a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    /// Maximum amount the container may consume
    Limit,
    /// Amount reserved for the container
    Request,
}

impl ResourceKind {
    /// All kinds in a stable order.
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Limit, ResourceKind::Request];
}

/// A single (kind, dimension) entry of a [`ResourceRequirements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    /// Limit or request
    pub kind: ResourceKind,
    /// Cpu or memory
    pub dimension: ResourceDimension,
}

impl Slot {
    /// Every slot, limits first.
    pub const ALL: [Slot; 4] = [
        Slot::new(ResourceKind::Limit, ResourceDimension::Cpu),
        Slot::new(ResourceKind::Limit, ResourceDimension::Memory),
        Slot::new(ResourceKind::Request, ResourceDimension::Cpu),
        Slot::new(ResourceKind::Request, ResourceDimension::Memory),
    ];

    /// Construct a slot
    pub const fn new(kind: ResourceKind, dimension: ResourceDimension) -> Self {
        Self { kind, dimension }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ResourceKind::Limit => "limits",
            ResourceKind::Request => "requests",
        };
        write!(f, "{kind}.{}", self.dimension.key())
    }
}

/// Limits and requests over cpu and memory.
///
/// A missing entry and an entry holding a zero quantity are equivalent, both mean the
/// slot is unspecified. Equality follows that rule, see [`are_equal`].
#[derive(Clone, Default)]
pub struct ResourceRequirements {
    slots: BTreeMap<Slot, ResourceQuantity>,
}

impl ResourceRequirements {
    /// Requirements with every slot unspecified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a slot, if present.
    pub fn get(&self, slot: Slot) -> Option<&ResourceQuantity> {
        self.slots.get(&slot)
    }

    /// Set or clear the value of a slot.
    pub fn set(&mut self, slot: Slot, value: Option<ResourceQuantity>) {
        match value {
            Some(value) => self.slots.insert(slot, value),
            None => self.slots.remove(&slot),
        };
    }

    /// Builder form of [`ResourceRequirements::set`].
    pub fn with(mut self, slot: Slot, value: ResourceQuantity) -> Self {
        self.set(slot, Some(value));
        self
    }

    /// Write the cpu and memory entries into k8s requirements.
    ///
    /// Keys for other resources and any claims are left untouched. Slots without a value
    /// remove their key, and a resource list left empty is removed.
    pub fn write_into(&self, target: &mut K8sResourceRequirements) {
        for kind in ResourceKind::ALL {
            let list = match kind {
                ResourceKind::Limit => &mut target.limits,
                ResourceKind::Request => &mut target.requests,
            };
            let mut entries = list.take().unwrap_or_default();
            for dimension in ResourceDimension::ALL {
                let key = dimension.key().to_owned();
                match self.get(Slot::new(kind, dimension)) {
                    Some(value) => {
                        entries.insert(key, value.as_quantity().clone());
                    }
                    None => {
                        entries.remove(&key);
                    }
                }
            }
            if !entries.is_empty() {
                *list = Some(entries);
            }
        }
    }
}

impl PartialEq for ResourceRequirements {
    fn eq(&self, other: &Self) -> bool {
        are_equal(self, other)
    }
}

impl fmt::Debug for ResourceRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(slot, value)| (slot.to_string(), value)))
            .finish()
    }
}

impl fmt::Display for ResourceRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for slot in Slot::ALL {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match self.get(slot) {
                Some(value) => write!(f, "{slot}={value}")?,
                None => write!(f, "{slot}=-")?,
            }
        }
        Ok(())
    }
}

fn read_list(
    requirements: &mut ResourceRequirements,
    kind: ResourceKind,
    list: Option<&BTreeMap<String, Quantity>>,
) -> Result<(), QuantityError> {
    let Some(list) = list else {
        return Ok(());
    };
    for dimension in ResourceDimension::ALL {
        if let Some(raw) = list.get(dimension.key()) {
            requirements.set(
                Slot::new(kind, dimension),
                Some(ResourceQuantity::try_from(raw)?),
            );
        }
    }
    Ok(())
}

impl TryFrom<&K8sResourceRequirements> for ResourceRequirements {
    type Error = QuantityError;

    fn try_from(value: &K8sResourceRequirements) -> Result<Self, Self::Error> {
        let mut requirements = Self::new();
        read_list(&mut requirements, ResourceKind::Limit, value.limits.as_ref())?;
        read_list(
            &mut requirements,
            ResourceKind::Request,
            value.requests.as_ref(),
        )?;
        Ok(requirements)
    }
}

/// A container name with its resource requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    /// Container name
    pub name: String,
    /// Resource requirements of the container
    pub resources: ResourceRequirements,
}

impl ContainerSpec {
    /// Construct a container spec
    pub fn new(name: impl Into<String>, resources: ResourceRequirements) -> Self {
        Self {
            name: name.into(),
            resources,
        }
    }
}

impl TryFrom<&Container> for ContainerSpec {
    type Error = QuantityError;

    fn try_from(value: &Container) -> Result<Self, Self::Error> {
        let resources = match &value.resources {
            Some(resources) => ResourceRequirements::try_from(resources)?,
            None => ResourceRequirements::new(),
        };
        Ok(Self::new(value.name.clone(), resources))
    }
}
