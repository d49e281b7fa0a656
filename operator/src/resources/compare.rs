use super::{quantity, ResourceRequirements, Slot};

/// Reports if two requirement sets specify the same amounts.
///
/// Every slot is compared, an absent entry counting as zero on either side, so
/// `{limits.cpu: 0}` equals `{}`.
pub fn are_equal(a: &ResourceRequirements, b: &ResourceRequirements) -> bool {
    Slot::ALL.iter().all(|slot| slot_equal(a, b, *slot))
}

fn slot_equal(a: &ResourceRequirements, b: &ResourceRequirements, slot: Slot) -> bool {
    match (a.get(slot), b.get(slot)) {
        (Some(a), Some(b)) => quantity::equal(a, b),
        (a, b) => quantity::is_unset(a) && quantity::is_unset(b),
    }
}
