//! Semantic handling of Kubernetes resource quantities.
use std::fmt;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube_quantity::ParsedQuantity;

/// Errors produced while reading a raw quantity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    /// The quantity has no text.
    #[error("quantity is empty")]
    Empty,
    /// The quantity does not follow the Kubernetes quantity grammar.
    #[error("quantity {quantity:?} is invalid: {reason}")]
    Invalid {
        /// Full quantity text
        quantity: String,
        /// Why the text was rejected
        reason: String,
    },
}

/// An immutable resource amount.
///
/// Equality compares the parsed value, so `2Gi` equals `2147483648`
/// and `600m` equals `0.6`. The text is kept so the amount can be written
/// back exactly as it was specified.
#[derive(Clone)]
pub struct ResourceQuantity {
    raw: Quantity,
    parsed: ParsedQuantity,
}

impl ResourceQuantity {
    /// The quantity as it was written.
    pub fn as_quantity(&self) -> &Quantity {
        &self.raw
    }

    /// Reports if the quantity amounts to zero.
    pub fn is_zero(&self) -> bool {
        is_zero_amount(&self.parsed)
    }
}

/// Reports if two quantities amount to the same value.
pub fn equal(a: &ResourceQuantity, b: &ResourceQuantity) -> bool {
    let mut difference = a.parsed.clone();
    difference -= b.parsed.clone();
    is_zero_amount(&difference)
}

/// Reports if a quantity is absent or zero, both mean "unspecified".
pub fn is_unset(q: Option<&ResourceQuantity>) -> bool {
    q.map_or(true, ResourceQuantity::is_zero)
}

fn is_zero_amount(q: &ParsedQuantity) -> bool {
    q.to_bytes_f64() == Some(0.0)
}

impl PartialEq for ResourceQuantity {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other)
    }
}

impl Eq for ResourceQuantity {}

impl fmt::Debug for ResourceQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.raw.0)
    }
}

impl fmt::Display for ResourceQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw.0)
    }
}

impl From<ResourceQuantity> for Quantity {
    fn from(value: ResourceQuantity) -> Self {
        value.raw
    }
}

impl TryFrom<&Quantity> for ResourceQuantity {
    type Error = QuantityError;

    fn try_from(raw: &Quantity) -> Result<Self, Self::Error> {
        let text = raw.0.as_str();
        if text.is_empty() {
            return Err(QuantityError::Empty);
        }
        let invalid = |reason: String| QuantityError::Invalid {
            quantity: text.to_owned(),
            reason,
        };
        // The API server rejects padded quantities.
        if text.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace".to_owned()));
        }
        let parsed = ParsedQuantity::try_from(text).map_err(|err| invalid(err.to_string()))?;
        Ok(Self {
            raw: raw.clone(),
            parsed,
        })
    }
}

impl TryFrom<Quantity> for ResourceQuantity {
    type Error = QuantityError;

    fn try_from(raw: Quantity) -> Result<Self, Self::Error> {
        Self::try_from(&raw)
    }
}

impl std::str::FromStr for ResourceQuantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(Quantity(s.to_owned()))
    }
}
