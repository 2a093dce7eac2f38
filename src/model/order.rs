//! An order that can be taken from the remote venue.
//!
//! # Identity
//! Orders are matched against push notifications strictly by [`OrderId`] equality,
//! so the id is the only part of the order the coordinator ever inspects.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use uuid::Uuid;

/// Type-safe identifier for Orders.
///
/// Opaque: compared by equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OrderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// The order being taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
}

impl Order {
    pub fn new(id: OrderId) -> Self {
        Self { id }
    }
}

/// Supplementary details fetched once an order is known to be accepted.
///
/// The venue decides what goes into `fields`; the coordinator never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: OrderId,
    pub fields: BTreeMap<String, String>,
}

impl OrderDetails {
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a single field, builder style.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Final success value of a take operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedOrder {
    pub id: OrderId,
    pub details: OrderDetails,
}
