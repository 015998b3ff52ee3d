use crate::kingdom::KingdomId;
use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity of a discrete land unit: world plus integer grid coordinates.
///
/// A given key maps to at most one owning kingdom at any time; that invariant
/// lives in the store's unique index, this type only carries the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialKey {
    pub world: String,
    pub x: i64,
    pub z: i64,
}

impl SpatialKey {
    pub fn new(world: impl Into<String>, x: i64, z: i64) -> Self {
        Self { world: world.into(), x, z }
    }
}

impl fmt::Display for SpatialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.world, self.x, self.z)
    }
}

/// Ownership of one spatial unit by one kingdom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandHolding {
    pub owner: KingdomId,
    pub key: SpatialKey,
}

impl LandHolding {
    pub fn new(owner: impl Into<KingdomId>, key: SpatialKey) -> Self {
        Self { owner: owner.into(), key }
    }
}

/// The complete, order-independent holding set of one kingdom.
pub type HoldingSet = FxHashSet<LandHolding>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spatial_key_display() {
        let key = SpatialKey::new("overworld", -3, 17);
        assert_eq!(key.to_string(), "overworld:-3:17");
    }

    #[test]
    fn holding_set_deduplicates_by_identity() {
        let mut set = HoldingSet::default();
        set.insert(LandHolding::new("k1", SpatialKey::new("overworld", 1, 1)));
        set.insert(LandHolding::new("k1", SpatialKey::new("overworld", 1, 1)));
        set.insert(LandHolding::new("k1", SpatialKey::new("overworld", 1, 2)));
        assert_eq!(set.len(), 2);
    }
}
