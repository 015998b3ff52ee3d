use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a [`Kingdom`].
///
/// Callers mint these themselves (see `realm_kernel::safe_nanoid!`); the store
/// only requires that they are unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KingdomId(String);

impl KingdomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KingdomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for KingdomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for KingdomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Unique identifier of a player, used by the membership surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collective entity that can own spatial units.
///
/// Immutable once created; the only lifecycle transition is deletion.
/// Name uniqueness is enforced by the store, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kingdom {
    pub id: KingdomId,
    pub name: String,
    pub description: String,
}

impl Kingdom {
    pub fn new(
        id: impl Into<KingdomId>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), name: name.into(), description: description.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kingdom_id_is_serde_transparent() {
        let id = KingdomId::new("k42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"k42\"");
        let back: KingdomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn kingdom_carries_identity_and_description() {
        let kingdom = Kingdom::new("a1", "Northmarch", "Cold and proud");
        assert_eq!(kingdom.id.as_str(), "a1");
        assert_eq!(kingdom.name, "Northmarch");
        assert_eq!(kingdom.description, "Cold and proud");
    }
}
