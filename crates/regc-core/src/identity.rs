//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the registry
//! engine. Each identifier is a distinct type — you cannot pass an
//! [`ObjectId`] where a [`HistoryId`] is expected.
//!
//! UUID-based identifiers ([`ObjectId`], [`HistoryId`], [`RequestId`]) are
//! always valid by construction. [`StateId`] is the numeric key of a state
//! catalog row and carries no validation of its own — only the catalog can
//! say whether a given id is known.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

/// A unique identifier for a registrable object (domain, contact,
/// nameserver set, key set, registrar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new random object identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an object identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ObjectId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

/// A unique identifier for one record in an object's history chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HistoryId(Uuid);

impl HistoryId {
    /// Create a new random history record identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a history identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HistoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for HistoryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for HistoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for HistoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

/// A unique identifier for one state request — one row in the state
/// interval store. Returned by interval creation and cancelation so audit
/// and notification consumers can reference the exact fact that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new random request identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a request identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Numeric identifiers
// ---------------------------------------------------------------------------

/// The numeric key of a state catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(i32);

impl StateId {
    /// Wrap a raw catalog row id.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw numeric value.
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Object kinds
// ---------------------------------------------------------------------------

/// The type of a registrable object.
///
/// State applicability is declared per kind in the catalog — e.g.
/// `serverRenewProhibited` only makes sense for domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A registered domain name.
    Domain,
    /// A contact (registrant, admin, or technical).
    Contact,
    /// A named set of nameservers.
    Nsset,
    /// A named set of DNSSEC keys.
    Keyset,
    /// A registrar account.
    Registrar,
}

impl ObjectKind {
    /// Canonical lowercase name, as stored in the object directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Contact => "contact",
            Self::Nsset => "nsset",
            Self::Keyset => "keyset",
            Self::Registrar => "registrar",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(Self::Domain),
            "contact" => Ok(Self::Contact),
            "nsset" => Ok(Self::Nsset),
            "keyset" => Ok(Self::Keyset),
            "registrar" => Ok(Self::Registrar),
            other => Err(format!("unknown object kind: {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_are_distinct() {
        assert_ne!(ObjectId::new(), ObjectId::new());
    }

    #[test]
    fn object_id_display_roundtrip() {
        let id = ObjectId::new();
        let parsed: ObjectId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn history_id_display_roundtrip() {
        let id = HistoryId::new();
        let parsed: HistoryId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn state_id_value() {
        assert_eq!(StateId::new(8).value(), 8);
    }

    #[test]
    fn object_kind_str_roundtrip() {
        for kind in [
            ObjectKind::Domain,
            ObjectKind::Contact,
            ObjectKind::Nsset,
            ObjectKind::Keyset,
            ObjectKind::Registrar,
        ] {
            let parsed: ObjectKind = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn object_kind_rejects_unknown() {
        assert!("zone".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn object_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&ObjectKind::Nsset).unwrap();
        assert_eq!(json, "\"nsset\"");
    }

    #[test]
    fn request_id_serde_roundtrip() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
