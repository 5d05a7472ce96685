//! # State Catalog
//!
//! Reference data mapping state names to numeric identifiers and metadata:
//! whether a state is manual (administrator-settable) or automatic, whether
//! it is externally visible, which object kinds it applies to, and whether
//! an operator may include it in an administrative block request.
//!
//! The catalog is passed explicitly to every engine operation. For callers
//! that resolve the same names repeatedly within one request, the
//! request-scoped [`CatalogCache`] memoizes lookups and is discarded (or
//! explicitly invalidated) with the request — there are no process-wide
//! mutable statics.

use std::collections::{BTreeMap, HashMap};

use crate::error::RegistryError;
use crate::identity::{ObjectKind, StateId};

/// Name of the administrative blocking state.
pub const SERVER_BLOCKED: &str = "serverBlocked";

const DOMAIN_ONLY: &[ObjectKind] = &[ObjectKind::Domain];
const CONTACT_ONLY: &[ObjectKind] = &[ObjectKind::Contact];
const REGISTRABLE: &[ObjectKind] = &[
    ObjectKind::Domain,
    ObjectKind::Contact,
    ObjectKind::Nsset,
    ObjectKind::Keyset,
];

/// One catalog row: a state name with its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDef {
    /// Numeric catalog key.
    pub id: StateId,
    /// Canonical state name.
    pub name: &'static str,
    /// Administrator-settable. Automatic states are maintained by the
    /// registry itself and are immune to administrative cancelation.
    pub manual: bool,
    /// Visible to external consumers (public info views, notifications).
    pub external: bool,
    /// May be included in an administrative block request.
    pub admin_block: bool,
    /// Object kinds the state applies to.
    pub kinds: &'static [ObjectKind],
}

impl StateDef {
    /// Whether the state applies to objects of `kind`.
    pub fn applies_to(&self, kind: ObjectKind) -> bool {
        self.kinds.contains(&kind)
    }
}

const fn def(
    id: i32,
    name: &'static str,
    manual: bool,
    external: bool,
    admin_block: bool,
    kinds: &'static [ObjectKind],
) -> StateDef {
    StateDef {
        id: StateId::new(id),
        name,
        manual,
        external,
        admin_block,
        kinds,
    }
}

/// The registry's standard state set.
const BUILTIN: &[StateDef] = &[
    def(1, "serverDeleteProhibited", true, true, true, REGISTRABLE),
    def(2, "serverRenewProhibited", true, true, true, DOMAIN_ONLY),
    def(3, "serverTransferProhibited", true, true, true, REGISTRABLE),
    def(4, "serverUpdateProhibited", true, true, true, REGISTRABLE),
    def(5, "serverRegistrantChangeProhibited", true, true, true, DOMAIN_ONLY),
    def(6, "serverOutzoneManual", true, true, true, DOMAIN_ONLY),
    def(7, "serverInzoneManual", true, true, true, DOMAIN_ONLY),
    def(8, SERVER_BLOCKED, true, true, true, REGISTRABLE),
    def(9, "mojeIdVerified", true, true, false, CONTACT_ONLY),
    def(10, "identifiedContact", true, true, false, CONTACT_ONLY),
    def(11, "validatedContact", true, true, false, CONTACT_ONLY),
    def(12, "expired", false, true, false, DOMAIN_ONLY),
    def(13, "outzone", false, true, false, DOMAIN_ONLY),
    def(14, "deleteCandidate", false, true, false, REGISTRABLE),
    def(15, "inManualVerification", false, false, false, CONTACT_ONLY),
];

/// The state catalog: read-only reference data.
#[derive(Debug, Clone)]
pub struct StateCatalog {
    defs: Vec<StateDef>,
}

impl StateCatalog {
    /// The builtin catalog carried by every registry installation.
    pub fn builtin() -> Self {
        Self {
            defs: BUILTIN.to_vec(),
        }
    }

    /// Build a catalog from explicit rows (e.g. loaded from the reference
    /// table of a specific installation).
    pub fn from_defs(defs: Vec<StateDef>) -> Self {
        Self { defs }
    }

    /// Look up a state by name.
    pub fn def(&self, name: &str) -> Option<&StateDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Look up a state by numeric id.
    pub fn def_by_id(&self, id: StateId) -> Option<&StateDef> {
        self.defs.iter().find(|d| d.id == id)
    }

    /// Resolve state names to ids for an object of `kind`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownState`] listing every name that is unknown
    /// or known but not applicable to `kind`.
    pub fn resolve(
        &self,
        names: &[&str],
        kind: ObjectKind,
    ) -> Result<BTreeMap<String, StateId>, RegistryError> {
        let mut resolved = BTreeMap::new();
        let mut unknown = Vec::new();
        for name in names {
            match self.def(name) {
                Some(d) if d.applies_to(kind) => {
                    resolved.insert((*name).to_string(), d.id);
                }
                _ => unknown.push((*name).to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(RegistryError::UnknownState(unknown));
        }
        Ok(resolved)
    }

    /// Whether `name` is a state an operator may include in an
    /// administrative block request.
    pub fn is_administrative_block(&self, name: &str) -> bool {
        self.def(name).is_some_and(|d| d.admin_block)
    }

    /// All manual states applicable to `kind`.
    pub fn manual_states(&self, kind: ObjectKind) -> Vec<&StateDef> {
        self.defs
            .iter()
            .filter(|d| d.manual && d.applies_to(kind))
            .collect()
    }
}

/// Request-scoped read-through cache over a [`StateCatalog`].
///
/// Owned by one request and dropped with it; repeated resolutions of the
/// same `(name, kind)` pair hit the memo instead of the catalog scan.
/// `invalidate` empties the memo for callers that reload the catalog
/// mid-request.
#[derive(Debug)]
pub struct CatalogCache<'c> {
    catalog: &'c StateCatalog,
    resolved: HashMap<(String, ObjectKind), StateId>,
}

impl<'c> CatalogCache<'c> {
    /// Wrap a catalog for the duration of one request.
    pub fn new(catalog: &'c StateCatalog) -> Self {
        Self {
            catalog,
            resolved: HashMap::new(),
        }
    }

    /// Resolve one name for `kind`, memoizing the hit.
    pub fn resolve_id(&mut self, name: &str, kind: ObjectKind) -> Result<StateId, RegistryError> {
        if let Some(id) = self.resolved.get(&(name.to_string(), kind)) {
            return Ok(*id);
        }
        let id = match self.catalog.def(name) {
            Some(d) if d.applies_to(kind) => d.id,
            _ => return Err(RegistryError::UnknownState(vec![name.to_string()])),
        };
        self.resolved.insert((name.to_string(), kind), id);
        Ok(id)
    }

    /// Drop all memoized resolutions.
    pub fn invalidate(&mut self) {
        self.resolved.clear();
    }

    /// The wrapped catalog.
    pub fn catalog(&self) -> &StateCatalog {
        self.catalog
    }
}
