//! Trait definitions for external interactions
//!
//! These traits define the boundary between domain logic and infrastructure.
//! Implementations live in other crates.

use crate::claim::{ClaimCategory, ClaimId, ClaimPatch, ClaimRecord, NewClaim};

/// Keyed document collection holding claim records
///
/// Implemented by the infrastructure layer (patta-store). Each call is atomic
/// per record; there is no multi-record transaction.
pub trait ClaimStore {
    /// Error type for store operations
    type Error;

    /// Persist a new record and return its assigned identity
    fn insert(&mut self, claim: NewClaim) -> Result<ClaimId, Self::Error>;

    /// Get a record by identity
    fn get(&self, id: ClaimId) -> Result<Option<ClaimRecord>, Self::Error>;

    /// Scan records matching the filter, oldest first
    fn scan(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRecord>, Self::Error>;

    /// Apply a partial update to one record
    ///
    /// Returns `false` when no record has that identity.
    fn update_one(&mut self, id: ClaimId, patch: &ClaimPatch) -> Result<bool, Self::Error>;
}

/// Filter criteria for scanning claims
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    /// Only flagged (`Some(true)`) or unflagged (`Some(false)`) records
    pub anomalous: Option<bool>,

    /// Exact village match
    pub village: Option<String>,

    /// Category match
    pub claim_type: Option<ClaimCategory>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

impl ClaimFilter {
    /// Every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Flagged records only
    pub fn anomalous() -> Self {
        Self {
            anomalous: Some(true),
            ..Default::default()
        }
    }

    /// Cap the number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
