use chrono::{DateTime, Utc};

use super::domain::{
    CompanyId, Partnership, PartnershipId, PartnershipStatus, PropertyId, PropertyShare, ShareId,
    ShareStatus,
};

/// Storage abstraction for partnership rows.
///
/// Two contracts matter beyond plain CRUD:
///
/// - `insert` must enforce the unordered-pair uniqueness: at most one open
///   (pending or accepted) row per {requester, partner} pair, in either
///   direction, returning `Conflict` otherwise. A SQL implementation would use
///   a partial unique index; the in-memory adapters check under their mutex.
/// - `transition` must apply the check-then-set atomically per row (an
///   `UPDATE .. WHERE status = expected` or a lock-held compare-and-swap), so
///   of two racing transitions exactly one succeeds and the loser observes
///   `StaleStatus`.
pub trait PartnershipRepository: Send + Sync {
    fn insert(&self, row: Partnership) -> Result<Partnership, RepositoryError>;
    fn fetch(&self, id: &PartnershipId) -> Result<Option<Partnership>, RepositoryError>;
    fn transition(
        &self,
        id: &PartnershipId,
        expected: PartnershipStatus,
        next: PartnershipStatus,
        at: DateTime<Utc>,
    ) -> Result<Partnership, RepositoryError>;
    /// All rows involving the company, newest first.
    fn involving(&self, company: &CompanyId) -> Result<Vec<Partnership>, RepositoryError>;
    /// The open row occupying the unordered pair, if any.
    fn open_between(
        &self,
        a: &CompanyId,
        b: &CompanyId,
    ) -> Result<Option<Partnership>, RepositoryError>;
}

/// Storage abstraction for property-share rows. Same contracts as
/// [`PartnershipRepository`]: `insert` enforces at most one open row per
/// (property, partner) pair and `transition` is atomic per row.
pub trait ShareRepository: Send + Sync {
    fn insert(&self, row: PropertyShare) -> Result<PropertyShare, RepositoryError>;
    fn fetch(&self, id: &ShareId) -> Result<Option<PropertyShare>, RepositoryError>;
    fn transition(
        &self,
        id: &ShareId,
        expected: ShareStatus,
        next: ShareStatus,
        at: DateTime<Utc>,
    ) -> Result<PropertyShare, RepositoryError>;
    /// Rows sent by the owning company, newest first.
    fn sent_by(&self, owner: &CompanyId) -> Result<Vec<PropertyShare>, RepositoryError>;
    /// Rows addressed to the partner company, newest first.
    fn received_by(&self, partner: &CompanyId) -> Result<Vec<PropertyShare>, RepositoryError>;
    /// The open row occupying the (property, partner) pair, if any.
    fn open_for(
        &self,
        property: &PropertyId,
        partner: &CompanyId,
    ) -> Result<Option<PropertyShare>, RepositoryError>;
    /// Accepted grants addressed to the company, consumed by the visibility
    /// projection.
    fn accepted_for(&self, partner: &CompanyId) -> Result<Vec<PropertyShare>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("an open row already occupies this pair")]
    Conflict,
    #[error("row not found")]
    NotFound,
    #[error("row status changed concurrently")]
    StaleStatus,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
