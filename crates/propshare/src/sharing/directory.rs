use super::domain::{CompanyId, CompanyRecord, ListingRecord, PropertyId};

/// Read-only view of the company directory maintained outside this subsystem.
/// Resolves the slugs used on partnership requests and the ids denormalized
/// into API views.
pub trait CompanyDirectory: Send + Sync {
    fn by_slug(&self, slug: &str) -> Result<Option<CompanyRecord>, DirectoryError>;
    fn by_id(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, DirectoryError>;
}

/// Read-only view of the property inventory maintained outside this subsystem.
/// Supplies ownership checks at share time and the publish/availability flags
/// consulted by the visibility projection.
pub trait PropertyDirectory: Send + Sync {
    fn listing(&self, id: &PropertyId) -> Result<Option<ListingRecord>, DirectoryError>;
    fn owned_by(&self, company: &CompanyId) -> Result<Vec<ListingRecord>, DirectoryError>;
}

/// Error enumeration for directory lookups.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
