//! Cross-tenant partnership and property-sharing registries.
//!
//! Two companies agree to a partnership (request/accept), after which either
//! may offer individual listings to the other (share/accept). Accepted shares
//! feed the visibility projection that a company's public site renders
//! alongside its own inventory. Both registries share the same transition
//! shape: a pending row answered only by the invited party, with terminal
//! states that never transition again.

pub mod directory;
pub mod domain;
pub mod projection;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use directory::{CompanyDirectory, DirectoryError, PropertyDirectory};
pub use domain::{
    CompanyId, CompanyRecord, CompanySummary, ListingAvailability, ListingRecord, Partnership,
    PartnershipId, PartnershipStatus, PartnershipView, PropertyId, PropertyShare, ShareId,
    ShareStatus, ShareView,
};
pub use projection::{ListingSource, VisibilityProjector, VisibleListing};
pub use repository::{PartnershipRepository, RepositoryError, ShareRepository};
pub use router::{
    sharing_router, RequestPartnershipBody, SharePropertyBody, SharingRouterState, COMPANY_HEADER,
};
pub use service::{SharingError, SharingService};
