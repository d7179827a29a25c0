use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a brokerage company tenant, minted by the external directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Identifier of a property listing owned by exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Identifier wrapper for partnership rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartnershipId(pub String);

/// Identifier wrapper for property-share rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShareId(pub String);

/// Lifecycle of a partnership between two companies. Only `Pending` and
/// `Accepted` rows occupy the unordered company pair; terminal rows never
/// transition again and never block a fresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    Pending,
    Accepted,
    Rejected,
    Canceled,
}

impl PartnershipStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PartnershipStatus::Pending => "pending",
            PartnershipStatus::Accepted => "accepted",
            PartnershipStatus::Rejected => "rejected",
            PartnershipStatus::Canceled => "canceled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            PartnershipStatus::Rejected | PartnershipStatus::Canceled
        )
    }
}

/// Lifecycle of a per-property sharing grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    Pending,
    Accepted,
    Rejected,
    Revoked,
}

impl ShareStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ShareStatus::Pending => "pending",
            ShareStatus::Accepted => "accepted",
            ShareStatus::Rejected => "rejected",
            ShareStatus::Revoked => "revoked",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ShareStatus::Rejected | ShareStatus::Revoked)
    }
}

/// Stored partnership row.
///
/// The relation is kept directional even though visibility rights end up
/// symmetric: only `partner_company_id` may answer a pending request, so
/// collapsing the pair to an unordered set would lose the accept/reject
/// authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    pub id: PartnershipId,
    pub requester_company_id: CompanyId,
    pub partner_company_id: CompanyId,
    /// Negotiated default making every future listing of the requester
    /// share-eligible. Advisory only: the registries still require an explicit
    /// share row per property.
    pub share_all_properties: bool,
    pub status: PartnershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partnership {
    /// True while the row still occupies the unordered company pair.
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn involves(&self, company: &CompanyId) -> bool {
        self.requester_company_id == *company || self.partner_company_id == *company
    }

    /// True when the row connects the two companies, in either direction.
    pub fn links(&self, a: &CompanyId, b: &CompanyId) -> bool {
        (self.requester_company_id == *a && self.partner_company_id == *b)
            || (self.requester_company_id == *b && self.partner_company_id == *a)
    }

    /// The other company on the row, from `company`'s point of view.
    pub fn counterpart(&self, company: &CompanyId) -> &CompanyId {
        if self.requester_company_id == *company {
            &self.partner_company_id
        } else {
            &self.requester_company_id
        }
    }
}

/// Stored per-property sharing grant from an owning company to a partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyShare {
    pub id: ShareId,
    pub property_id: PropertyId,
    pub owner_company_id: CompanyId,
    pub partner_company_id: CompanyId,
    /// Cosmetic flag: the partner may pin the shared listing on their site.
    pub is_highlight: bool,
    pub status: ShareStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyShare {
    /// True while the row still occupies the (property, partner) pair.
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Company record as the external directory exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    pub slug: String,
}

/// Availability of a listing in the owning company's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingAvailability {
    Available,
    Reserved,
    Sold,
}

/// Snapshot of a property listing as the external inventory exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: PropertyId,
    pub owner_company_id: CompanyId,
    pub title: String,
    pub is_published: bool,
    pub availability: ListingAvailability,
}

impl ListingRecord {
    /// Publish gating applied by the public-site projection. A share never
    /// overrides this: a shared listing stays invisible while the owner keeps
    /// it unpublished or off the market.
    pub fn publicly_visible(&self) -> bool {
        self.is_published && matches!(self.availability, ListingAvailability::Available)
    }
}

/// Denormalized company fields attached to API views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanySummary {
    pub id: CompanyId,
    pub name: String,
    pub slug: String,
}

/// Partnership row joined with the counterpart company for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PartnershipView {
    pub id: PartnershipId,
    pub status: &'static str,
    pub share_all_properties: bool,
    /// Whether the acting company initiated the request; the invited party is
    /// the only one allowed to answer it.
    pub requested_by_me: bool,
    pub counterpart: CompanySummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Share row joined with the listing and counterpart company. The title is
/// `None` when the listing has since vanished from the property inventory;
/// the share row itself outlives the listing.
#[derive(Debug, Clone, Serialize)]
pub struct ShareView {
    pub id: ShareId,
    pub property_id: PropertyId,
    pub property_title: Option<String>,
    pub status: &'static str,
    pub is_highlight: bool,
    pub sent_by_me: bool,
    pub counterpart: CompanySummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
