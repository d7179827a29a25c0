use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::directory::{CompanyDirectory, DirectoryError, PropertyDirectory};
use super::domain::{
    CompanyId, CompanyRecord, CompanySummary, Partnership, PartnershipId, PartnershipStatus,
    PartnershipView, PropertyId, PropertyShare, ShareId, ShareStatus, ShareView,
};
use super::repository::{PartnershipRepository, RepositoryError, ShareRepository};

/// Service composing the two registries with the external company and property
/// directories. The acting company id is an explicit parameter on every
/// operation; nothing here reads ambient session state.
pub struct SharingService<P, S, C, L> {
    partnerships: Arc<P>,
    shares: Arc<S>,
    companies: Arc<C>,
    listings: Arc<L>,
}

static PARTNERSHIP_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SHARE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_partnership_id() -> PartnershipId {
    let id = PARTNERSHIP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PartnershipId(format!("prt-{id:06}"))
}

fn next_share_id() -> ShareId {
    let id = SHARE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ShareId(format!("shr-{id:06}"))
}

impl<P, S, C, L> SharingService<P, S, C, L>
where
    P: PartnershipRepository + 'static,
    S: ShareRepository + 'static,
    C: CompanyDirectory + 'static,
    L: PropertyDirectory + 'static,
{
    pub fn new(
        partnerships: Arc<P>,
        shares: Arc<S>,
        companies: Arc<C>,
        listings: Arc<L>,
    ) -> Self {
        Self {
            partnerships,
            shares,
            companies,
            listings,
        }
    }

    /// Open a partnership request towards the company behind `partner_slug`.
    pub fn request_partnership(
        &self,
        acting: &CompanyId,
        partner_slug: &str,
        share_all_properties: bool,
    ) -> Result<Partnership, SharingError> {
        let partner = self
            .companies
            .by_slug(partner_slug)?
            .ok_or(SharingError::NotFound)?;
        if partner.id == *acting {
            return Err(SharingError::SelfReference);
        }
        if self
            .partnerships
            .open_between(acting, &partner.id)?
            .is_some()
        {
            return Err(SharingError::Conflict);
        }

        let now = Utc::now();
        let row = Partnership {
            id: next_partnership_id(),
            requester_company_id: acting.clone(),
            partner_company_id: partner.id,
            share_all_properties,
            status: PartnershipStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        // The insert is the authoritative pair-uniqueness check; the lookup
        // above only produces a friendlier early Conflict.
        let stored = match self.partnerships.insert(row) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(SharingError::Conflict),
            Err(other) => return Err(other.into()),
        };
        info!(partnership = %stored.id.0, partner = partner_slug, "partnership requested");
        Ok(stored)
    }

    /// Accept a pending request. Only the invited partner may answer.
    pub fn accept_partnership(
        &self,
        id: &PartnershipId,
        acting: &CompanyId,
    ) -> Result<Partnership, SharingError> {
        let row = self.fetch_partnership(id)?;
        if row.partner_company_id != *acting {
            return Err(SharingError::Forbidden);
        }
        self.transition_partnership(id, PartnershipStatus::Pending, PartnershipStatus::Accepted)
    }

    /// Reject a pending request. Only the invited partner may answer.
    pub fn reject_partnership(
        &self,
        id: &PartnershipId,
        acting: &CompanyId,
    ) -> Result<Partnership, SharingError> {
        let row = self.fetch_partnership(id)?;
        if row.partner_company_id != *acting {
            return Err(SharingError::Forbidden);
        }
        self.transition_partnership(id, PartnershipStatus::Pending, PartnershipStatus::Rejected)
    }

    /// Cancel an accepted partnership. Either party may do this. Shares
    /// already accepted under the partnership are left untouched; the owner
    /// revokes them individually if desired.
    pub fn cancel_partnership(
        &self,
        id: &PartnershipId,
        acting: &CompanyId,
    ) -> Result<Partnership, SharingError> {
        let row = self.fetch_partnership(id)?;
        if !row.involves(acting) {
            return Err(SharingError::Forbidden);
        }
        self.transition_partnership(id, PartnershipStatus::Accepted, PartnershipStatus::Canceled)
    }

    /// All partnerships involving the acting company, newest first.
    pub fn partnerships_for(
        &self,
        acting: &CompanyId,
    ) -> Result<Vec<PartnershipView>, SharingError> {
        let rows = self.partnerships.involving(acting)?;
        rows.into_iter()
            .map(|row| self.partnership_view(&row, acting))
            .collect()
    }

    /// Requests awaiting the acting company's answer.
    pub fn pending_partnerships(
        &self,
        acting: &CompanyId,
    ) -> Result<Vec<PartnershipView>, SharingError> {
        let rows = self.partnerships.involving(acting)?;
        rows.into_iter()
            .filter(|row| {
                row.status == PartnershipStatus::Pending && row.partner_company_id == *acting
            })
            .map(|row| self.partnership_view(&row, acting))
            .collect()
    }

    /// Accepted partnerships involving the acting company.
    pub fn accepted_partnerships(
        &self,
        acting: &CompanyId,
    ) -> Result<Vec<PartnershipView>, SharingError> {
        let rows = self.partnerships.involving(acting)?;
        rows.into_iter()
            .filter(|row| row.status == PartnershipStatus::Accepted)
            .map(|row| self.partnership_view(&row, acting))
            .collect()
    }

    /// Offer one of the acting company's listings to a partner. Requires an
    /// accepted partnership; a pending or terminal one does not qualify.
    pub fn share_property(
        &self,
        acting: &CompanyId,
        property_id: &PropertyId,
        partner_company_id: &CompanyId,
        is_highlight: bool,
    ) -> Result<PropertyShare, SharingError> {
        let listing = self
            .listings
            .listing(property_id)?
            .ok_or(SharingError::NotFound)?;
        if listing.owner_company_id != *acting {
            return Err(SharingError::Forbidden);
        }
        match self.partnerships.open_between(acting, partner_company_id)? {
            Some(partnership) if partnership.status == PartnershipStatus::Accepted => {}
            _ => return Err(SharingError::PartnershipRequired),
        }
        if self
            .shares
            .open_for(property_id, partner_company_id)?
            .is_some()
        {
            return Err(SharingError::Conflict);
        }

        let now = Utc::now();
        let row = PropertyShare {
            id: next_share_id(),
            property_id: property_id.clone(),
            owner_company_id: acting.clone(),
            partner_company_id: partner_company_id.clone(),
            is_highlight,
            status: ShareStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let stored = match self.shares.insert(row) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(SharingError::Conflict),
            Err(other) => return Err(other.into()),
        };
        info!(
            share = %stored.id.0,
            property = %stored.property_id.0,
            partner = %stored.partner_company_id.0,
            "property share offered"
        );
        Ok(stored)
    }

    /// Accept a pending share. Only the receiving partner may answer. The
    /// listing joins the partner's visibility projection on the next read.
    pub fn accept_share(
        &self,
        id: &ShareId,
        acting: &CompanyId,
    ) -> Result<PropertyShare, SharingError> {
        let row = self.fetch_share(id)?;
        if row.partner_company_id != *acting {
            return Err(SharingError::Forbidden);
        }
        self.transition_share(id, ShareStatus::Pending, ShareStatus::Accepted)
    }

    /// Reject a pending share. Only the receiving partner may answer.
    pub fn reject_share(
        &self,
        id: &ShareId,
        acting: &CompanyId,
    ) -> Result<PropertyShare, SharingError> {
        let row = self.fetch_share(id)?;
        if row.partner_company_id != *acting {
            return Err(SharingError::Forbidden);
        }
        self.transition_share(id, ShareStatus::Pending, ShareStatus::Rejected)
    }

    /// Withdraw an accepted share. Only the owning company may do this; the
    /// listing leaves the partner's projection immediately.
    pub fn revoke_share(
        &self,
        id: &ShareId,
        acting: &CompanyId,
    ) -> Result<PropertyShare, SharingError> {
        let row = self.fetch_share(id)?;
        if row.owner_company_id != *acting {
            return Err(SharingError::Forbidden);
        }
        self.transition_share(id, ShareStatus::Accepted, ShareStatus::Revoked)
    }

    /// Shares the acting company has offered, newest first.
    pub fn shares_sent(&self, acting: &CompanyId) -> Result<Vec<ShareView>, SharingError> {
        let rows = self.shares.sent_by(acting)?;
        rows.into_iter()
            .map(|row| self.share_view(&row, acting))
            .collect()
    }

    /// Shares addressed to the acting company, newest first.
    pub fn shares_received(&self, acting: &CompanyId) -> Result<Vec<ShareView>, SharingError> {
        let rows = self.shares.received_by(acting)?;
        rows.into_iter()
            .map(|row| self.share_view(&row, acting))
            .collect()
    }

    /// Shares still awaiting the acting company's answer.
    pub fn pending_shares(&self, acting: &CompanyId) -> Result<Vec<ShareView>, SharingError> {
        let rows = self.shares.received_by(acting)?;
        rows.into_iter()
            .filter(|row| row.status == ShareStatus::Pending)
            .map(|row| self.share_view(&row, acting))
            .collect()
    }

    /// Slug resolution for the public-site feed route.
    pub fn company_by_slug(&self, slug: &str) -> Result<CompanyRecord, SharingError> {
        self.companies.by_slug(slug)?.ok_or(SharingError::NotFound)
    }

    /// Denormalized view of a partnership row from the acting company's side.
    pub fn partnership_view(
        &self,
        row: &Partnership,
        acting: &CompanyId,
    ) -> Result<PartnershipView, SharingError> {
        let counterpart = self.company_summary(row.counterpart(acting))?;
        Ok(PartnershipView {
            id: row.id.clone(),
            status: row.status.label(),
            share_all_properties: row.share_all_properties,
            requested_by_me: row.requester_company_id == *acting,
            counterpart,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Denormalized view of a share row from the acting company's side. A
    /// listing that has vanished from the inventory yields a title of `None`
    /// instead of failing the read; the projection applies the same tolerance.
    pub fn share_view(
        &self,
        row: &PropertyShare,
        acting: &CompanyId,
    ) -> Result<ShareView, SharingError> {
        let sent_by_me = row.owner_company_id == *acting;
        let counterpart_id = if sent_by_me {
            &row.partner_company_id
        } else {
            &row.owner_company_id
        };
        let counterpart = self.company_summary(counterpart_id)?;
        let listing = self.listings.listing(&row.property_id)?;
        Ok(ShareView {
            id: row.id.clone(),
            property_id: row.property_id.clone(),
            property_title: listing.map(|listing| listing.title),
            status: row.status.label(),
            is_highlight: row.is_highlight,
            sent_by_me,
            counterpart,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn fetch_partnership(&self, id: &PartnershipId) -> Result<Partnership, SharingError> {
        self.partnerships.fetch(id)?.ok_or(SharingError::NotFound)
    }

    fn fetch_share(&self, id: &ShareId) -> Result<PropertyShare, SharingError> {
        self.shares.fetch(id)?.ok_or(SharingError::NotFound)
    }

    fn transition_partnership(
        &self,
        id: &PartnershipId,
        expected: PartnershipStatus,
        next: PartnershipStatus,
    ) -> Result<Partnership, SharingError> {
        match self.partnerships.transition(id, expected, next, Utc::now()) {
            Ok(row) => {
                info!(partnership = %row.id.0, status = row.status.label(), "partnership transitioned");
                Ok(row)
            }
            Err(RepositoryError::NotFound) => Err(SharingError::NotFound),
            // Wrong current status, or a concurrent transition won the row.
            Err(RepositoryError::StaleStatus) => Err(SharingError::InvalidState),
            Err(other) => Err(other.into()),
        }
    }

    fn transition_share(
        &self,
        id: &ShareId,
        expected: ShareStatus,
        next: ShareStatus,
    ) -> Result<PropertyShare, SharingError> {
        match self.shares.transition(id, expected, next, Utc::now()) {
            Ok(row) => {
                info!(share = %row.id.0, status = row.status.label(), "share transitioned");
                Ok(row)
            }
            Err(RepositoryError::NotFound) => Err(SharingError::NotFound),
            Err(RepositoryError::StaleStatus) => Err(SharingError::InvalidState),
            Err(other) => Err(other.into()),
        }
    }

    fn company_summary(&self, id: &CompanyId) -> Result<CompanySummary, SharingError> {
        let record = self.companies.by_id(id)?.ok_or(SharingError::NotFound)?;
        Ok(CompanySummary {
            id: record.id,
            name: record.name,
            slug: record.slug,
        })
    }
}

/// Error taxonomy for the partnership and sharing registries. All variants are
/// synchronous outcomes of user-initiated transitions; none warrant a retry.
#[derive(Debug, thiserror::Error)]
pub enum SharingError {
    #[error("company or property not found")]
    NotFound,
    #[error("acting company has no authority over this row")]
    Forbidden,
    #[error("a company cannot partner with itself")]
    SelfReference,
    #[error("an open row already exists for this pair")]
    Conflict,
    #[error("an accepted partnership is required before sharing")]
    PartnershipRequired,
    #[error("transition not permitted from the current status")]
    InvalidState,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
