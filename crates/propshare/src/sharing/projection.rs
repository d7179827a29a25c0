use std::sync::Arc;

use serde::Serialize;

use super::directory::{CompanyDirectory, PropertyDirectory};
use super::domain::{CompanyId, CompanySummary, PropertyId, ShareId};
use super::repository::ShareRepository;
use super::service::SharingError;

/// Pure read-model computing the listing feed a company's public site should
/// display: its own inventory plus listings granted through accepted shares.
/// Nothing is persisted or cached; every call recomputes from the current row
/// set, so an accepted or revoked share shows up on the next read.
pub struct VisibilityProjector<S, C, L> {
    shares: Arc<S>,
    companies: Arc<C>,
    listings: Arc<L>,
}

/// Entry in a company's listing feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleListing {
    pub property_id: PropertyId,
    pub title: String,
    pub owner: CompanySummary,
    pub source: ListingSource,
    pub is_highlight: bool,
}

/// How a listing entered the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ListingSource {
    Owned,
    Shared { share_id: ShareId },
}

impl<S, C, L> VisibilityProjector<S, C, L>
where
    S: ShareRepository + 'static,
    C: CompanyDirectory + 'static,
    L: PropertyDirectory + 'static,
{
    pub fn new(shares: Arc<S>, companies: Arc<C>, listings: Arc<L>) -> Self {
        Self {
            shares,
            companies,
            listings,
        }
    }

    /// Computes the feed for `company`. With `public_only` set, every listing
    /// must itself be published and available; a share inherits the owning
    /// listing's gating and never overrides it. Results are ordered by
    /// property id so repeated calls over an unchanged row set are identical.
    pub fn visible_listings(
        &self,
        company: &CompanyId,
        public_only: bool,
    ) -> Result<Vec<VisibleListing>, SharingError> {
        let own_summary = self.company_summary(company)?;

        let mut feed = Vec::new();
        for listing in self.listings.owned_by(company)? {
            if public_only && !listing.publicly_visible() {
                continue;
            }
            feed.push(VisibleListing {
                property_id: listing.id,
                title: listing.title,
                owner: own_summary.clone(),
                source: ListingSource::Owned,
                is_highlight: false,
            });
        }

        for share in self.shares.accepted_for(company)? {
            // A share whose listing vanished from the inventory contributes
            // nothing rather than failing the whole feed.
            let Some(listing) = self.listings.listing(&share.property_id)? else {
                continue;
            };
            if public_only && !listing.publicly_visible() {
                continue;
            }
            let owner = self.company_summary(&share.owner_company_id)?;
            feed.push(VisibleListing {
                property_id: listing.id,
                title: listing.title,
                owner,
                source: ListingSource::Shared {
                    share_id: share.id,
                },
                is_highlight: share.is_highlight,
            });
        }

        feed.sort_by(|a, b| a.property_id.cmp(&b.property_id));
        Ok(feed)
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
