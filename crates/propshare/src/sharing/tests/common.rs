use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::sharing::directory::{CompanyDirectory, DirectoryError, PropertyDirectory};
use crate::sharing::domain::{
    CompanyId, CompanyRecord, ListingAvailability, ListingRecord, Partnership, PartnershipId,
    PartnershipStatus, PropertyId, PropertyShare, ShareId, ShareStatus,
};
use crate::sharing::projection::VisibilityProjector;
use crate::sharing::repository::{PartnershipRepository, RepositoryError, ShareRepository};
use crate::sharing::router::{sharing_router, SharingRouterState};
use crate::sharing::service::SharingService;

pub(super) const ALPHA: &str = "co-alpha";
pub(super) const BRAVO: &str = "co-bravo";
pub(super) const CEDAR: &str = "co-cedar";

pub(super) const ALPHA_SLUG: &str = "alpha-realty";
pub(super) const BRAVO_SLUG: &str = "bravo-brokers";
pub(super) const CEDAR_SLUG: &str = "cedar-estates";

pub(super) fn cid(id: &str) -> CompanyId {
    CompanyId(id.to_string())
}

pub(super) fn pid(id: &str) -> PropertyId {
    PropertyId(id.to_string())
}

pub(super) fn company_record(id: &str, name: &str, slug: &str) -> CompanyRecord {
    CompanyRecord {
        id: cid(id),
        name: name.to_string(),
        slug: slug.to_string(),
    }
}

pub(super) fn listing_record(
    id: &str,
    owner: &str,
    title: &str,
    is_published: bool,
    availability: ListingAvailability,
) -> ListingRecord {
    ListingRecord {
        id: pid(id),
        owner_company_id: cid(owner),
        title: title.to_string(),
        is_published,
        availability,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPartnershipRepository {
    rows: Arc<Mutex<Vec<Partnership>>>,
}

impl PartnershipRepository for MemoryPartnershipRepository {
    fn insert(&self, row: Partnership) -> Result<Partnership, RepositoryError> {
        let mut rows = self.rows.lock().expect("partnership mutex poisoned");
        let occupied = rows
            .iter()
            .any(|existing| existing.is_open() && existing.links(&row.requester_company_id, &row.partner_company_id));
        if occupied {
            return Err(RepositoryError::Conflict);
        }
        rows.push(row.clone());
        Ok(row)
    }

    fn fetch(&self, id: &PartnershipId) -> Result<Option<Partnership>, RepositoryError> {
        let rows = self.rows.lock().expect("partnership mutex poisoned");
        Ok(rows.iter().find(|row| row.id == *id).cloned())
    }

    fn transition(
        &self,
        id: &PartnershipId,
        expected: PartnershipStatus,
        next: PartnershipStatus,
        at: DateTime<Utc>,
    ) -> Result<Partnership, RepositoryError> {
        let mut rows = self.rows.lock().expect("partnership mutex poisoned");
        let Some(row) = rows.iter_mut().find(|row| row.id == *id) else {
            return Err(RepositoryError::NotFound);
        };
        if row.status != expected {
            return Err(RepositoryError::StaleStatus);
        }
        row.status = next;
        row.updated_at = at;
        Ok(row.clone())
    }

    fn involving(&self, company: &CompanyId) -> Result<Vec<Partnership>, RepositoryError> {
        let rows = self.rows.lock().expect("partnership mutex poisoned");
        let mut matched: Vec<Partnership> = rows
            .iter()
            .filter(|row| row.involves(company))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matched)
    }

    fn open_between(
        &self,
        a: &CompanyId,
        b: &CompanyId,
    ) -> Result<Option<Partnership>, RepositoryError> {
        let rows = self.rows.lock().expect("partnership mutex poisoned");
        Ok(rows
            .iter()
            .find(|row| row.is_open() && row.links(a, b))
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryShareRepository {
    rows: Arc<Mutex<Vec<PropertyShare>>>,
}

impl ShareRepository for MemoryShareRepository {
    fn insert(&self, row: PropertyShare) -> Result<PropertyShare, RepositoryError> {
        let mut rows = self.rows.lock().expect("share mutex poisoned");
        let occupied = rows.iter().any(|existing| {
            existing.is_open()
                && existing.property_id == row.property_id
                && existing.partner_company_id == row.partner_company_id
        });
        if occupied {
            return Err(RepositoryError::Conflict);
        }
        rows.push(row.clone());
        Ok(row)
    }

    fn fetch(&self, id: &ShareId) -> Result<Option<PropertyShare>, RepositoryError> {
        let rows = self.rows.lock().expect("share mutex poisoned");
        Ok(rows.iter().find(|row| row.id == *id).cloned())
    }

    fn transition(
        &self,
        id: &ShareId,
        expected: ShareStatus,
        next: ShareStatus,
        at: DateTime<Utc>,
    ) -> Result<PropertyShare, RepositoryError> {
        let mut rows = self.rows.lock().expect("share mutex poisoned");
        let Some(row) = rows.iter_mut().find(|row| row.id == *id) else {
            return Err(RepositoryError::NotFound);
        };
        if row.status != expected {
            return Err(RepositoryError::StaleStatus);
        }
        row.status = next;
        row.updated_at = at;
        Ok(row.clone())
    }

    fn sent_by(&self, owner: &CompanyId) -> Result<Vec<PropertyShare>, RepositoryError> {
        let rows = self.rows.lock().expect("share mutex poisoned");
        let mut matched: Vec<PropertyShare> = rows
            .iter()
            .filter(|row| row.owner_company_id == *owner)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matched)
    }

    fn received_by(&self, partner: &CompanyId) -> Result<Vec<PropertyShare>, RepositoryError> {
        let rows = self.rows.lock().expect("share mutex poisoned");
        let mut matched: Vec<PropertyShare> = rows
            .iter()
            .filter(|row| row.partner_company_id == *partner)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matched)
    }

    fn open_for(
        &self,
        property: &PropertyId,
        partner: &CompanyId,
    ) -> Result<Option<PropertyShare>, RepositoryError> {
        let rows = self.rows.lock().expect("share mutex poisoned");
        Ok(rows
            .iter()
            .find(|row| {
                row.is_open() && row.property_id == *property && row.partner_company_id == *partner
            })
            .cloned())
    }

    fn accepted_for(&self, partner: &CompanyId) -> Result<Vec<PropertyShare>, RepositoryError> {
        let rows = self.rows.lock().expect("share mutex poisoned");
        Ok(rows
            .iter()
            .filter(|row| {
                row.status == ShareStatus::Accepted && row.partner_company_id == *partner
            })
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryCompanyDirectory {
    companies: Arc<Mutex<Vec<CompanyRecord>>>,
}

impl MemoryCompanyDirectory {
    pub(super) fn insert(&self, record: CompanyRecord) {
        self.companies
            .lock()
            .expect("company mutex poisoned")
            .push(record);
    }
}

impl CompanyDirectory for MemoryCompanyDirectory {
    fn by_slug(&self, slug: &str) -> Result<Option<CompanyRecord>, DirectoryError> {
        let companies = self.companies.lock().expect("company mutex poisoned");
        Ok(companies.iter().find(|record| record.slug == slug).cloned())
    }

    fn by_id(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, DirectoryError> {
        let companies = self.companies.lock().expect("company mutex poisoned");
        Ok(companies.iter().find(|record| record.id == *id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPropertyDirectory {
    listings: Arc<Mutex<Vec<ListingRecord>>>,
}

impl MemoryPropertyDirectory {
    pub(super) fn insert(&self, record: ListingRecord) {
        self.listings
            .lock()
            .expect("listing mutex poisoned")
            .push(record);
    }

    pub(super) fn set_published(&self, id: &PropertyId, published: bool) {
        let mut listings = self.listings.lock().expect("listing mutex poisoned");
        if let Some(record) = listings.iter_mut().find(|record| record.id == *id) {
            record.is_published = published;
        }
    }

    pub(super) fn remove(&self, id: &PropertyId) {
        let mut listings = self.listings.lock().expect("listing mutex poisoned");
        listings.retain(|record| record.id != *id);
    }
}

impl PropertyDirectory for MemoryPropertyDirectory {
    fn listing(&self, id: &PropertyId) -> Result<Option<ListingRecord>, DirectoryError> {
        let listings = self.listings.lock().expect("listing mutex poisoned");
        Ok(listings.iter().find(|record| record.id == *id).cloned())
    }

    fn owned_by(&self, company: &CompanyId) -> Result<Vec<ListingRecord>, DirectoryError> {
        let listings = self.listings.lock().expect("listing mutex poisoned");
        Ok(listings
            .iter()
            .filter(|record| record.owner_company_id == *company)
            .cloned()
            .collect())
    }
}

/// Directory that always fails, for internal-error paths.
pub(super) struct UnavailableCompanyDirectory;

impl CompanyDirectory for UnavailableCompanyDirectory {
    fn by_slug(&self, _slug: &str) -> Result<Option<CompanyRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }

    fn by_id(&self, _id: &CompanyId) -> Result<Option<CompanyRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }
}

pub(super) type MemoryService = SharingService<
    MemoryPartnershipRepository,
    MemoryShareRepository,
    MemoryCompanyDirectory,
    MemoryPropertyDirectory,
>;

pub(super) type MemoryProjector =
    VisibilityProjector<MemoryShareRepository, MemoryCompanyDirectory, MemoryPropertyDirectory>;

pub(super) struct Fixture {
    pub(super) service: Arc<MemoryService>,
    pub(super) projector: Arc<MemoryProjector>,
    pub(super) partnerships: Arc<MemoryPartnershipRepository>,
    pub(super) shares: Arc<MemoryShareRepository>,
    pub(super) listings: Arc<MemoryPropertyDirectory>,
}

pub(super) fn fixture() -> Fixture {
    let partnerships = Arc::new(MemoryPartnershipRepository::default());
    let shares = Arc::new(MemoryShareRepository::default());
    let companies = Arc::new(MemoryCompanyDirectory::default());
    let listings = Arc::new(MemoryPropertyDirectory::default());

    companies.insert(company_record(ALPHA, "Alpha Realty", ALPHA_SLUG));
    companies.insert(company_record(BRAVO, "Bravo Brokers", BRAVO_SLUG));
    companies.insert(company_record(CEDAR, "Cedar Estates", CEDAR_SLUG));

    listings.insert(listing_record(
        "prop-100",
        ALPHA,
        "Downtown loft",
        true,
        ListingAvailability::Available,
    ));
    listings.insert(listing_record(
        "prop-101",
        ALPHA,
        "Garden duplex",
        false,
        ListingAvailability::Available,
    ));
    listings.insert(listing_record(
        "prop-102",
        ALPHA,
        "Harbor studio",
        true,
        ListingAvailability::Reserved,
    ));
    listings.insert(listing_record(
        "prop-200",
        BRAVO,
        "Hillside villa",
        true,
        ListingAvailability::Available,
    ));

    let service = Arc::new(SharingService::new(
        partnerships.clone(),
        shares.clone(),
        companies.clone(),
        listings.clone(),
    ));
    let projector = Arc::new(VisibilityProjector::new(
        shares.clone(),
        companies.clone(),
        listings.clone(),
    ));

    Fixture {
        service,
        projector,
        partnerships,
        shares,
        listings,
    }
}

/// Runs the request/accept handshake and returns the accepted row.
pub(super) fn accepted_partnership(
    fx: &Fixture,
    requester: &str,
    partner_slug: &str,
    partner: &str,
) -> Partnership {
    let row = fx
        .service
        .request_partnership(&cid(requester), partner_slug, false)
        .expect("partnership request succeeds");
    fx.service
        .accept_partnership(&row.id, &cid(partner))
        .expect("partner accepts")
}

/// Shares a property under an already-accepted partnership and accepts it.
pub(super) fn accepted_share(
    fx: &Fixture,
    owner: &str,
    property: &str,
    partner: &str,
) -> PropertyShare {
    let row = fx
        .service
        .share_property(&cid(owner), &pid(property), &cid(partner), false)
        .expect("share offer succeeds");
    fx.service
        .accept_share(&row.id, &cid(partner))
        .expect("partner accepts share")
}

pub(super) fn router(fx: &Fixture) -> axum::Router {
    sharing_router(SharingRouterState {
        service: fx.service.clone(),
        projector: fx.projector.clone(),
    })
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
