use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use propshare::sharing::{
    CompanyDirectory, CompanyId, CompanyRecord, DirectoryError, ListingAvailability,
    ListingRecord, Partnership, PartnershipId, PartnershipRepository, PartnershipStatus,
    PropertyDirectory, PropertyId, PropertyShare, RepositoryError, ShareId, ShareRepository,
    ShareStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory partnership storage. Transitions run under the row mutex, which
/// satisfies the atomic check-then-set contract of the repository trait.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPartnershipRepository {
    rows: Arc<Mutex<Vec<Partnership>>>,
}

impl PartnershipRepository for InMemoryPartnershipRepository {
    fn insert(&self, row: Partnership) -> Result<Partnership, RepositoryError> {
        let mut rows = self.rows.lock().expect("partnership mutex poisoned");
        let occupied = rows.iter().any(|existing| {
            existing.is_open()
                && existing.links(&row.requester_company_id, &row.partner_company_id)
        });
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

/// In-memory share storage with the same locking discipline.
#[derive(Default, Clone)]
pub(crate) struct InMemoryShareRepository {
    rows: Arc<Mutex<Vec<PropertyShare>>>,
}

impl ShareRepository for InMemoryShareRepository {
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
            .filter(|row| row.status == ShareStatus::Accepted && row.partner_company_id == *partner)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCompanyDirectory {
    companies: Arc<Mutex<Vec<CompanyRecord>>>,
}

impl InMemoryCompanyDirectory {
    pub(crate) fn insert(&self, record: CompanyRecord) {
        self.companies
            .lock()
            .expect("company mutex poisoned")
            .push(record);
    }
}

impl CompanyDirectory for InMemoryCompanyDirectory {
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
pub(crate) struct InMemoryPropertyDirectory {
    listings: Arc<Mutex<Vec<ListingRecord>>>,
}

impl InMemoryPropertyDirectory {
    pub(crate) fn insert(&self, record: ListingRecord) {
        self.listings
            .lock()
            .expect("listing mutex poisoned")
            .push(record);
    }
}

impl PropertyDirectory for InMemoryPropertyDirectory {
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

/// Seed directories with a handful of companies and listings. The real
/// deployment points the traits at the platform's company and property
/// services; the seed keeps standalone runs and the demo command usable.
pub(crate) fn seeded_directories() -> (InMemoryCompanyDirectory, InMemoryPropertyDirectory) {
    let companies = InMemoryCompanyDirectory::default();
    let listings = InMemoryPropertyDirectory::default();

    for (id, name, slug) in [
        ("co-atlantica", "Atlantica Imóveis", "atlantica-imoveis"),
        ("co-horizonte", "Horizonte Corretores", "horizonte-corretores"),
        ("co-miramar", "Miramar Realty", "miramar-realty"),
    ] {
        companies.insert(CompanyRecord {
            id: CompanyId(id.to_string()),
            name: name.to_string(),
            slug: slug.to_string(),
        });
    }

    for (id, owner, title, published, availability) in [
        (
            "prop-1001",
            "co-atlantica",
            "Two-bedroom apartment, Boa Viagem",
            true,
            ListingAvailability::Available,
        ),
        (
            "prop-1002",
            "co-atlantica",
            "Penthouse with sea view",
            false,
            ListingAvailability::Available,
        ),
        (
            "prop-2001",
            "co-horizonte",
            "Commercial suite, city center",
            true,
            ListingAvailability::Available,
        ),
        (
            "prop-2002",
            "co-horizonte",
            "Family house with garden",
            true,
            ListingAvailability::Reserved,
        ),
    ] {
        listings.insert(ListingRecord {
            id: PropertyId(id.to_string()),
            owner_company_id: CompanyId(owner.to_string()),
            title: title.to_string(),
            is_published: published,
            availability,
        });
    }

    (companies, listings)
}
