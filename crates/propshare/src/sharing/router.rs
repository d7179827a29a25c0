use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::directory::{CompanyDirectory, PropertyDirectory};
use super::domain::{CompanyId, PartnershipId, PropertyId, ShareId};
use super::projection::VisibilityProjector;
use super::repository::{PartnershipRepository, ShareRepository};
use super::service::SharingService;

/// Header the auth gateway uses to convey the authenticated caller's company.
/// Authentication itself happens upstream; a blank or absent header is a
/// malformed request here, not an auth failure.
pub const COMPANY_HEADER: &str = "x-company-id";

/// Shared state for the sharing routes: the mutation service plus the
/// read-side projector over the same repositories.
pub struct SharingRouterState<P, S, C, L> {
    pub service: Arc<SharingService<P, S, C, L>>,
    pub projector: Arc<VisibilityProjector<S, C, L>>,
}

impl<P, S, C, L> Clone for SharingRouterState<P, S, C, L> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            projector: self.projector.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestPartnershipBody {
    pub partner_slug: String,
    #[serde(default)]
    pub share_all_properties: bool,
}

#[derive(Debug, Deserialize)]
pub struct SharePropertyBody {
    pub property_id: String,
    pub partner_company_id: String,
    #[serde(default)]
    pub is_highlight: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListingFeedQuery {
    /// Apply public-site gating (published + available). Defaults to true so
    /// the public renderer can call the route without parameters.
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

/// Router builder exposing the partnership, share, and feed endpoints.
pub fn sharing_router<P, S, C, L>(state: SharingRouterState<P, S, C, L>) -> Router
where
    P: PartnershipRepository + 'static,
    S: ShareRepository + 'static,
    C: CompanyDirectory + 'static,
    L: PropertyDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/partnerships",
            post(request_partnership_handler::<P, S, C, L>)
                .get(list_partnerships_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/partnerships/pending",
            get(pending_partnerships_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/partnerships/accepted",
            get(accepted_partnerships_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/partnerships/:partnership_id/accept",
            post(accept_partnership_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/partnerships/:partnership_id/reject",
            post(reject_partnership_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/partnerships/:partnership_id/cancel",
            post(cancel_partnership_handler::<P, S, C, L>),
        )
        .route("/api/v1/shares", post(share_property_handler::<P, S, C, L>))
        .route(
            "/api/v1/shares/sent",
            get(shares_sent_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/shares/received",
            get(shares_received_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/shares/pending",
            get(pending_shares_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/shares/:share_id/accept",
            post(accept_share_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/shares/:share_id/reject",
            post(reject_share_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/shares/:share_id/revoke",
            post(revoke_share_handler::<P, S, C, L>),
        )
        .route(
            "/api/v1/companies/:slug/listings",
            get(company_listings_handler::<P, S, C, L>),
        )
        .with_state(state)
}

fn acting_company(headers: &HeaderMap) -> Result<CompanyId, Response> {
    match headers.get(COMPANY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(raw) if !raw.trim().is_empty() => Ok(CompanyId(raw.trim().to_string())),
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing or blank X-Company-Id header" })),
        )
            .into_response()),
    }
}

pub(crate) async fn request_partnership_handler<P, S, C, L>(
    State(state): State<SharingRouterState<P, S, C, L>>,
    headers: HeaderMap,
    Json(body): Json<RequestPartnershipBody>,
) -> Response
where
    P: PartnershipRepository + 'static,
    S: ShareRepository + 'static,
    C: CompanyDirectory + 'static,
    L: PropertyDirectory + 'static,
{
    let acting = match acting_company(&headers) {
        Ok(acting) => acting,
        Err(response) => return response,
    };
    let result = state
        .service
        .request_partnership(&acting, &body.partner_slug, body.share_all_properties)
        .and_then(|row| state.service.partnership_view(&row, &acting));
    match result {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

macro_rules! partnership_transition_handler {
    ($name:ident, $method:ident) => {
        pub(crate) async fn $name<P, S, C, L>(
            State(state): State<SharingRouterState<P, S, C, L>>,
            headers: HeaderMap,
            Path(partnership_id): Path<String>,
        ) -> Response
        where
            P: PartnershipRepository + 'static,
            S: ShareRepository + 'static,
            C: CompanyDirectory + 'static,
            L: PropertyDirectory + 'static,
        {
            let acting = match acting_company(&headers) {
                Ok(acting) => acting,
                Err(response) => return response,
            };
            let id = PartnershipId(partnership_id);
            let result = state
                .service
                .$method(&id, &acting)
                .and_then(|row| state.service.partnership_view(&row, &acting));
            match result {
                Ok(view) => (StatusCode::OK, Json(view)).into_response(),
                Err(error) => AppError::from(error).into_response(),
            }
        }
    };
}

partnership_transition_handler!(accept_partnership_handler, accept_partnership);
partnership_transition_handler!(reject_partnership_handler, reject_partnership);
partnership_transition_handler!(cancel_partnership_handler, cancel_partnership);

macro_rules! partnership_list_handler {
    ($name:ident, $method:ident) => {
        pub(crate) async fn $name<P, S, C, L>(
            State(state): State<SharingRouterState<P, S, C, L>>,
            headers: HeaderMap,
        ) -> Response
        where
            P: PartnershipRepository + 'static,
            S: ShareRepository + 'static,
            C: CompanyDirectory + 'static,
            L: PropertyDirectory + 'static,
        {
            let acting = match acting_company(&headers) {
                Ok(acting) => acting,
                Err(response) => return response,
            };
            match state.service.$method(&acting) {
                Ok(views) => (StatusCode::OK, Json(views)).into_response(),
                Err(error) => AppError::from(error).into_response(),
            }
        }
    };
}

partnership_list_handler!(list_partnerships_handler, partnerships_for);
partnership_list_handler!(pending_partnerships_handler, pending_partnerships);
partnership_list_handler!(accepted_partnerships_handler, accepted_partnerships);

pub(crate) async fn share_property_handler<P, S, C, L>(
    State(state): State<SharingRouterState<P, S, C, L>>,
    headers: HeaderMap,
    Json(body): Json<SharePropertyBody>,
) -> Response
where
    P: PartnershipRepository + 'static,
    S: ShareRepository + 'static,
    C: CompanyDirectory + 'static,
    L: PropertyDirectory + 'static,
{
    let acting = match acting_company(&headers) {
        Ok(acting) => acting,
        Err(response) => return response,
    };
    let property_id = PropertyId(body.property_id);
    let partner = CompanyId(body.partner_company_id);
    let result = state
        .service
        .share_property(&acting, &property_id, &partner, body.is_highlight)
        .and_then(|row| state.service.share_view(&row, &acting));
    match result {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

macro_rules! share_transition_handler {
    ($name:ident, $method:ident) => {
        pub(crate) async fn $name<P, S, C, L>(
            State(state): State<SharingRouterState<P, S, C, L>>,
            headers: HeaderMap,
            Path(share_id): Path<String>,
        ) -> Response
        where
            P: PartnershipRepository + 'static,
            S: ShareRepository + 'static,
            C: CompanyDirectory + 'static,
            L: PropertyDirectory + 'static,
        {
            let acting = match acting_company(&headers) {
                Ok(acting) => acting,
                Err(response) => return response,
            };
            let id = ShareId(share_id);
            let result = state
                .service
                .$method(&id, &acting)
                .and_then(|row| state.service.share_view(&row, &acting));
            match result {
                Ok(view) => (StatusCode::OK, Json(view)).into_response(),
                Err(error) => AppError::from(error).into_response(),
            }
        }
    };
}

share_transition_handler!(accept_share_handler, accept_share);
share_transition_handler!(reject_share_handler, reject_share);
share_transition_handler!(revoke_share_handler, revoke_share);

macro_rules! share_list_handler {
    ($name:ident, $method:ident) => {
        pub(crate) async fn $name<P, S, C, L>(
            State(state): State<SharingRouterState<P, S, C, L>>,
            headers: HeaderMap,
        ) -> Response
        where
            P: PartnershipRepository + 'static,
            S: ShareRepository + 'static,
            C: CompanyDirectory + 'static,
            L: PropertyDirectory + 'static,
        {
            let acting = match acting_company(&headers) {
                Ok(acting) => acting,
                Err(response) => return response,
            };
            match state.service.$method(&acting) {
                Ok(views) => (StatusCode::OK, Json(views)).into_response(),
                Err(error) => AppError::from(error).into_response(),
            }
        }
    };
}

share_list_handler!(shares_sent_handler, shares_sent);
share_list_handler!(shares_received_handler, shares_received);
share_list_handler!(pending_shares_handler, pending_shares);

/// Public-site feed: the visibility projection for the company behind `slug`.
/// No acting-company header here; the route serves anonymous site visitors.
pub(crate) async fn company_listings_handler<P, S, C, L>(
    State(state): State<SharingRouterState<P, S, C, L>>,
    Path(slug): Path<String>,
    Query(query): Query<ListingFeedQuery>,
) -> Response
where
    P: PartnershipRepository + 'static,
    S: ShareRepository + 'static,
    C: CompanyDirectory + 'static,
    L: PropertyDirectory + 'static,
{
    let result = state
        .service
        .company_by_slug(&slug)
        .and_then(|company| state.projector.visible_listings(&company.id, query.public));
    match result {
        Ok(feed) => (StatusCode::OK, Json(feed)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}
