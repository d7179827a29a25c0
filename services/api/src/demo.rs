use crate::infra::{
    seeded_directories, InMemoryPartnershipRepository, InMemoryShareRepository,
};
use clap::Args;
use propshare::error::AppError;
use propshare::sharing::{
    CompanyId, PropertyId, SharingService, VisibilityProjector, VisibleListing,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Include unpublished and off-market listings in the projection output
    #[arg(long)]
    pub(crate) include_unpublished: bool,
}

/// Walks the seeded tenants through the whole flow: partnership handshake,
/// per-property share, the partner feed, and a revocation.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let partnerships = Arc::new(InMemoryPartnershipRepository::default());
    let shares = Arc::new(InMemoryShareRepository::default());
    let (companies, listings) = seeded_directories();
    let companies = Arc::new(companies);
    let listings = Arc::new(listings);

    let service = SharingService::new(
        partnerships,
        shares.clone(),
        companies.clone(),
        listings.clone(),
    );
    let projector = VisibilityProjector::new(shares, companies, listings);

    let atlantica = CompanyId("co-atlantica".to_string());
    let horizonte = CompanyId("co-horizonte".to_string());
    let public_only = !args.include_unpublished;

    println!("Partnership and sharing demo");

    let partnership = service.request_partnership(&atlantica, "horizonte-corretores", false)?;
    println!(
        "  Atlantica requested a partnership with Horizonte ({} -> {})",
        partnership.id.0,
        partnership.status.label()
    );

    let partnership = service.accept_partnership(&partnership.id, &horizonte)?;
    println!(
        "  Horizonte accepted ({} -> {})",
        partnership.id.0,
        partnership.status.label()
    );

    let share = service.share_property(
        &atlantica,
        &PropertyId("prop-1001".to_string()),
        &horizonte,
        true,
    )?;
    println!(
        "  Atlantica offered {} to Horizonte ({} -> {})",
        share.property_id.0,
        share.id.0,
        share.status.label()
    );

    let share = service.accept_share(&share.id, &horizonte)?;
    println!(
        "  Horizonte accepted the share ({} -> {})",
        share.id.0,
        share.status.label()
    );

    let feed = projector.visible_listings(&horizonte, public_only)?;
    println!("\nHorizonte public feed ({} listings):", feed.len());
    render_feed(&feed);

    let share = service.revoke_share(&share.id, &atlantica)?;
    println!(
        "\n  Atlantica revoked the share ({} -> {})",
        share.id.0,
        share.status.label()
    );

    let feed = projector.visible_listings(&horizonte, public_only)?;
    println!("\nHorizonte public feed after revocation ({} listings):", feed.len());
    render_feed(&feed);

    Ok(())
}

fn render_feed(feed: &[VisibleListing]) {
    for entry in feed {
        println!(
            "  {} - {} (owner: {}{})",
            entry.property_id.0,
            entry.title,
            entry.owner.name,
            if entry.is_highlight { ", highlighted" } else { "" }
        );
    }
}
