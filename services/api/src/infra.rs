use chrono::{DateTime, Duration, Utc};
use loob_recruitment::config::AppConfig;
use loob_recruitment::error::AppError;
use loob_recruitment::recruitment::{
    InMemoryApplicationRepository, InMemoryJobListingRepository, JobListingRepository, Mailer,
    NewJobListing, NotificationSettings, RecruitmentService, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiService =
    RecruitmentService<InMemoryApplicationRepository, InMemoryJobListingRepository, Mailer>;

/// Title, location, and description of the listings loaded at startup.
pub(crate) const SEED_CATALOGUE: [(&str, &str, &str); 6] = [
    (
        "Barista - Tealive",
        "Kuala Lumpur, Malaysia",
        "Join Loob Holding's flagship brand Tealive as a Barista! We are looking for enthusiastic individuals to prepare and serve premium beverages while delivering exceptional customer service. Experience our fast-paced F&B environment across 1,000+ outlets. No prior experience required - we provide comprehensive training. Competitive salary with performance incentives.",
    ),
    (
        "Area Manager - F&B Operations",
        "Kota Damansara, Selangor",
        "Loob Holding is seeking an experienced Area Manager to oversee multiple F&B outlets across Selangor. Lead a team of store managers, ensure operational excellence, and drive sales growth for our 9 F&B brands. Minimum 3 years supervisory experience in retail or F&B industry. Company car and comprehensive benefits package included.",
    ),
    (
        "Digital Marketing Executive",
        "Kota Damansara, Selangor",
        "Drive digital marketing initiatives for Loob Holding's portfolio of F&B brands serving 5 million+ consumers monthly. Manage social media campaigns, content creation, and online advertising across Malaysia, Singapore, and other markets. Experience with Facebook Ads, Google Ads, and social media management required.",
    ),
    (
        "Store Manager - Tealive",
        "Various Locations - Malaysia",
        "Lead a Tealive outlet as Store Manager! Manage daily operations, staff scheduling, inventory control, and customer satisfaction for one of Malaysia's fastest-growing beverage chains. Previous F&B management experience preferred. Opportunity to grow within our expanding network across 3 continents.",
    ),
    (
        "Supply Chain Coordinator",
        "Kota Damansara, Selangor",
        "Join Loob Holding's supply chain team to ensure seamless operations across 1,000+ outlets. Coordinate inventory management, vendor relationships, and logistics for our F&B brands. Background in supply chain, logistics, or operations preferred. Work with international suppliers and distributors across Asia.",
    ),
    (
        "Brand Development Manager",
        "Kota Damansara, Selangor",
        "Shape the future of Loob Holding's F&B brands! Lead brand strategy, product development, and market expansion initiatives. Work closely with franchisees and international partners to grow our presence across Southeast Asia. MBA or relevant degree with 5+ years brand management experience in FMCG or F&B industry.",
    ),
];

/// Load the catalogue. Each entry is one second older than the previous one, so
/// newest-first listings come back in catalogue order.
pub(crate) fn seed_listings<J>(listings: &J, at: DateTime<Utc>) -> Result<usize, RepositoryError>
where
    J: JobListingRepository,
{
    for (offset, (title, location, description)) in (0i64..).zip(SEED_CATALOGUE) {
        listings.create(
            NewJobListing {
                title: title.to_string(),
                location: location.to_string(),
                description: description.to_string(),
            },
            at - Duration::seconds(offset),
        )?;
    }
    Ok(SEED_CATALOGUE.len())
}

/// Wire the in-memory stores and the configured mailer into a service.
pub(crate) fn build_service(config: &AppConfig) -> Result<ApiService, AppError> {
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let listings = Arc::new(InMemoryJobListingRepository::default());

    if config.seed_listings {
        let seeded = seed_listings(listings.as_ref(), Utc::now())
            .map_err(|err| AppError::Service(err.into()))?;
        info!(seeded, "job listing catalogue loaded");
    }

    let mailer = Mailer::from_config(&config.mail)?;
    info!(transport = mailer.transport_name(), "mail transport configured");

    Ok(RecruitmentService::new(
        applications,
        listings,
        Arc::new(mailer),
        NotificationSettings::from_config(&config.app_name, &config.mail),
    ))
}
