use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::config::DeliveryPolicy;
use crate::recruitment::domain::{
    Application, ApplicationId, ApplicationInput, JobListing, JobListingId, NewApplication,
    NewJobListing,
};
use crate::recruitment::notification::{DispatchError, NotificationSender};
use crate::recruitment::repository::{
    ApplicationRepository, Clock, InMemoryApplicationRepository, InMemoryJobListingRepository,
    JobListingRepository, RepositoryError,
};
use crate::recruitment::router::recruitment_router;
use crate::recruitment::service::{NotificationSettings, RecruitmentService};

pub(super) type TestService =
    RecruitmentService<InMemoryApplicationRepository, InMemoryJobListingRepository, RecordingSender>;

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
}

/// Clock that only moves when told to.
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn starting_at(at: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(at),
        })
    }

    pub(super) fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SentMessage {
    pub(super) recipient: String,
    pub(super) subject: String,
    pub(super) body: String,
}

#[derive(Default)]
pub(super) struct RecordingSender {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingSender {
    pub(super) fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("sender mutex poisoned").clone()
    }
}

impl NotificationSender for RecordingSender {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        self.sent
            .lock()
            .expect("sender mutex poisoned")
            .push(SentMessage {
                recipient: recipient.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}

pub(super) struct FailingSender;

impl NotificationSender for FailingSender {
    fn send(&self, _: &str, _: &str, _: &str) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("connection refused".to_string()))
    }
}

pub(super) struct SlowSender(pub(super) Duration);

impl NotificationSender for SlowSender {
    fn send(&self, _: &str, _: &str, _: &str) -> Result<(), DispatchError> {
        std::thread::sleep(self.0);
        Ok(())
    }
}

/// Application store whose backend is offline.
pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn create(&self, _draft: NewApplication) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by(
        &self,
        _predicate: &dyn Fn(&Application) -> bool,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: ApplicationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Listing store whose backend is offline.
pub(super) struct UnavailableListings;

impl JobListingRepository for UnavailableListings {
    fn create(
        &self,
        _draft: NewJobListing,
        _at: DateTime<Utc>,
    ) -> Result<JobListing, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: JobListingId) -> Result<Option<JobListing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<JobListing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn settings(delivery: DeliveryPolicy) -> NotificationSettings {
    NotificationSettings {
        app_name: "Loob".to_string(),
        timeout: Duration::from_millis(200),
        delivery,
    }
}

pub(super) fn software_developer() -> NewJobListing {
    NewJobListing {
        title: "Software Developer".to_string(),
        location: "Kuala Lumpur, Malaysia".to_string(),
        description: "Test job description".to_string(),
    }
}

pub(super) struct Harness {
    pub(super) service: TestService,
    pub(super) applications: Arc<InMemoryApplicationRepository>,
    pub(super) sender: Arc<RecordingSender>,
    pub(super) clock: Arc<ManualClock>,
    pub(super) listing: JobListing,
}

/// Handles that stay observable after the service moves into a router.
pub(super) struct Handles {
    pub(super) applications: Arc<InMemoryApplicationRepository>,
    pub(super) sender: Arc<RecordingSender>,
    pub(super) listing: JobListing,
}

impl Harness {
    pub(super) fn into_router(self) -> (axum::Router, Handles) {
        let router = recruitment_router(Arc::new(self.service));
        let handles = Handles {
            applications: self.applications,
            sender: self.sender,
            listing: self.listing,
        };
        (router, handles)
    }
}

pub(super) fn harness() -> Harness {
    harness_with(DeliveryPolicy::BestEffort)
}

pub(super) fn harness_with(delivery: DeliveryPolicy) -> Harness {
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let listings = Arc::new(InMemoryJobListingRepository::default());
    let sender = Arc::new(RecordingSender::default());
    let clock = ManualClock::starting_at(epoch());

    let listing = listings
        .create(software_developer(), epoch())
        .expect("seed listing");

    let service = RecruitmentService::new(
        applications.clone(),
        listings,
        sender.clone(),
        settings(delivery),
    )
    .with_clock(clock.clone());

    Harness {
        service,
        applications,
        sender,
        clock,
        listing,
    }
}

pub(super) fn ahmad(job_listing_id: JobListingId) -> ApplicationInput {
    ApplicationInput {
        full_name: Some(json!("Ahmad")),
        phone: Some(json!("+60123456789")),
        email: Some(json!("ahmad@x.com")),
        position: Some(json!("Developer")),
        work_experience: Some(json!("5 years")),
        job_listing_id: Some(json!(job_listing_id.0)),
    }
}

pub(super) fn without_email(job_listing_id: JobListingId) -> ApplicationInput {
    ApplicationInput {
        email: None,
        ..ahmad(job_listing_id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
