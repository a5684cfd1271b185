//! Job listings, application intake, recruiter status triage, and confirmation email.
//!
//! The [`RecruitmentService`] facade owns the submission pipeline and status lookup;
//! [`recruitment_router`] exposes it over HTTP.

pub mod domain;
pub mod notification;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationInput, ApplicationView, JobListing,
    JobListingId, NewApplication, NewJobListing, StatusQuery, StatusReport,
};
pub use notification::{
    ConfirmationEmail, DispatchError, LogNotificationSender, Mailer, NotificationSender,
    SmtpNotificationSender,
};
pub use repository::{
    ApplicationRepository, Clock, InMemoryApplicationRepository, InMemoryJobListingRepository,
    JobListingRepository, RepositoryError, SystemClock,
};
pub use router::recruitment_router;
pub use service::{
    ConfirmationOutcome, NotificationSettings, RecruitmentService, ServiceError,
    SubmissionReceipt,
};
pub use validation::FieldErrors;
pub use workflow::{ApplicationStatus, UnknownStatus};
