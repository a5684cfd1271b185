use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::workflow::ApplicationStatus;

/// Store-assigned identifier of a job listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobListingId(pub u64);

impl fmt::Display for JobListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job posting candidates can apply against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: JobListingId,
    pub title: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing attributes before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJobListing {
    pub title: String,
    pub location: String,
    pub description: String,
}

/// A candidate's submission against exactly one listing.
///
/// `position` is a snapshot taken at submission time and is not kept in sync with
/// the listing title afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub position: String,
    pub work_experience: String,
    pub status: ApplicationStatus,
    pub job_listing_id: JobListingId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application attributes before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub position: String,
    pub work_experience: String,
    pub status: ApplicationStatus,
    pub job_listing_id: JobListingId,
    pub created_at: DateTime<Utc>,
}

/// Raw submission payload as received from an untrusted caller.
///
/// Every field is optional and untyped so validation can report all missing or
/// mistyped fields at once instead of rejecting the whole body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInput {
    #[serde(default)]
    pub full_name: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub position: Option<Value>,
    #[serde(default)]
    pub work_experience: Option<Value>,
    #[serde(default)]
    pub job_listing_id: Option<Value>,
}

/// Public representation of an application with its joined listing.
///
/// Carries the `applicant_name`, `applicant_email` and `cover_letter` aliases the
/// mobile client reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub applicant_name: String,
    pub applicant_email: Option<String>,
    pub cover_letter: String,
    pub job_listing: Option<JobListing>,
}

impl ApplicationView {
    pub fn new(application: Application, job_listing: Option<JobListing>) -> Self {
        Self {
            applicant_name: application.full_name.clone(),
            applicant_email: application.email.clone(),
            cover_letter: application.work_experience.clone(),
            application,
            job_listing,
        }
    }
}

/// Contact details used to look up the latest application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: ApplicationStatus,
    pub application_id: ApplicationId,
    pub position: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Timestamp layout used by the status endpoint.
pub const STATUS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&value.format(STATUS_TIMESTAMP_FORMAT))
}

/// Recruiter-side filters over the application list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    /// Case-insensitive substring of the position.
    pub position: Option<String>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        if let Some(status) = self.status {
            if application.status != status {
                return false;
            }
        }

        match &self.position {
            Some(needle) => application
                .position
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
