//! Recruiter triage pipeline for submitted applications.
//!
//! The status set is closed, but transitions between members are unrestricted:
//! a recruiter may move an application from `offer` back to `applied`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Application;

/// Position of an application in the triage pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    /// Every status, in pipeline order.
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Comma separated list of accepted labels, for error messages.
    pub fn allowed_labels() -> String {
        Self::ALL
            .iter()
            .map(|status| status.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// Raised when a status label is outside the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("The selected status '{0}' is invalid. Allowed values: applied, screening, interview, offer, rejected")]
pub struct UnknownStatus(pub String);

/// Move `application` to `next`, stamping `updated_at`. Returns the previous status.
pub fn transition(
    application: &mut Application,
    next: ApplicationStatus,
    at: DateTime<Utc>,
) -> ApplicationStatus {
    let previous = application.status;
    application.status = next;
    application.updated_at = at;
    previous
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recruitment::domain::{ApplicationId, JobListingId};
    use chrono::{Duration, TimeZone};

    fn record(status: ApplicationStatus) -> Application {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        Application {
            id: ApplicationId(1),
            full_name: "Lim Wei Ming".to_string(),
            phone: "+60123456789".to_string(),
            email: None,
            position: "Software Developer".to_string(),
            work_experience: "2 years at a fintech".to_string(),
            status,
            job_listing_id: JobListingId(1),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn parses_every_label() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.label().parse::<ApplicationStatus>(), Ok(status));
        }
    }

    #[test]
    fn rejects_labels_outside_the_pipeline() {
        for raw in ["hired", "Applied", " offer", ""] {
            assert_eq!(
                raw.parse::<ApplicationStatus>(),
                Err(UnknownStatus(raw.to_string()))
            );
        }
    }

    #[test]
    fn unknown_status_message_names_allowed_set() {
        let message = UnknownStatus("hired".to_string()).to_string();
        assert!(message.contains(&ApplicationStatus::allowed_labels()));
    }

    #[test]
    fn default_is_applied() {
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Applied);
    }

    #[test]
    fn backward_transitions_are_permitted() {
        let mut application = record(ApplicationStatus::Offer);
        let later = application.updated_at + Duration::hours(3);

        let previous = transition(&mut application, ApplicationStatus::Applied, later);

        assert_eq!(previous, ApplicationStatus::Offer);
        assert_eq!(application.status, ApplicationStatus::Applied);
        assert_eq!(application.updated_at, later);
        assert_ne!(application.created_at, application.updated_at);
    }

    #[test]
    fn serializes_as_snake_case_label() {
        let value = serde_json::to_value(ApplicationStatus::Interview).expect("serializes");
        assert_eq!(value, serde_json::json!("interview"));
    }
}
