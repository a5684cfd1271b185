use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationInput, ApplicationView, JobListing,
    JobListingId, NewApplication, NewJobListing, StatusQuery, StatusReport,
};
use super::notification::{dispatch, ConfirmationEmail, DispatchError, NotificationSender};
use super::repository::{
    ApplicationRepository, Clock, JobListingRepository, RepositoryError, SystemClock,
};
use super::validation::{validate_status_query, validate_submission, ContactLookup, FieldErrors};
use super::workflow::{transition, ApplicationStatus, UnknownStatus};
use crate::config::{DeliveryPolicy, MailConfig};

/// Dispatch settings the service applies to confirmation emails.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    /// Name used in the body sign-off.
    pub app_name: String,
    pub timeout: Duration,
    pub delivery: DeliveryPolicy,
}

impl NotificationSettings {
    pub fn from_config(app_name: &str, mail: &MailConfig) -> Self {
        Self {
            app_name: app_name.to_string(),
            timeout: mail.timeout,
            delivery: mail.delivery,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            app_name: "Loob".to_string(),
            timeout: Duration::from_secs(10),
            delivery: DeliveryPolicy::BestEffort,
        }
    }
}

/// What happened to the confirmation email of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    Sent,
    /// No email address was supplied.
    Skipped,
    Failed,
}

/// Successful submission result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub application: Application,
    pub confirmation: ConfirmationOutcome,
}

/// Service composing the stores, the status workflow, and the notification dispatcher.
pub struct RecruitmentService<A, J, N> {
    applications: Arc<A>,
    listings: Arc<J>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    settings: NotificationSettings,
}

impl<A, J, N> RecruitmentService<A, J, N>
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(
        applications: Arc<A>,
        listings: Arc<J>,
        notifier: Arc<N>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            applications,
            listings,
            notifier,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate, persist, and confirm a new application.
    ///
    /// The record is stored before the confirmation is attempted and is never rolled
    /// back. Under [`DeliveryPolicy::Strict`] a failed confirmation is still reported
    /// as [`ServiceError::Dispatch`].
    pub async fn submit(
        &self,
        input: ApplicationInput,
    ) -> Result<SubmissionReceipt, ServiceError> {
        let mut lookup_failure = None;
        let validated = validate_submission(&input, |id| match self.listings.find_by_id(id) {
            Ok(found) => found.is_some(),
            Err(err) => {
                lookup_failure = Some(err);
                true
            }
        });
        if let Some(err) = lookup_failure {
            error!(%err, "job listing lookup failed during submission");
            return Err(err.into());
        }
        let submission = validated.map_err(|errors| {
            debug!(fields = %errors, "submission rejected");
            ServiceError::Validation(errors)
        })?;

        let application = self
            .applications
            .create(NewApplication {
                full_name: submission.full_name,
                phone: submission.phone,
                email: submission.email,
                position: submission.position,
                work_experience: submission.work_experience,
                status: ApplicationStatus::Applied,
                job_listing_id: submission.job_listing_id,
                created_at: self.clock.now(),
            })
            .map_err(|err| {
                error!(%err, "failed to persist application");
                ServiceError::from(err)
            })?;

        info!(
            application_id = %application.id,
            job_listing_id = %application.job_listing_id,
            "application submitted"
        );

        let confirmation = self.confirm(&application).await;
        if let Err(err) = confirmation {
            return match self.settings.delivery {
                DeliveryPolicy::BestEffort => Ok(SubmissionReceipt {
                    application,
                    confirmation: ConfirmationOutcome::Failed,
                }),
                DeliveryPolicy::Strict => Err(ServiceError::Dispatch(err)),
            };
        }

        let outcome = if application.email.is_some() {
            ConfirmationOutcome::Sent
        } else {
            ConfirmationOutcome::Skipped
        };
        Ok(SubmissionReceipt {
            application,
            confirmation: outcome,
        })
    }

    async fn confirm(&self, application: &Application) -> Result<(), DispatchError> {
        let Some(message) = ConfirmationEmail::for_application(application, &self.settings.app_name)
        else {
            return Ok(());
        };

        dispatch(self.notifier.clone(), message, self.settings.timeout)
            .await
            .map_err(|err| {
                warn!(application_id = %application.id, %err, "confirmation email not sent");
                err
            })
    }

    /// Send the confirmation for an existing application, outside the submission flow.
    pub async fn resend_confirmation(
        &self,
        application_id: ApplicationId,
    ) -> Result<ConfirmationOutcome, ServiceError> {
        let application = self.find_application(application_id)?;
        if application.email.is_none() {
            return Ok(ConfirmationOutcome::Skipped);
        }
        self.confirm(&application).await?;
        Ok(ConfirmationOutcome::Sent)
    }

    /// Report the status of the most recent application for a phone or email.
    pub fn lookup_status(&self, query: &StatusQuery) -> Result<StatusReport, ServiceError> {
        let contact = validate_status_query(query).map_err(ServiceError::Validation)?;

        let matches = match &contact {
            ContactLookup::Phone(phone) => self
                .applications
                .find_by(&|record| record.phone == *phone)?,
            ContactLookup::Email(email) => self
                .applications
                .find_by(&|record| record.email.as_deref() == Some(email.as_str()))?,
        };

        let latest = matches
            .into_iter()
            .max_by_key(|record| (record.created_at, record.id))
            .ok_or(ServiceError::NotFound(
                "No application found for the provided contact information.",
            ))?;

        Ok(StatusReport {
            status: latest.status,
            application_id: latest.id,
            position: latest.position,
            created_at: latest.created_at,
        })
    }

    /// Apply a recruiter status change. Any pipeline status may follow any other.
    pub fn set_status(
        &self,
        application_id: ApplicationId,
        raw_status: &str,
    ) -> Result<Application, ServiceError> {
        let next = raw_status.parse::<ApplicationStatus>()?;

        let mut application = self.find_application(application_id)?;
        let previous = transition(&mut application, next, self.clock.now());
        self.applications
            .update(application.clone())
            .map_err(|err| match err {
                RepositoryError::NotFound => ServiceError::NotFound(APPLICATION_NOT_FOUND),
                other => other.into(),
            })?;

        info!(
            application_id = %application.id,
            from = %previous,
            to = %next,
            "application status updated"
        );
        Ok(application)
    }

    /// All applications newest first, joined with their listings.
    pub fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationView>, ServiceError> {
        let mut records = self.applications.find_by(&|record| filter.matches(record))?;
        records.sort_by_key(|record| Reverse((record.created_at, record.id)));

        records
            .into_iter()
            .map(|record| -> Result<ApplicationView, ServiceError> {
                let listing = self.listings.find_by_id(record.job_listing_id)?;
                Ok(ApplicationView::new(record, listing))
            })
            .collect()
    }

    pub fn get_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<ApplicationView, ServiceError> {
        let application = self.find_application(application_id)?;
        let listing = self.listings.find_by_id(application.job_listing_id)?;
        Ok(ApplicationView::new(application, listing))
    }

    /// Administrative removal of an application.
    pub fn delete_application(&self, application_id: ApplicationId) -> Result<(), ServiceError> {
        self.applications
            .delete(application_id)
            .map_err(|err| match err {
                RepositoryError::NotFound => ServiceError::NotFound(APPLICATION_NOT_FOUND),
                other => other.into(),
            })?;
        info!(application_id = %application_id, "application deleted");
        Ok(())
    }

    /// All listings newest first.
    pub fn list_job_listings(&self) -> Result<Vec<JobListing>, ServiceError> {
        let mut listings = self.listings.list()?;
        listings.sort_by_key(|listing| Reverse((listing.created_at, listing.id)));
        Ok(listings)
    }

    pub fn get_job_listing(&self, id: JobListingId) -> Result<JobListing, ServiceError> {
        self.listings
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound("Job listing not found."))
    }

    pub fn create_job_listing(&self, draft: NewJobListing) -> Result<JobListing, ServiceError> {
        let listing = self.listings.create(draft, self.clock.now())?;
        info!(job_listing_id = %listing.id, title = %listing.title, "job listing created");
        Ok(listing)
    }

    fn find_application(&self, id: ApplicationId) -> Result<Application, ServiceError> {
        self.applications
            .find_by_id(id)?
            .ok_or(ServiceError::NotFound(APPLICATION_NOT_FOUND))
    }
}

const APPLICATION_NOT_FOUND: &str = "Application not found.";

/// Error raised by the recruitment service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl From<UnknownStatus> for ServiceError {
    fn from(value: UnknownStatus) -> Self {
        ServiceError::Validation(FieldErrors::single("status", value.to_string()))
    }
}
