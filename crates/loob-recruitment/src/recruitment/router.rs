use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationFilter, ApplicationId, ApplicationInput, JobListingId, StatusQuery};
use super::notification::NotificationSender;
use super::repository::{ApplicationRepository, JobListingRepository};
use super::service::{RecruitmentService, ServiceError};
use super::validation::{validate_job_listing, FieldErrors, JobListingInput};
use super::workflow::ApplicationStatus;

type SharedService<A, J, N> = Arc<RecruitmentService<A, J, N>>;

/// Router exposing the public intake API and the recruiter triage endpoints.
pub fn recruitment_router<A, J, N>(service: SharedService<A, J, N>) -> Router
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            post(submit_handler::<A, J, N>).get(list_handler::<A, J, N>),
        )
        .route("/api/applications/status", get(status_handler::<A, J, N>))
        .route("/api/jobs", get(list_jobs_handler::<A, J, N>))
        .route("/api/jobs/:job_id", get(show_job_handler::<A, J, N>))
        .route("/admin/applications", get(admin_list_handler::<A, J, N>))
        .route(
            "/admin/applications/:application_id",
            get(admin_show_handler::<A, J, N>).delete(admin_delete_handler::<A, J, N>),
        )
        .route(
            "/admin/applications/:application_id/status",
            patch(admin_status_handler::<A, J, N>),
        )
        .route(
            "/admin/applications/:application_id/confirmation",
            post(admin_resend_handler::<A, J, N>),
        )
        .route("/admin/jobs", post(admin_create_job_handler::<A, J, N>))
        .with_state(service)
}

fn failure(status: StatusCode, message: &str) -> Response {
    let payload = json!({
        "success": false,
        "message": message,
    });
    (status, Json(payload)).into_response()
}

fn validation_failure(errors: &FieldErrors) -> Response {
    let payload = json!({
        "success": false,
        "message": errors.first_message().unwrap_or("The given data was invalid."),
        "errors": errors,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

/// Map a service failure onto the uniform error body. `fallback` replaces internal detail.
fn service_failure(err: ServiceError, fallback: &str) -> Response {
    match err {
        ServiceError::Validation(errors) => validation_failure(&errors),
        ServiceError::NotFound(message) => failure(StatusCode::NOT_FOUND, message),
        ServiceError::Dispatch(_) | ServiceError::Persistence(_) => {
            failure(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}

fn malformed_body(rejection: JsonRejection) -> Response {
    tracing::debug!(%rejection, "rejected request body");
    failure(
        StatusCode::UNPROCESSABLE_ENTITY,
        "The request body must be a JSON object with the expected fields.",
    )
}

fn malformed_query(rejection: QueryRejection) -> Response {
    tracing::debug!(%rejection, "rejected query string");
    failure(
        StatusCode::UNPROCESSABLE_ENTITY,
        "The query string is malformed.",
    )
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

pub(crate) async fn submit_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    payload: Result<Json<ApplicationInput>, JsonRejection>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match service.submit(input).await {
        Ok(receipt) => {
            let payload = json!({
                "success": true,
                "message": "Application submitted successfully",
                "application_id": receipt.application.id,
                "confirmation": receipt.confirmation,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => service_failure(err, "Failed to submit application. Please try again."),
    }
}

pub(crate) async fn list_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.list_applications(&ApplicationFilter::default()) {
        Ok(applications) => Json(json!({
            "success": true,
            "data": applications,
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to fetch applications."),
    }
}

pub(crate) async fn status_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return malformed_query(rejection),
    };

    match service.lookup_status(&query) {
        Ok(report) => {
            let mut payload = json!({ "success": true });
            if let (Some(object), Ok(serde_json::Value::Object(fields))) =
                (payload.as_object_mut(), serde_json::to_value(&report))
            {
                object.extend(fields);
            }
            Json(payload).into_response()
        }
        Err(err) => service_failure(err, "Failed to check application status."),
    }
}

pub(crate) async fn list_jobs_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.list_job_listings() {
        Ok(listings) => Json(json!({
            "success": true,
            "data": listings,
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to fetch job listings."),
    }
}

pub(crate) async fn show_job_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    Path(job_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Some(id) = parse_id(&job_id) else {
        return failure(StatusCode::NOT_FOUND, "Job listing not found.");
    };

    match service.get_job_listing(JobListingId(id)) {
        Ok(listing) => Json(json!({
            "success": true,
            "data": listing,
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to fetch job listing."),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdminListQuery {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    position: Option<String>,
}

impl AdminListQuery {
    fn into_filter(self) -> Result<ApplicationFilter, FieldErrors> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ApplicationStatus>()
                    .map_err(|err| FieldErrors::single("status", err.to_string()))?,
            ),
        };
        let position = self
            .position
            .map(|position| position.trim().to_string())
            .filter(|position| !position.is_empty());

        Ok(ApplicationFilter { status, position })
    }
}

pub(crate) async fn admin_list_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    query: Result<Query<AdminListQuery>, QueryRejection>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return malformed_query(rejection),
    };
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(errors) => return validation_failure(&errors),
    };

    match service.list_applications(&filter) {
        Ok(applications) => Json(json!({
            "success": true,
            "data": applications,
            "status_options": ApplicationStatus::ALL,
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to fetch applications."),
    }
}

pub(crate) async fn admin_show_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Some(id) = parse_id(&application_id) else {
        return failure(StatusCode::NOT_FOUND, "Application not found.");
    };

    match service.get_application(ApplicationId(id)) {
        Ok(view) => Json(json!({
            "success": true,
            "data": view,
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to fetch application."),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    #[serde(default)]
    status: Option<String>,
}

pub(crate) async fn admin_status_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    Path(application_id): Path<String>,
    payload: Result<Json<StatusChange>, JsonRejection>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Some(id) = parse_id(&application_id) else {
        return failure(StatusCode::NOT_FOUND, "Application not found.");
    };
    let Json(change) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };
    let Some(status) = change.status else {
        return validation_failure(&FieldErrors::single(
            "status",
            format!(
                "The status field is required. Allowed values: {}",
                ApplicationStatus::allowed_labels()
            ),
        ));
    };

    match service.set_status(ApplicationId(id), &status) {
        Ok(application) => Json(json!({
            "success": true,
            "message": "Application status updated successfully!",
            "data": application,
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to update application status."),
    }
}

pub(crate) async fn admin_delete_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Some(id) = parse_id(&application_id) else {
        return failure(StatusCode::NOT_FOUND, "Application not found.");
    };

    match service.delete_application(ApplicationId(id)) {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Application deleted.",
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to delete application."),
    }
}

pub(crate) async fn admin_resend_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Some(id) = parse_id(&application_id) else {
        return failure(StatusCode::NOT_FOUND, "Application not found.");
    };

    match service.resend_confirmation(ApplicationId(id)).await {
        Ok(outcome) => Json(json!({
            "success": true,
            "confirmation": outcome,
        }))
        .into_response(),
        Err(err) => service_failure(err, "Failed to send confirmation email."),
    }
}

pub(crate) async fn admin_create_job_handler<A, J, N>(
    State(service): State<SharedService<A, J, N>>,
    payload: Result<Json<JobListingInput>, JsonRejection>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobListingRepository + 'static,
    N: NotificationSender + 'static,
{
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };
    let draft = match validate_job_listing(&input) {
        Ok(draft) => draft,
        Err(errors) => return validation_failure(&errors),
    };

    match service.create_job_listing(draft) {
        Ok(listing) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "data": listing,
            })),
        )
            .into_response(),
        Err(err) => service_failure(err, "Failed to create job listing."),
    }
}
