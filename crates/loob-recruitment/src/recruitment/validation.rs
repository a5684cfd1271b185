use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::domain::{ApplicationInput, JobListingId, NewJobListing, StatusQuery};

lazy_static! {
    // local@domain.tld, no whitespace, single @
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .expect("email pattern compiles");
}

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_PHONE_LENGTH: usize = 20;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_POSITION_LENGTH: usize = 255;
pub const MAX_WORK_EXPERIENCE_LENGTH: usize = 1000;

/// Per-field validation messages, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// First message overall, used as the summary line of a 422 response.
    pub fn first_message(&self) -> Option<&str> {
        self.0
            .values()
            .flat_map(|messages| messages.iter())
            .map(String::as_str)
            .next()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields().collect::<Vec<_>>().join(", ");
        write!(f, "invalid fields: {fields}")
    }
}

/// Submission that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub position: String,
    pub work_experience: String,
    pub job_listing_id: JobListingId,
}

/// Contact identifier resolved from a status query. Phone wins when both are given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactLookup {
    Phone(String),
    Email(String),
}

pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_REGEX.is_match(candidate)
}

/// Trimmed value, with blank strings treated as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Shape of one raw JSON text field.
enum RawText<'a> {
    /// Missing, `null`, or blank after trimming.
    Absent,
    Text(&'a str),
    /// Any JSON type other than a string.
    NotText,
}

fn raw_text(value: &Option<Value>) -> RawText<'_> {
    match value {
        None | Some(Value::Null) => RawText::Absent,
        Some(Value::String(raw)) => match raw.trim() {
            "" => RawText::Absent,
            text => RawText::Text(text),
        },
        Some(_) => RawText::NotText,
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &Option<Value>,
    max: usize,
    missing: &str,
) -> Option<String> {
    match raw_text(value) {
        RawText::Absent => {
            errors.add(field, missing);
            None
        }
        RawText::NotText => {
            errors.add(field, not_text(field));
            None
        }
        RawText::Text(value) if value.chars().count() > max => {
            errors.add(field, too_long(field, max));
            None
        }
        RawText::Text(value) => Some(value.to_string()),
    }
}

fn not_text(field: &str) -> String {
    format!("The {} must be a string.", field.replace('_', " "))
}

fn too_long(field: &str, max: usize) -> String {
    format!(
        "The {} may not be greater than {max} characters.",
        field.replace('_', " ")
    )
}

fn listing_id(value: &Value) -> Option<JobListingId> {
    match value {
        Value::Number(number) => number.as_u64().map(JobListingId),
        Value::String(raw) => raw.trim().parse::<u64>().ok().map(JobListingId),
        _ => None,
    }
}

/// Check every submission rule, collecting all failures.
///
/// `listing_exists` is consulted only once `job_listing_id` is a well-formed integer.
pub fn validate_submission<F>(
    input: &ApplicationInput,
    mut listing_exists: F,
) -> Result<ValidatedSubmission, FieldErrors>
where
    F: FnMut(JobListingId) -> bool,
{
    let mut errors = FieldErrors::new();

    let full_name = required_text(
        &mut errors,
        "full_name",
        &input.full_name,
        MAX_NAME_LENGTH,
        "Full name is required",
    );
    let phone = required_text(
        &mut errors,
        "phone",
        &input.phone,
        MAX_PHONE_LENGTH,
        "Phone number is required",
    );
    let position = required_text(
        &mut errors,
        "position",
        &input.position,
        MAX_POSITION_LENGTH,
        "Position is required",
    );
    let work_experience = required_text(
        &mut errors,
        "work_experience",
        &input.work_experience,
        MAX_WORK_EXPERIENCE_LENGTH,
        "Work experience is required",
    );

    let email = match raw_text(&input.email) {
        RawText::Absent => None,
        RawText::Text(email) if email.chars().count() > MAX_EMAIL_LENGTH => {
            errors.add("email", too_long("email", MAX_EMAIL_LENGTH));
            None
        }
        RawText::Text(email) if is_valid_email(email) => Some(email.to_string()),
        RawText::Text(_) | RawText::NotText => {
            errors.add("email", "Please enter a valid email address");
            None
        }
    };

    let job_listing_id = match input.job_listing_id.as_ref() {
        None | Some(Value::Null) => {
            errors.add("job_listing_id", "Job listing is required");
            None
        }
        Some(Value::String(raw)) if raw.trim().is_empty() => {
            errors.add("job_listing_id", "Job listing is required");
            None
        }
        Some(raw) => match listing_id(raw) {
            None => {
                errors.add("job_listing_id", "The job listing id must be an integer.");
                None
            }
            Some(id) if !listing_exists(id) => {
                errors.add("job_listing_id", "Invalid job listing selected");
                None
            }
            Some(id) => Some(id),
        },
    };

    match (full_name, phone, position, work_experience, job_listing_id) {
        (
            Some(full_name),
            Some(phone),
            Some(position),
            Some(work_experience),
            Some(job_listing_id),
        ) if errors.is_empty() => Ok(ValidatedSubmission {
            full_name,
            phone,
            email,
            position,
            work_experience,
            job_listing_id,
        }),
        _ => Err(errors),
    }
}

/// Resolve which contact identifier a status query uses.
///
/// The email is only checked when it is the identifier actually used.
pub fn validate_status_query(query: &StatusQuery) -> Result<ContactLookup, FieldErrors> {
    match (present(&query.phone), present(&query.email)) {
        (Some(phone), _) => Ok(ContactLookup::Phone(phone.to_string())),
        (None, Some(email)) if is_valid_email(email) => {
            Ok(ContactLookup::Email(email.to_string()))
        }
        (None, Some(_)) => Err(FieldErrors::single(
            "email",
            "Please enter a valid email address",
        )),
        (None, None) => {
            let mut errors = FieldErrors::new();
            errors.add(
                "phone",
                "The phone field is required when email is not present.",
            );
            errors.add(
                "email",
                "The email field is required when phone is not present.",
            );
            Err(errors)
        }
    }
}

/// Raw listing payload from the administrative surface.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct JobListingInput {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
}

pub fn validate_job_listing(input: &JobListingInput) -> Result<NewJobListing, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = required_text(
        &mut errors,
        "title",
        &input.title,
        MAX_POSITION_LENGTH,
        "Title is required",
    );
    let location = required_text(
        &mut errors,
        "location",
        &input.location,
        MAX_NAME_LENGTH,
        "Location is required",
    );
    let description = required_text(
        &mut errors,
        "description",
        &input.description,
        usize::MAX,
        "Description is required",
    );

    match (title, location, description) {
        (Some(title), Some(location), Some(description)) if errors.is_empty() => {
            Ok(NewJobListing {
                title,
                location,
                description,
            })
        }
        _ => Err(errors),
    }
}
