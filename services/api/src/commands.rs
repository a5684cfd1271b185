use crate::infra::{build_service, seed_listings};
use chrono::Utc;
use clap::Args;
use loob_recruitment::config::{AppConfig, DeliveryPolicy, MailTransport};
use loob_recruitment::error::AppError;
use loob_recruitment::recruitment::{
    ApplicationInput, ConfirmationOutcome, InMemoryJobListingRepository, JobListing,
    JobListingRepository, ServiceError,
};
use loob_recruitment::telemetry;
use serde_json::Value;

#[derive(Args, Debug)]
pub(crate) struct SendTestEmailArgs {
    /// Recipient of the test confirmation
    pub(crate) address: String,
    /// Position recorded on the throwaway application (defaults to the first listing title)
    #[arg(long)]
    pub(crate) position: Option<String>,
}

pub(crate) async fn run_send_test_email(args: SendTestEmailArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    // The throwaway application needs a listing to reference, and failures must surface.
    config.seed_listings = true;
    config.mail.delivery = DeliveryPolicy::Strict;

    let service = build_service(&config)?;
    let listing = service
        .list_job_listings()?
        .into_iter()
        .next()
        .ok_or(ServiceError::NotFound("Job listing not found."))?;

    let input = test_application(&args, &listing);
    println!(
        "Sending test confirmation to {} through the {} transport",
        args.address,
        transport_label(&config)
    );

    let receipt = service.submit(input).await?;
    match receipt.confirmation {
        ConfirmationOutcome::Sent => println!(
            "Confirmation sent for application #{} ({})",
            receipt.application.id, receipt.application.position
        ),
        ConfirmationOutcome::Skipped => println!("No recipient address; nothing sent"),
        ConfirmationOutcome::Failed => println!("Confirmation could not be delivered"),
    }
    Ok(())
}

fn test_application(args: &SendTestEmailArgs, listing: &JobListing) -> ApplicationInput {
    ApplicationInput {
        full_name: Some(Value::from("Test Applicant")),
        phone: Some(Value::from("+60123456789")),
        email: Some(Value::from(args.address.as_str())),
        position: Some(Value::from(
            args.position.as_deref().unwrap_or(listing.title.as_str()),
        )),
        work_experience: Some(Value::from("Mail transport check.")),
        job_listing_id: Some(Value::from(listing.id.0)),
    }
}

fn transport_label(config: &AppConfig) -> &'static str {
    match config.mail.transport {
        MailTransport::Log => "log",
        MailTransport::Smtp(_) => "smtp",
    }
}

pub(crate) fn run_listings() -> Result<(), AppError> {
    let listings = InMemoryJobListingRepository::default();
    seed_listings(&listings, Utc::now()).map_err(ServiceError::from)?;

    let catalogue = listings.list().map_err(ServiceError::from)?;
    println!("Job listing catalogue ({} listings)", catalogue.len());
    for listing in &catalogue {
        println!("  #{} {} [{}]", listing.id, listing.title, listing.location);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loob_recruitment::recruitment::JobListingId;
    use serde_json::json;

    fn listing() -> JobListing {
        let at = Utc::now();
        JobListing {
            id: JobListingId(3),
            title: "Digital Marketing Executive".to_string(),
            location: "Kota Damansara, Selangor".to_string(),
            description: "Drive digital marketing initiatives.".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_application_targets_the_listing() {
        let args = SendTestEmailArgs {
            address: "recruiter@loob.example".to_string(),
            position: None,
        };

        let input = test_application(&args, &listing());
        assert_eq!(input.email, Some(json!("recruiter@loob.example")));
        assert_eq!(input.position, Some(json!("Digital Marketing Executive")));
        assert_eq!(input.job_listing_id, Some(json!(3)));
    }

    #[test]
    fn position_override_is_kept() {
        let args = SendTestEmailArgs {
            address: "recruiter@loob.example".to_string(),
            position: Some("Barista".to_string()),
        };

        let input = test_application(&args, &listing());
        assert_eq!(input.position, Some(json!("Barista")));
    }
}
