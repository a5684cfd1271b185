use std::sync::Arc;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use super::domain::Application;
use crate::config::{MailConfig, MailTransport, SmtpEncryption, SmtpSettings};

/// Layout of the submission timestamp inside the confirmation body.
pub const CONFIRMATION_TIMESTAMP_FORMAT: &str = "%B %-d, %Y at %-I:%M %p";

/// Capability for delivering a rendered message to one recipient.
///
/// Implementations may block; callers run them on the blocking pool.
pub trait NotificationSender: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DispatchError>;
}

/// Notification transport failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid mail address '{0}'")]
    InvalidAddress(String),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
    #[error("mail dispatch timed out after {0:?}")]
    TimedOut(Duration),
    #[error("mail dispatch interrupted: {0}")]
    Interrupted(String),
}

/// Confirmation sent to an applicant after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl ConfirmationEmail {
    /// Render the confirmation for `application`. `None` when it carries no email.
    pub fn for_application(application: &Application, app_name: &str) -> Option<Self> {
        let recipient = application
            .email
            .as_deref()
            .filter(|email| !email.is_empty())?;

        Some(Self {
            recipient: recipient.to_string(),
            subject: confirmation_subject(&application.position),
            body: confirmation_body(application, app_name),
        })
    }
}

pub fn confirmation_subject(position: &str) -> String {
    format!("Application Confirmation - {position}")
}

fn confirmation_body(application: &Application, app_name: &str) -> String {
    let submitted = application
        .created_at
        .format(CONFIRMATION_TIMESTAMP_FORMAT);

    format!(
        "Application Received\n\
         \n\
         Dear {name},\n\
         \n\
         Thank you for your interest in the {position} position at {app_name}. \
         We have successfully received your application and will review it carefully.\n\
         \n\
         Application Details:\n\
         - Position: {position}\n\
         - Application ID: {id}\n\
         - Submitted: {submitted}\n\
         \n\
         Our recruitment team will review your application and contact you within \
         5-7 business days if your profile matches our requirements.\n\
         \n\
         You can check your application status anytime using your phone number or \
         email address through our mobile app.\n\
         \n\
         Thanks,\n\
         {app_name} Recruitment Team\n",
        name = application.full_name,
        position = application.position,
        id = application.id,
    )
}

/// Deliver `message` through `sender` on the blocking pool, giving up after `limit`.
///
/// A timeout is reported as [`DispatchError::TimedOut`]; the blocking send is left to
/// finish on its own.
pub async fn dispatch<N>(
    sender: Arc<N>,
    message: ConfirmationEmail,
    limit: Duration,
) -> Result<(), DispatchError>
where
    N: NotificationSender + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        sender.send(&message.recipient, &message.subject, &message.body)
    });

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(DispatchError::Interrupted(join_error.to_string())),
        Err(_) => Err(DispatchError::TimedOut(limit)),
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone)]
pub struct LogNotificationSender {
    from: String,
}

impl LogNotificationSender {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl NotificationSender for LogNotificationSender {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        info!(from = %self.from, to = %recipient, %subject, "mail (log transport)");
        debug!("{body}");
        Ok(())
    }
}

/// Blocking SMTP delivery backed by lettre.
#[derive(Clone)]
pub struct SmtpNotificationSender {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotificationSender {
    pub fn new(settings: &SmtpSettings, from: Mailbox, timeout: Duration) -> Result<Self, DispatchError> {
        let builder = match settings.encryption {
            SmtpEncryption::Tls => SmtpTransport::relay(&settings.host)
                .map_err(|err| DispatchError::Transport(err.to_string()))?,
            SmtpEncryption::StartTls => SmtpTransport::starttls_relay(&settings.host)
                .map_err(|err| DispatchError::Transport(err.to_string()))?,
            SmtpEncryption::None => SmtpTransport::builder_dangerous(&settings.host),
        };

        let mut builder = builder.port(settings.port).timeout(Some(timeout));
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl NotificationSender for SmtpNotificationSender {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| DispatchError::InvalidAddress(recipient.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|err| DispatchError::Transport(err.to_string()))?;

        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|err| DispatchError::Transport(err.to_string()))
    }
}

/// Sender selected by [`MailConfig::transport`].
#[derive(Clone)]
pub enum Mailer {
    Log(LogNotificationSender),
    Smtp(SmtpNotificationSender),
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, DispatchError> {
        let from_label = format!("{} <{}>", config.from_name, config.from_address);
        match &config.transport {
            MailTransport::Log => Ok(Self::Log(LogNotificationSender::new(from_label))),
            MailTransport::Smtp(settings) => {
                let from: Mailbox = from_label
                    .parse()
                    .map_err(|_| DispatchError::InvalidAddress(config.from_address.clone()))?;
                Ok(Self::Smtp(SmtpNotificationSender::new(
                    settings,
                    from,
                    config.timeout,
                )?))
            }
        }
    }

    pub fn transport_name(&self) -> &'static str {
        match self {
            Mailer::Log(_) => "log",
            Mailer::Smtp(_) => "smtp",
        }
    }
}

impl NotificationSender for Mailer {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        match self {
            Mailer::Log(sender) => sender.send(recipient, subject, body),
            Mailer::Smtp(sender) => sender.send(recipient, subject, body),
        }
    }
}
