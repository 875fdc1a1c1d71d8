//! OTP delivery via SMTP.
//!
//! [`OtpMailer`] wraps the `lettre` async SMTP transport to send the login
//! code to the account's email address. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set, [`MailConfig::from_env`]
//! returns `None` and codes are not delivered.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@apna.local";

/// Configuration for the SMTP delivery service.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default               |
    /// |-----------------|----------|-----------------------|
    /// | `SMTP_HOST`     | yes      | --                    |
    /// | `SMTP_PORT`     | no       | `587`                 |
    /// | `SMTP_FROM`     | no       | `noreply@apna.local`  |
    /// | `SMTP_USER`     | no       | --                    |
    /// | `SMTP_PASSWORD` | no       | --                    |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Sends login codes by email.
#[derive(Debug)]
pub struct OtpMailer {
    config: MailConfig,
}

/// Build the plain-text message carrying a login code.
fn otp_message(from: &str, to: &str, code: &str, ttl_mins: i64) -> Result<Message, MailError> {
    let body = format!(
        "Your login code is {code}\n\nIt expires in {ttl_mins} minutes and can be used once.\n\
         If you did not request it, you can ignore this email."
    );

    Message::builder()
        .from(from.parse()?)
        .to(to.parse()?)
        .subject("Your login code")
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

impl OtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Email `code` to `to_email`.
    pub async fn send_otp(&self, to_email: &str, code: &str, ttl_mins: i64) -> Result<(), MailError> {
        let email = otp_message(&self.config.from_address, to_email, code, ttl_mins)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, "OTP email sent");
        Ok(())
    }
}
