//! Outbound email delivery
//!
//! Sends plain-text mail over SMTP. When no SMTP host is configured the
//! message is logged instead of sent, which keeps development environments
//! and tests free of a mail server.

use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;
use tracing::{info, warn};

/// SMTP configuration from the environment
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_from: String,
}

impl MailerConfig {
    /// Create a new MailerConfig from environment variables
    pub fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_pass: env::var("SMTP_PASS").ok(),
            smtp_from: env::var("SMTP_FROM").unwrap_or_else(|_| "noreply@example.com".to_string()),
        }
    }
}

/// Email sender
#[derive(Clone)]
pub struct Mailer {
    config: MailerConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    /// Build a mailer from configuration; without an SMTP host the mailer
    /// runs in log-only mode
    pub fn new(config: MailerConfig) -> Result<Self> {
        let transport = match &config.smtp_host {
            Some(host) => {
                let mut builder =
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?.port(config.smtp_port);
                if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                Some(builder.build())
            }
            None => None,
        };

        Ok(Self { config, transport })
    }

    /// Send a plain-text message
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let Some(transport) = &self.transport else {
            warn!("SMTP not configured - logging email instead of sending");
            info!(to = %to, subject = %subject, body = %body, "Email (not sent)");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.config.smtp_from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(message).await?;
        info!(to = %to, subject = %subject, "Email sent");

        Ok(())
    }
}
