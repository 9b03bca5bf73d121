//! Email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the
//! platform's transactional emails (newsletter confirmation, unsubscribe
//! receipt). Configuration is loaded from environment variables; if
//! `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and no
//! mailer should be constructed.

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
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

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "no-reply@parcours.local";

/// Default public base URL used in confirmation links.
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Public base URL embedded in confirmation links.
    pub public_base_url: String,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable          | Required | Default                    |
    /// |-------------------|----------|----------------------------|
    /// | `SMTP_HOST`       | yes      | --                         |
    /// | `SMTP_PORT`       | no       | `587`                      |
    /// | `SMTP_FROM`       | no       | `no-reply@parcours.local`  |
    /// | `SMTP_USER`       | no       | --                         |
    /// | `SMTP_PASSWORD`   | no       | --                         |
    /// | `PUBLIC_BASE_URL` | no       | `http://localhost:3000`    |
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
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()),
        })
    }

    /// The confirmation link embedded in the opt-in email.
    pub fn confirmation_url(&self, token: &str) -> String {
        format!(
            "{}/api/v1/newsletter/confirm?token={token}",
            self.public_base_url
        )
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends transactional emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send the newsletter double-opt-in confirmation email.
    ///
    /// `token` is the plaintext confirmation token; only its hash is stored
    /// server-side.
    pub async fn send_newsletter_confirmation(
        &self,
        to_email: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let body = format!(
            "Bonjour,\n\n\
             Merci de votre inscription à la newsletter Parcours.\n\
             Pour confirmer votre adresse, cliquez sur le lien suivant :\n\n\
             {}\n\n\
             Si vous n'êtes pas à l'origine de cette demande, ignorez ce message.\n",
            self.config.confirmation_url(token)
        );
        self.send(to_email, "Confirmez votre inscription ✉️", body)
            .await
    }

    /// Send a plain-text email to a single recipient.
    async fn send(&self, to_email: &str, subject: &str, body: String) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
