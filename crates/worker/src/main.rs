//! Newsletter confirmation mailer.
//!
//! Polls the `subscribers` table for pending rows whose confirmation email
//! has not been sent, generates a fresh confirmation token for each (only
//! the hash is stored), and delivers the double-opt-in email over SMTP.
//! When SMTP is not configured the worker idles instead of failing, so a
//! development stack without a mail relay still runs.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parcours_db::repositories::SubscriberRepo;
use parcours_db::DbPool;
use parcours_events::token::generate_confirmation_token;
use parcours_events::{EmailConfig, EmailDelivery};

/// How often the worker polls for pending confirmations.
const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// How many pending rows are processed per poll.
const BATCH_SIZE: i64 = 50;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parcours_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = parcours_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    let mailer = match EmailConfig::from_env() {
        Some(config) => Some(EmailDelivery::new(config)),
        None => {
            tracing::warn!("SMTP_HOST not set, confirmation emails will not be sent");
            None
        }
    };

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel_clone.cancel();
    });

    tracing::info!("Newsletter mailer started");
    run(pool, mailer, cancel).await;
    tracing::info!("Newsletter mailer stopped");
}

/// Poll loop. Exits when the cancellation token fires.
async fn run(pool: DbPool, mailer: Option<EmailDelivery>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Mailer cancelled");
                break;
            }
            _ = interval.tick() => {
                let Some(mailer) = &mailer else { continue };
                if let Err(e) = process_pending(&pool, mailer).await {
                    tracing::error!(error = %e, "Failed to process pending confirmations");
                }
            }
        }
    }
}

/// Send confirmation emails for all queued subscribers.
///
/// Each row is processed independently: a delivery failure is logged and
/// the row stays queued for the next poll (the stored token hash is simply
/// replaced on the retry).
async fn process_pending(pool: &DbPool, mailer: &EmailDelivery) -> Result<(), sqlx::Error> {
    let pending = SubscriberRepo::list_pending_unsent(pool, BATCH_SIZE).await?;
    if pending.is_empty() {
        return Ok(());
    }

    let mut sent = 0usize;
    for subscriber in &pending {
        let (token, token_hash) = generate_confirmation_token();
        SubscriberRepo::arm_confirmation(pool, subscriber.id, &token_hash).await?;

        match mailer
            .send_newsletter_confirmation(&subscriber.email, &token)
            .await
        {
            Ok(()) => {
                SubscriberRepo::mark_confirmation_sent(pool, subscriber.id).await?;
                sent += 1;
            }
            Err(e) => {
                tracing::error!(
                    subscriber_id = subscriber.id,
                    error = %e,
                    "Failed to send confirmation email"
                );
            }
        }
    }

    tracing::info!(sent, queued = pending.len(), "Processed confirmation batch");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
