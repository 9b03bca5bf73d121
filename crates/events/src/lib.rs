//! Parcours event bus and notification infrastructure.
//!
//! Building blocks for the platform-wide event system:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the canonical domain event envelope.
//! - [`EventPersistence`] -- background service that durably writes every
//!   event to the `events` table (the admin activity feed).
//! - [`delivery`] -- outbound email delivery (newsletter confirmations).

pub mod bus;
pub mod delivery;
pub mod persistence;
pub mod token;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use persistence::EventPersistence;
