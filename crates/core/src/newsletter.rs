//! Newsletter subscriber statuses and their allowed transitions.
//!
//! Statuses only move through explicit actions (confirmation link, the
//! unsubscribe endpoint, or an admin transition); there are no automatic
//! transitions or timers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a newsletter subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Pending,
    Confirmed,
    Unsubscribed,
    Bounced,
    Complained,
}

impl SubscriberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberStatus::Pending => "pending",
            SubscriberStatus::Confirmed => "confirmed",
            SubscriberStatus::Unsubscribed => "unsubscribed",
            SubscriberStatus::Bounced => "bounced",
            SubscriberStatus::Complained => "complained",
        }
    }

    /// Whether a transition from `self` to `to` is allowed.
    ///
    /// - `pending` can be confirmed or unsubscribed.
    /// - `confirmed` can unsubscribe, bounce, or complain.
    /// - `unsubscribed` can re-subscribe (back to pending).
    /// - `bounced` / `complained` can only be reset to pending by an admin.
    pub fn can_transition(&self, to: SubscriberStatus) -> bool {
        use SubscriberStatus::*;
        match (self, to) {
            (Pending, Confirmed) | (Pending, Unsubscribed) => true,
            (Confirmed, Unsubscribed) | (Confirmed, Bounced) | (Confirmed, Complained) => true,
            (Unsubscribed, Pending) => true,
            (Bounced, Pending) | (Complained, Pending) => true,
            _ => false,
        }
    }

    /// Validate a transition, returning a user-facing error when refused.
    pub fn transition(&self, to: SubscriberStatus) -> Result<SubscriberStatus, CoreError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(CoreError::Validation(format!(
                "Transition impossible : {} → {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}

impl fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriberStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubscriberStatus::Pending),
            "confirmed" => Ok(SubscriberStatus::Confirmed),
            "unsubscribed" => Ok(SubscriberStatus::Unsubscribed),
            "bounced" => Ok(SubscriberStatus::Bounced),
            "complained" => Ok(SubscriberStatus::Complained),
            other => Err(CoreError::Validation(format!(
                "Statut d'abonné inconnu : {other}"
            ))),
        }
    }
}
