//! Parcours domain logic.
//!
//! Pure domain types and rules shared by the database, API, events, and
//! worker crates: the curriculum schema, draft persistence, list filtering,
//! newsletter status rules, and the common error taxonomy. This crate has
//! no internal dependencies so it can be used from any layer.

pub mod curriculum;
pub mod day_state;
pub mod draft;
pub mod error;
pub mod export;
pub mod listing;
pub mod newsletter;
pub mod roles;
pub mod slug;
pub mod types;
