//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod categories;
pub mod enrollments;
pub mod events;
pub mod exports;
pub mod me;
pub mod newsletter;
pub mod posts;
pub mod programs;
pub mod runner;
pub mod users;
