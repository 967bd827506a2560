//! # Order push notifier
//!
//! Watches the Ghazaresan order API on behalf of registered users and sends a Firebase push notification to each
//! user's device whenever orders in the "new" state are waiting.
//!
//! Registrations live in memory only. Each one owns a polling task that logs in with the stored credentials, fetches
//! the current order list and counts the new orders. See [watcher](watcher/index.html) for the details.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/` and `/health`: Health check.
//! * `/register`: Start watching orders for a user and device.
//! * `/unregister`: Stop watching orders for a device.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod traits;
pub mod watcher;

#[cfg(test)]
mod endpoint_tests;
#[cfg(test)]
mod test_utils;
