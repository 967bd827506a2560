//! Client for the Ghazaresan restaurant order API.
//!
//! The API is not public. Every call must carry the portal's shared `securitykey` header along with the portal's
//! `Origin` and `Referer`, otherwise requests are rejected. A session starts with a username/password exchange for a
//! short-lived authorization code, which is then attached to the orders query.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::GhazaresanApi;
pub use config::GhazaresanConfig;
pub use data_objects::{count_new_orders, AuthResult, Order, NEW_ORDER_STATUS};
pub use error::GhazaresanApiError;
