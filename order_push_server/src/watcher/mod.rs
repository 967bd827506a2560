//! # Order watcher
//!
//! Keeps track of registered users and polls the upstream order API on their behalf.
//!
//! * [`UserRegistry`] maps push tokens to credentials.
//! * [`PollScheduler`] owns one polling task per push token.
//! * [`check_orders`] is a single tick; [`watch_orders`] runs ticks on a timer.
//! * [`WatcherApi`] ties these together behind `register` and `unregister`.
mod api;
mod errors;
mod order_check;
mod registry;
mod scheduler;

pub use api::WatcherApi;
pub use errors::WatchError;
pub use order_check::{check_orders, short_token, watch_orders, TickOutcome, WatchContext};
pub use registry::{RegisteredUser, UserRegistry};
pub use scheduler::PollScheduler;
