use std::{sync::Arc, time::Duration};

use ghazaresan_tools::count_new_orders;
use log::*;
use tokio::{
    task::JoinSet,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::{
    traits::{OrderSource, PushNotifier},
    watcher::{errors::WatchError, registry::UserRegistry},
};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The push token is no longer in the registry. The polling task stops.
    NotRegistered,
    /// Login failed, so the tick was skipped. The next tick tries again.
    AuthenticationFailed(String),
    NoNewOrders,
    Notified { count: usize, message_id: String },
}

/// Everything a tick needs. Cheap to clone.
pub struct WatchContext<O, P> {
    pub registry: UserRegistry,
    pub source: Arc<O>,
    pub notifier: Arc<P>,
}

impl<O, P> Clone for WatchContext<O, P> {
    fn clone(&self) -> Self {
        Self { registry: self.registry.clone(), source: Arc::clone(&self.source), notifier: Arc::clone(&self.notifier) }
    }
}

/// Log-friendly prefix of a push token. Full tokens are long enough to drown out everything else on the line.
pub fn short_token(push_token: &str) -> &str {
    push_token.get(..12).unwrap_or(push_token)
}

/// Runs one tick for `push_token`: log in, fetch orders, and send a notification if any of them are new.
///
/// Every tick logs in afresh; authorization codes are not reused between ticks.
pub async fn check_orders<O, P>(push_token: &str, ctx: &WatchContext<O, P>) -> Result<TickOutcome, WatchError>
where
    O: OrderSource,
    P: PushNotifier,
{
    let Some(user) = ctx.registry.get(push_token).await else {
        return Ok(TickOutcome::NotRegistered);
    };
    let auth = ctx.source.authenticate(&user.username, user.password.reveal()).await;
    let Some(auth_token) = auth.token() else {
        return Ok(TickOutcome::AuthenticationFailed(auth.message().to_string()));
    };
    let orders = ctx.source.fetch_orders(auth_token).await?;
    let count = count_new_orders(&orders);
    trace!("🕰️ {} has {count} new orders out of {}", user.username, orders.len());
    if count == 0 {
        return Ok(TickOutcome::NoNewOrders);
    }
    // The user may have unregistered while the upstream calls were in flight
    if !ctx.registry.contains(push_token).await {
        return Ok(TickOutcome::NotRegistered);
    }
    let message_id = ctx.notifier.notify_new_orders(push_token, count).await?;
    Ok(TickOutcome::Notified { count, message_id })
}

/// The polling loop for one push token. The first tick fires one `period` after the call.
///
/// Each tick runs in its own task, so neither an error nor a panic in one tick stops the loop. Ticks never overlap:
/// if a tick overruns the period, the missed ticks are skipped. The loop ends once the token is no longer registered.
///
/// Dropping or aborting the returned future also aborts the tick that is running at the time.
pub async fn watch_orders<O, P>(push_token: String, period: Duration, ctx: WatchContext<O, P>)
where
    O: OrderSource + 'static,
    P: PushNotifier + 'static,
{
    let short = short_token(&push_token).to_string();
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!("🕰️ Order watcher for {short} started. Polling every {}s", period.as_secs_f32());
    loop {
        timer.tick().await;
        trace!("🕰️ Checking orders for {short}");
        let tick_ctx = ctx.clone();
        let token = push_token.clone();
        // The tick lives in a set owned by this loop, so aborting the loop aborts an in-flight tick too.
        let mut tick = JoinSet::new();
        tick.spawn(async move { check_orders(&token, &tick_ctx).await });
        let Some(result) = tick.join_next().await else {
            continue;
        };
        match result {
            Ok(Ok(TickOutcome::NotRegistered)) => {
                info!("🕰️ {short} is no longer registered. Stopping its order watcher.");
                break;
            },
            Ok(Ok(TickOutcome::AuthenticationFailed(msg))) => {
                warn!("🕰️ Authentication failed for {short}, skipping this check. {msg}");
            },
            Ok(Ok(TickOutcome::NoNewOrders)) => {
                debug!("🕰️ No new orders for {short}");
            },
            Ok(Ok(TickOutcome::Notified { count, message_id })) => {
                info!("🕰️ Notified {short} of {count} new orders. Message id: {message_id}");
            },
            Ok(Err(e)) => {
                error!("🕰️ Order check for {short} failed. {e}");
            },
            Err(e) if e.is_panic() => {
                error!("🕰️ Order check for {short} panicked. The watcher will try again next time. {e}");
            },
            Err(e) => {
                warn!("🕰️ Order check for {short} was cancelled. {e}");
            },
        }
    }
}
