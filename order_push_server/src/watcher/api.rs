use std::{sync::Arc, time::Duration};

use log::*;
use opn_common::Secret;
use tokio::sync::Mutex;

use crate::{
    traits::{OrderSource, PushNotifier},
    watcher::{
        errors::WatchError,
        order_check::{short_token, watch_orders, WatchContext},
        registry::{RegisteredUser, UserRegistry},
        scheduler::PollScheduler,
    },
};

pub struct WatcherApi<O, P> {
    ctx: WatchContext<O, P>,
    scheduler: PollScheduler,
    poll_interval: Duration,
    // Serializes registry + scheduler updates so that the two never disagree about a token.
    membership: Arc<Mutex<()>>,
}

impl<O, P> Clone for WatcherApi<O, P> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            scheduler: self.scheduler.clone(),
            poll_interval: self.poll_interval,
            membership: Arc::clone(&self.membership),
        }
    }
}

impl<O, P> WatcherApi<O, P>
where
    O: OrderSource + 'static,
    P: PushNotifier + 'static,
{
    pub fn new(source: O, notifier: P, poll_interval: Duration) -> Self {
        let ctx = WatchContext { registry: UserRegistry::new(), source: Arc::new(source), notifier: Arc::new(notifier) };
        Self { ctx, scheduler: PollScheduler::new(), poll_interval, membership: Arc::new(Mutex::new(())) }
    }

    pub fn registry(&self) -> &UserRegistry {
        &self.ctx.registry
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Checks the credentials against the upstream API and, if they are accepted, starts watching orders for
    /// `push_token`.
    ///
    /// Registering a token that is already registered replaces the stored credentials and restarts its polling task.
    /// Returns `true` in that case.
    pub async fn register(
        &self,
        push_token: &str,
        username: &str,
        password: Secret<String>,
    ) -> Result<bool, WatchError> {
        let short = short_token(push_token);
        debug!("🕰️ Validating credentials of {username} for {short}");
        let source = Arc::clone(&self.ctx.source);
        let (name, secret) = (username.to_string(), password.clone());
        let check = tokio::spawn(async move { source.authenticate(&name, secret.reveal()).await });
        let auth = check.await.map_err(|e| {
            error!("🕰️ Credential check of {username} for {short} did not complete. {e}");
            WatchError::CheckAborted(e.to_string())
        })?;
        if !auth.success {
            info!("🕰️ Registration of {username} for {short} was refused. {}", auth.message());
            return Err(WatchError::InvalidCredentials(auth.message().to_string()));
        }
        let _guard = self.membership.lock().await;
        self.ctx.registry.insert(push_token, RegisteredUser::new(username, password)).await;
        let task = watch_orders(push_token.to_string(), self.poll_interval, self.ctx.clone());
        let replaced = self.scheduler.replace(push_token, task).await;
        if replaced {
            info!("🕰️ Re-registered {username} for {short}. The previous watcher was stopped.");
        } else {
            info!("🕰️ Registered {username} for {short}");
        }
        Ok(replaced)
    }

    /// Stops watching orders for `push_token`. Returns `false` if the token was not registered, which is not an error.
    pub async fn unregister(&self, push_token: &str) -> bool {
        let _guard = self.membership.lock().await;
        let cancelled = self.scheduler.cancel(push_token).await;
        let removed = self.ctx.registry.remove(push_token).await;
        let short = short_token(push_token);
        match &removed {
            Some(user) => info!("🕰️ Unregistered {} from {short}", user.username),
            None => debug!("🕰️ Ignoring unregister request for unknown token {short}"),
        }
        cancelled || removed.is_some()
    }

    pub async fn get(&self, push_token: &str) -> Option<RegisteredUser> {
        self.ctx.registry.get(push_token).await
    }

    pub async fn is_watching(&self, push_token: &str) -> bool {
        self.scheduler.is_active(push_token).await
    }

    pub async fn watched_count(&self) -> usize {
        self.scheduler.active_count().await
    }

    /// Stops every polling task. Registered users stay in the registry.
    pub async fn shutdown(&self) {
        let _guard = self.membership.lock().await;
        self.scheduler.shutdown().await;
        info!("🕰️ All order watchers stopped");
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ghazaresan_tools::{AuthResult, GhazaresanApiError, Order};

    use super::*;
    use crate::test_utils::mocks::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn password() -> Secret<String> {
        Secret::new("pa55".to_string())
    }

    #[tokio::test]
    async fn register_starts_one_watcher() {
        let api = WatcherApi::new(accepting_upstream(), silent_pusher(), HOUR);
        assert!(!api.register("device-1", "kebab_house", password()).await.unwrap());
        assert!(api.is_watching("device-1").await);
        assert_eq!(api.watched_count().await, 1);
        let user = api.get("device-1").await.expect("user should be registered");
        assert_eq!(user.username, "kebab_house");
        assert_eq!(user.password.reveal(), "pa55");
    }

    #[tokio::test]
    async fn registering_twice_keeps_a_single_watcher() {
        let api = WatcherApi::new(accepting_upstream(), silent_pusher(), HOUR);
        assert!(!api.register("device-1", "kebab_house", password()).await.unwrap());
        assert!(api.register("device-1", "pizza_place", password()).await.unwrap());
        assert_eq!(api.watched_count().await, 1);
        assert_eq!(api.registry().len().await, 1);
        assert_eq!(api.get("device-1").await.unwrap().username, "pizza_place");
    }

    #[tokio::test]
    async fn rejected_credentials_are_not_registered() {
        let api = WatcherApi::new(rejecting_upstream(), silent_pusher(), HOUR);
        let err = api.register("device-1", "kebab_house", password()).await.unwrap_err();
        assert!(matches!(err, WatchError::InvalidCredentials(_)), "was: {err}");
        assert!(api.get("device-1").await.is_none());
        assert_eq!(api.watched_count().await, 0);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let api = WatcherApi::new(accepting_upstream(), silent_pusher(), HOUR);
        assert!(!api.unregister("device-1").await);
        api.register("device-1", "kebab_house", password()).await.unwrap();
        assert!(api.unregister("device-1").await);
        assert!(!api.is_watching("device-1").await);
        assert!(api.registry().is_empty().await);
        assert!(!api.unregister("device-1").await);
    }

    #[tokio::test]
    async fn shutdown_stops_watchers_but_keeps_users() {
        let api = WatcherApi::new(accepting_upstream(), silent_pusher(), HOUR);
        api.register("device-1", "kebab_house", password()).await.unwrap();
        api.register("device-2", "pizza_place", password()).await.unwrap();
        api.shutdown().await;
        assert_eq!(api.watched_count().await, 0);
        assert_eq!(api.registry().len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn re_registration_does_not_double_notifications() {
        let logins = Arc::new(AtomicUsize::new(0));
        let mut upstream = MockUpstream::new();
        let counter = Arc::clone(&logins);
        upstream.expect_authenticate().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            auth_ok("T1")
        });
        upstream.expect_fetch_orders().returning(|_| Ok(orders_with_status(&[0])));
        let notifications = Arc::new(AtomicUsize::new(0));
        let mut pusher = MockPusher::new();
        let counter = Arc::clone(&notifications);
        pusher.expect_notify_new_orders().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("projects/p/messages/1".to_string())
        });
        let api = WatcherApi::new(upstream, pusher, Duration::from_secs(30));
        api.register("device-1", "kebab_house", password()).await.unwrap();
        api.register("device-1", "kebab_house", password()).await.unwrap();
        // Both registrations log in once. After that, one watcher ticks at 30s and 60s.
        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
        assert_eq!(logins.load(Ordering::SeqCst), 4);
        api.shutdown().await;
    }

    /// Counts fetches that are in flight. The count drops when a fetch finishes or is cancelled.
    #[derive(Clone, Default)]
    struct FetchGauge {
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    struct InFlight(Arc<AtomicUsize>);

    impl Drop for InFlight {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// An upstream whose orders endpoint takes longer to answer than the poll interval.
    struct SlowUpstream {
        gauge: FetchGauge,
        delay: Duration,
    }

    #[async_trait]
    impl OrderSource for SlowUpstream {
        async fn authenticate(&self, _username: &str, _password: &str) -> AuthResult {
            auth_ok("T1")
        }

        async fn fetch_orders(&self, _auth_token: &str) -> Result<Vec<Order>, GhazaresanApiError> {
            let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);
            let _in_flight = InFlight(Arc::clone(&self.gauge.current));
            tokio::time::sleep(self.delay).await;
            Ok(vec![])
        }
    }

    fn slow_api(gauge: &FetchGauge) -> WatcherApi<SlowUpstream, MockPusher> {
        let upstream = SlowUpstream { gauge: gauge.clone(), delay: Duration::from_secs(45) };
        WatcherApi::new(upstream, silent_pusher(), Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn re_registration_cancels_the_in_flight_tick() {
        let gauge = FetchGauge::default();
        let api = slow_api(&gauge);
        api.register("device-1", "kebab_house", password()).await.unwrap();
        // The first tick starts fetching at 30s and would not finish before 75s
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(gauge.current.load(Ordering::SeqCst), 1);
        api.register("device-1", "kebab_house", password()).await.unwrap();
        // The new watcher's first tick starts at 61s
        tokio::time::sleep(Duration::from_secs(32)).await;
        assert_eq!(gauge.current.load(Ordering::SeqCst), 1);
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1, "ticks of one token must never overlap");
        api.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_in_flight_ticks() {
        let gauge = FetchGauge::default();
        let api = slow_api(&gauge);
        api.register("device-1", "kebab_house", password()).await.unwrap();
        api.register("device-2", "pizza_place", password()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(gauge.current.load(Ordering::SeqCst), 2);
        api.shutdown().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(gauge.current.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_cancels_the_in_flight_tick() {
        let gauge = FetchGauge::default();
        let api = slow_api(&gauge);
        api.register("device-1", "kebab_house", password()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(gauge.current.load(Ordering::SeqCst), 1);
        assert!(api.unregister("device-1").await);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(gauge.current.load(Ordering::SeqCst), 0);
    }

    /// An upstream that blows up while checking credentials.
    struct PanickingUpstream;

    #[async_trait]
    impl OrderSource for PanickingUpstream {
        async fn authenticate(&self, _username: &str, _password: &str) -> AuthResult {
            panic!("login response had an unexpected shape")
        }

        async fn fetch_orders(&self, _auth_token: &str) -> Result<Vec<Order>, GhazaresanApiError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn aborted_credential_checks_are_not_registered() {
        let api = WatcherApi::new(PanickingUpstream, silent_pusher(), HOUR);
        let err = api.register("device-1", "kebab_house", password()).await.unwrap_err();
        assert!(matches!(err, WatchError::CheckAborted(_)), "was: {err}");
        assert!(api.get("device-1").await.is_none());
        assert_eq!(api.watched_count().await, 0);
    }
}
