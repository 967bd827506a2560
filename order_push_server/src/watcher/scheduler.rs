use std::{collections::HashMap, future::Future, sync::Arc};

use log::*;
use tokio::{sync::Mutex, task::JoinHandle};

/// Owns one long-running task per push token.
///
/// Installing a task for a token aborts whatever task was running for it before, so there is never more than one task
/// per token.
#[derive(Clone, Default)]
pub struct PollScheduler {
    tasks: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` for `push_token`, aborting the token's previous task, if any. Returns `true` if a previous task
    /// was replaced.
    pub async fn replace<F>(&self, push_token: &str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|_, handle| !handle.is_finished());
        let replaced = match tasks.remove(push_token) {
            Some(previous) => {
                previous.abort();
                true
            },
            None => false,
        };
        tasks.insert(push_token.to_string(), tokio::spawn(task));
        replaced
    }

    /// Aborts the task for `push_token`. Returns `false` if there was no task to cancel.
    pub async fn cancel(&self, push_token: &str) -> bool {
        match self.tasks.lock().await.remove(push_token) {
            Some(handle) => {
                handle.abort();
                true
            },
            None => false,
        }
    }

    pub async fn is_active(&self, push_token: &str) -> bool {
        self.tasks.lock().await.get(push_token).is_some_and(|h| !h.is_finished())
    }

    pub async fn active_count(&self) -> usize {
        self.tasks.lock().await.values().filter(|h| !h.is_finished()).count()
    }

    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        debug!("🕰️ Aborting {} polling tasks", tasks.len());
        tasks.drain().for_each(|(_, handle)| handle.abort());
    }
}
