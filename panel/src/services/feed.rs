//! Polling engine fanning metric snapshots out to viewer sessions
//!
//! One engine serves N independent subscriptions. Every subscription owns
//! its own timer task, so a missed or slow render by one viewer never
//! delays another's tick. Delivery within a tick is a single snapshot read;
//! no consistency is promised across subscriptions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use shared::logging::log_shutdown;
use shared::{panel_debug, Component, SubscriptionId};

use crate::error::{PanelError, PanelResult};
use crate::services::store::DEFAULT_WINDOW;
use crate::traits::{MetricsSource, ViewerSink};

/// Subscribable poller over a [`MetricsSource`]
pub struct MetricsFeed<S: MetricsSource + 'static> {
    source: Arc<S>,
    window: usize,
    subscriptions: Mutex<HashMap<SubscriptionId, JoinHandle<()>>>,
}

impl<S> MetricsFeed<S>
where
    S: MetricsSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self::with_window(source, DEFAULT_WINDOW)
    }

    pub fn with_window(source: Arc<S>, window: usize) -> Self {
        Self {
            source,
            window,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a viewer session polled at the given interval.
    ///
    /// The first snapshot is delivered immediately, then once per interval.
    /// A failed store read skips the tick and is retried at the next one;
    /// it never terminates the subscription.
    pub async fn subscribe<V>(&self, interval: Duration, mut sink: V) -> PanelResult<SubscriptionId>
    where
        V: ViewerSink + 'static,
    {
        if interval.is_zero() {
            return Err(PanelError::config("subscription interval must be positive"));
        }

        let id = SubscriptionId::new();
        let source = Arc::clone(&self.source);
        let window = self.window;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match source.latest(window).await {
                    Ok(rows) => sink.on_update(rows),
                    Err(err) => {
                        panel_debug!(Component::Feed, "Tick skipped for {}: {}", id, err);
                    }
                }
            }
        });

        self.subscriptions.lock().await.insert(id, task);
        panel_debug!(
            Component::Feed,
            "Viewer {} subscribed ({}ms interval)",
            id,
            interval.as_millis()
        );
        Ok(id)
    }

    /// Stop delivery for one viewer. Idempotent: unknown ids are a no-op.
    pub async fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(task) = self.subscriptions.lock().await.remove(&id) {
            task.abort();
            panel_debug!(Component::Feed, "Viewer {} unsubscribed", id);
        }
    }

    pub async fn active_subscriptions(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    /// Application close: cancel every subscription so no further tick fires.
    pub async fn shutdown(&self) {
        let mut subscriptions = self.subscriptions.lock().await;
        for (_, task) in subscriptions.drain() {
            task.abort();
        }
        log_shutdown(Component::Feed, "all viewer subscriptions cancelled");
    }
}
