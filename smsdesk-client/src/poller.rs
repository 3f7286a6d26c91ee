//! Notification polling
//!
//! The bell widget needs a periodically refreshed snapshot of the user's
//! notifications. A naive interval timer can overlap in-flight requests and
//! deliver stale updates after teardown, so the poller is a cancellable
//! scheduled task instead:
//!
//! - one fetch at a time — a tick that fires while a fetch is still running
//!   is skipped, not queued;
//! - an explicit stop handle — after [`PollerHandle::stop`] no further
//!   snapshot is published, and a response arriving mid-shutdown is
//!   discarded;
//! - snapshots are published through a `watch` channel so consumers always
//!   see the latest state without buffering.
//!
//! Collapsing the bell panel acknowledges every currently-unread
//! notification: the mark-read calls fire concurrently and are awaited
//! together; individual failures are logged and not retried, then the feed
//! is refetched once.

use crate::api::ApiClient;
use crate::auth::Session;
use crate::error::Result;
use crate::models::Notification;
use futures::future::join_all;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed tick interval between fetches
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The latest notification state, as shown on the bell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BellSnapshot {
    pub notifications: Vec<Notification>,
}

impl BellSnapshot {
    pub fn unread(&self) -> Vec<&Notification> {
        self.notifications.iter().filter(|n| !n.is_read).collect()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }
}

/// Fetch one snapshot of the notification feed
pub async fn poll_once(client: &ApiClient, session: &Session) -> Result<BellSnapshot> {
    let notifications = client.notifications(session).await?;
    debug!(
        total = notifications.len(),
        unread = notifications.iter().filter(|n| !n.is_read).count(),
        "fetched notifications"
    );
    Ok(BellSnapshot { notifications })
}

/// Acknowledge the given notification ids, then refetch
///
/// Issues one mark-read call per id, all concurrently, and waits for every
/// one of them; the whole collapse costs exactly N mark-reads plus one
/// refetch. A failed acknowledgement is logged and left for the next
/// collapse; it does not abort the others. Returns the refreshed snapshot.
pub async fn acknowledge_ids(
    client: &ApiClient,
    session: &Session,
    ids: &[String],
) -> Result<BellSnapshot> {
    if !ids.is_empty() {
        info!(count = ids.len(), "acknowledging unread notifications");
        let results = join_all(
            ids.iter()
                .map(|id| client.mark_notification_read(session, id)),
        )
        .await;
        for (id, result) in ids.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    notification_id = %id,
                    error = %e,
                    "failed to mark notification as read"
                );
            }
        }
    }
    poll_once(client, session).await
}

/// Acknowledge everything unread in an already-fetched snapshot
pub async fn acknowledge_unread(
    client: &ApiClient,
    session: &Session,
    snapshot: &BellSnapshot,
) -> Result<BellSnapshot> {
    let ids: Vec<String> = snapshot
        .unread()
        .iter()
        .map(|n| n.notification_id.clone())
        .collect();
    acknowledge_ids(client, session, &ids).await
}

/// Handle to a running notification poller
///
/// Dropping the handle stops the task as well; `stop` does it explicitly
/// and waits for the task to wind down.
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    snapshot_rx: watch::Receiver<BellSnapshot>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// The most recently published snapshot
    pub fn snapshot(&self) -> BellSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<BellSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stop the poller and wait for the task to finish
    ///
    /// No snapshot is published after this returns.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

/// Fixed-interval notification poller
pub struct NotificationPoller;

impl NotificationPoller {
    /// Spawn the polling task; the first fetch happens immediately
    pub fn spawn(client: ApiClient, session: Session, config: PollerConfig) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (snapshot_tx, snapshot_rx) = watch::channel(BellSnapshot::default());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            // A fetch slower than the interval skips ticks instead of
            // stacking overlapping requests.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => {
                        debug!("notification poller stopped");
                        return;
                    }
                }

                // The fetch itself also races against stop so a response
                // arriving mid-shutdown is discarded, not published.
                let fetched = tokio::select! {
                    result = poll_once(&client, &session) => result,
                    _ = stop_rx.changed() => {
                        debug!("notification poller stopped mid-fetch");
                        return;
                    }
                };

                match fetched {
                    Ok(snapshot) => {
                        if snapshot_tx.send(snapshot).is_err() {
                            // No receivers left.
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "notification poll failed");
                    }
                }
            }
        });

        PollerHandle {
            stop_tx,
            snapshot_rx,
            task,
        }
    }
}
