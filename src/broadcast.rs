//! Message fan-out
//!
//! A `Broadcaster` delivers one posted message to a snapshot of recipients.
//! Every recipient gets its own task bounded by the callback timeout, so a
//! slow or unreachable member never holds up the others. Outcomes are
//! logged and counted; they are never reported back to the poster.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::DeliveryError;
use crate::notifier::Notifier;
use crate::types::{BroadcastId, RoomId};

/// One recipient of a broadcast, copied out of the room's membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub tag: String,
    pub callback_url: String,
}

/// Process-wide delivery counters
#[derive(Debug, Default)]
pub struct DeliveryStats {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of `DeliveryStats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub delivered: u64,
    pub failed: u64,
}

impl DeliveryStats {
    fn record(&self, outcome: &Result<(), DeliveryError>) {
        let counter = if outcome.is_ok() {
            &self.delivered
        } else {
            &self.failed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of one broadcast, by recipient tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub broadcast_id: BroadcastId,
    pub room_id: RoomId,
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

/// Handle to an in-flight broadcast
///
/// Dropping it (or calling `detach`) lets the broadcast finish in the
/// background.
#[derive(Debug)]
pub struct BroadcastHandle {
    id: BroadcastId,
    recipients: usize,
    task: JoinHandle<BroadcastReport>,
}

impl BroadcastHandle {
    pub fn id(&self) -> BroadcastId {
        self.id
    }

    /// Number of members the message is being delivered to
    pub fn recipient_count(&self) -> usize {
        self.recipients
    }

    /// Wait until every delivery has succeeded, failed or timed out
    pub async fn finished(self) -> Result<BroadcastReport, JoinError> {
        self.task.await
    }

    /// Let the broadcast complete without waiting for it
    pub fn detach(self) {
        debug!(
            "Broadcast {} detached with {} recipient(s)",
            self.id, self.recipients
        );
    }
}

/// Dispatches broadcasts through a `Notifier`
#[derive(Clone)]
pub struct Broadcaster {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    stats: Arc<DeliveryStats>,
}

impl Broadcaster {
    /// Create a broadcaster giving each recipient at most `timeout`
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            notifier,
            timeout,
            stats: Arc::new(DeliveryStats::default()),
        }
    }

    /// Cumulative delivery counters across all broadcasts
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Start delivering `message` to every recipient concurrently
    ///
    /// Returns immediately; the deliveries run as independent tasks.
    pub fn dispatch(
        &self,
        room_id: RoomId,
        recipients: Vec<Recipient>,
        message: &str,
    ) -> BroadcastHandle {
        let id = BroadcastId::new();
        let span = info_span!("broadcast", id = %id, room = %room_id);
        let message: Arc<str> = Arc::from(message);
        let count = recipients.len();

        let deliveries: Vec<_> = recipients
            .into_iter()
            .map(|recipient| {
                let task = self.spawn_delivery(&recipient, Arc::clone(&message), span.clone());
                (recipient.tag, task)
            })
            .collect();

        let stats = Arc::clone(&self.stats);
        let task = tokio::spawn(
            async move {
                let (tags, tasks): (Vec<String>, Vec<_>) = deliveries.into_iter().unzip();
                let outcomes = join_all(tasks).await;

                let mut report = BroadcastReport {
                    broadcast_id: id,
                    room_id,
                    delivered: Vec::new(),
                    failed: Vec::new(),
                };
                for (tag, outcome) in tags.into_iter().zip(outcomes) {
                    match outcome {
                        Ok(Ok(())) => report.delivered.push(tag),
                        Ok(Err(_)) => report.failed.push(tag),
                        Err(join_err) => {
                            // The delivery task died before recording its outcome
                            stats.record(&Err(DeliveryError::Aborted));
                            warn!("Delivery to {} aborted: {}", tag, join_err);
                            report.failed.push(tag);
                        }
                    }
                }

                info!(
                    "Broadcast finished: {} recipient(s), {} delivered, {} failed",
                    count,
                    report.delivered.len(),
                    report.failed.len()
                );
                report
            }
            .instrument(span),
        );

        BroadcastHandle {
            id,
            recipients: count,
            task,
        }
    }

    /// Spawn the task notifying a single recipient
    fn spawn_delivery(
        &self,
        recipient: &Recipient,
        message: Arc<str>,
        span: tracing::Span,
    ) -> JoinHandle<Result<(), DeliveryError>> {
        let notifier = Arc::clone(&self.notifier);
        let stats = Arc::clone(&self.stats);
        let timeout = self.timeout;
        let Recipient { tag, callback_url } = recipient.clone();

        tokio::spawn(
            async move {
                let outcome =
                    match tokio::time::timeout(timeout, notifier.notify(&callback_url, &message))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(DeliveryError::Timeout(timeout)),
                    };

                stats.record(&outcome);
                match &outcome {
                    Ok(()) => debug!("Delivered to {} at {}", tag, callback_url),
                    Err(e) => warn!("Delivery to {} at {} failed: {}", tag, callback_url, e),
                }
                outcome
            }
            .instrument(span),
        )
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("timeout", &self.timeout)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
