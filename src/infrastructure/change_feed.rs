//! In-process change notifications.
//!
//! Writes to `urls` and `url_analytics` publish a [`Change`] on a broadcast
//! channel. Dashboards either subscribe for push refresh or poll the
//! revision counter. Nothing depends on delivery for correctness: publishing
//! with no subscribers, or to lagging ones, silently drops messages.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Default buffer per subscriber before it starts lagging.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Urls,
    UrlAnalytics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub revision: u64,
    pub table: Table,
    pub kind: ChangeKind,
    pub record_id: i64,
}

/// Broadcast channel plus a revision counter bumped on every publish.
pub struct ChangeFeed {
    sender: broadcast::Sender<Change>,
    revision: AtomicU64,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            revision: AtomicU64::new(0),
        }
    }

    /// Publishes a change and returns its revision.
    pub fn publish(&self, table: Table, kind: ChangeKind, record_id: i64) -> u64 {
        let revision = self.revision.fetch_add(1, Ordering::AcqRel) + 1;

        let change = Change {
            revision,
            table,
            kind,
            record_id,
        };

        if self.sender.send(change).is_err() {
            tracing::trace!(revision, "No change feed subscribers");
        }

        revision
    }

    /// Subscribes to changes published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.sender.subscribe()
    }

    /// Latest published revision, `0` before the first write.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Logs every change at debug level until the feed is dropped.
pub async fn log_changes(mut receiver: broadcast::Receiver<Change>) {
    loop {
        match receiver.recv().await {
            Ok(change) => tracing::debug!(
                revision = change.revision,
                table = ?change.table,
                kind = ?change.kind,
                record_id = change.record_id,
                "Store change"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Change log subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_still_bumps_revision() {
        let feed = ChangeFeed::new();
        assert_eq!(feed.revision(), 0);

        assert_eq!(feed.publish(Table::Urls, ChangeKind::Insert, 1), 1);
        assert_eq!(feed.publish(Table::Urls, ChangeKind::Delete, 1), 2);
        assert_eq!(feed.revision(), 2);
    }

    #[tokio::test]
    async fn test_subscriber_receives_changes_in_order() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.publish(Table::Urls, ChangeKind::Update, 5);
        feed.publish(Table::UrlAnalytics, ChangeKind::Insert, 9);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.table, Table::Urls);
        assert_eq!(first.kind, ChangeKind::Update);
        assert_eq!(first.record_id, 5);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.table, Table::UrlAnalytics);
        assert_eq!(second.revision, 2);
    }

    #[test]
    fn test_change_serializes_snake_case() {
        let change = Change {
            revision: 3,
            table: Table::UrlAnalytics,
            kind: ChangeKind::Insert,
            record_id: 1,
        };

        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["table"], "url_analytics");
        assert_eq!(value["kind"], "insert");
    }

    #[tokio::test]
    async fn test_log_changes_stops_when_feed_dropped() {
        let feed = ChangeFeed::new();
        let handle = tokio::spawn(log_changes(feed.subscribe()));
        assert_eq!(feed.subscriber_count(), 1);

        feed.publish(Table::Urls, ChangeKind::Insert, 1);
        drop(feed);

        handle.await.unwrap();
    }
}
