//! In-memory notifier that records deliveries for inspection.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::task::ports::{NotificationError, StatusChangeNotification, StatusChangeNotifier};

/// Notifier that keeps every delivered notification in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<StatusChangeNotification>>>,
}

impl RecordingNotifier {
    /// Creates a notifier with no recorded deliveries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the notifications delivered so far.
    ///
    /// A poisoned lock yields the data recorded before the poisoning.
    #[must_use]
    pub fn delivered(&self) -> Vec<StatusChangeNotification> {
        self.delivered
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |guard| guard.clone())
    }
}

#[async_trait]
impl StatusChangeNotifier for RecordingNotifier {
    async fn notify(
        &self,
        notification: &StatusChangeNotification,
    ) -> Result<(), NotificationError> {
        let mut delivered = self.delivered.lock().map_err(|err| {
            NotificationError::delivery(std::io::Error::other(err.to_string()))
        })?;
        delivered.push(notification.clone());
        Ok(())
    }
}
