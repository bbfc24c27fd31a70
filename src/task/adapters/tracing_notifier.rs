//! Notifier that reports status changes as structured log events.

use async_trait::async_trait;
use tracing::info;

use crate::task::ports::{NotificationError, StatusChangeNotification, StatusChangeNotifier};

/// Emits one `tracing` event per status change notification.
///
/// This is the default notifier until a delivery channel (mail, chat) is
/// wired in by the host application.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl StatusChangeNotifier for TracingNotifier {
    async fn notify(
        &self,
        notification: &StatusChangeNotification,
    ) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(notification).map_err(NotificationError::delivery)?;
        info!(
            task_id = %notification.task_id,
            old_status = %notification.old_status,
            new_status = %notification.new_status,
            actor = %notification.actor.user_id(),
            %payload,
            "task moved to {}; notification due",
            notification.new_status,
        );
        Ok(())
    }
}
