//! Headless notification sink: alerts are written to the log.

use arucraftr_player_ports::outbound::{Notification, NotificationPort, Severity};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let description = notification.description.as_deref().unwrap_or_default();
        match notification.severity {
            Severity::Error => {
                tracing::error!(title = %notification.title, "{description}")
            }
            Severity::Warning => {
                tracing::warn!(title = %notification.title, "{description}")
            }
            Severity::Success | Severity::Info => {
                tracing::info!(title = %notification.title, "{description}")
            }
        }
    }
}
