//! Notifications rendered as log lines instead of dashboard toasts.

use canvas::session::{Notification, Notifier, Severity};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let Notification { title, description, severity } = notification;
        match severity {
            Severity::Info | Severity::Success => info!(?severity, %title, %description, "notification"),
            Severity::Warning => warn!(%title, %description, "notification"),
            Severity::Error => error!(%title, %description, "notification"),
        }
    }
}
