//! Transient notifications (toasts and alerts).

use tracing::{debug, error};

use super::scheduler::{TimerQueue, TimerTask};
use crate::domain::{Notification, NotificationId, Severity};

/// Message shown for any uncaught runtime fault. Fault detail is logged, never shown.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please refresh the page or try again.";

const GLOBAL_ERROR_ICON: &str = "fa-exclamation-triangle";

/// Registry of displayed notifications, newest last.
///
/// Each notification owns its own removal timer. Removal by timeout and
/// removal by dismissal race harmlessly: whichever comes second finds
/// nothing to remove.
#[derive(Debug)]
pub struct NotificationManager {
    timeout_ms: u64,
    next_id: u64,
    active: Vec<Notification>,
}

impl NotificationManager {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            next_id: 0,
            active: Vec::new(),
        }
    }

    pub fn notify(
        &mut self,
        queue: &mut TimerQueue,
        now: u64,
        message: &str,
        severity: Severity,
    ) -> NotificationId {
        self.insert(queue, now, message, severity, severity.icon())
    }

    /// Like [`notify`](Self::notify) with a severity name; unknown names mean info.
    pub fn notify_named(
        &mut self,
        queue: &mut TimerQueue,
        now: u64,
        message: &str,
        severity: &str,
    ) -> NotificationId {
        self.notify(queue, now, message, Severity::from_name(severity))
    }

    /// Logs a runtime fault and shows the generic error notification.
    pub fn raise_global_error(&mut self, queue: &mut TimerQueue, now: u64, detail: &str) -> NotificationId {
        error!(detail = %detail, "uncaught runtime error");
        self.insert(queue, now, GENERIC_ERROR_MESSAGE, Severity::Error, GLOBAL_ERROR_ICON)
    }

    fn insert(
        &mut self,
        queue: &mut TimerQueue,
        now: u64,
        message: &str,
        severity: Severity,
        icon: &'static str,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        let removal = queue.schedule_once(now, self.timeout_ms, TimerTask::RemoveNotification(id));
        self.active.push(Notification {
            id,
            message: message.to_string(),
            severity,
            icon,
            created_at: now,
            removal: Some(removal),
        });
        debug!(notification = id.0, severity = ?severity, "notification shown");
        id
    }

    /// Removes a notification at the user's request and cancels its timeout.
    pub fn dismiss(&mut self, queue: &mut TimerQueue, id: NotificationId) -> bool {
        match self.take(id) {
            Some(notification) => {
                if let Some(timer) = notification.removal {
                    queue.cancel(timer);
                }
                true
            }
            None => false,
        }
    }

    /// Timeout path. Already removed notifications are a no-op.
    pub fn expire(&mut self, id: NotificationId) -> bool {
        self.take(id).is_some()
    }

    fn take(&mut self, id: NotificationId) -> Option<Notification> {
        let index = self.active.iter().position(|n| n.id == id)?;
        Some(self.active.remove(index))
    }

    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.active.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expire_due(manager: &mut NotificationManager, queue: &mut TimerQueue, now: u64) {
        while let Some(fired) = queue.pop_due(now) {
            if let TimerTask::RemoveNotification(id) = fired.task {
                manager.expire(id);
            }
        }
    }

    #[test]
    fn test_toast_expires_after_timeout() {
        let mut queue = TimerQueue::new();
        let mut manager = NotificationManager::new(5_000);

        let id = manager.notify_named(&mut queue, 100, "Saved", "success");
        let shown = manager.get(id).expect("toast should be shown immediately");
        assert_eq!(shown.severity, Severity::Success);
        assert_eq!(shown.icon, "fa-check-circle");

        expire_due(&mut manager, &mut queue, 5_099);
        assert!(manager.get(id).is_some());
        expire_due(&mut manager, &mut queue, 5_100);
        assert!(manager.get(id).is_none());
    }

    #[test]
    fn test_dismiss_cancels_timeout() {
        let mut queue = TimerQueue::new();
        let mut manager = NotificationManager::new(5_000);

        let id = manager.notify(&mut queue, 0, "Heads up", Severity::Warning);
        assert!(manager.dismiss(&mut queue, id));
        assert!(manager.active().is_empty());
        assert!(queue.is_empty());
        assert!(!manager.dismiss(&mut queue, id));
        assert!(!manager.expire(id));
    }

    #[test]
    fn test_notifications_stack_independently() {
        let mut queue = TimerQueue::new();
        let mut manager = NotificationManager::new(5_000);

        let first = manager.notify(&mut queue, 0, "one", Severity::Info);
        let second = manager.notify(&mut queue, 2_000, "two", Severity::Info);
        assert_eq!(manager.active().len(), 2);

        expire_due(&mut manager, &mut queue, 5_000);
        assert!(manager.get(first).is_none());
        assert!(manager.get(second).is_some());
    }

    #[test]
    fn test_unknown_severity_falls_back_to_info() {
        let mut queue = TimerQueue::new();
        let mut manager = NotificationManager::new(5_000);
        let id = manager.notify_named(&mut queue, 0, "hello", "purple");
        assert_eq!(manager.get(id).map(|n| n.severity), Some(Severity::Info));
    }

    #[test]
    fn test_global_error_hides_detail() {
        let mut queue = TimerQueue::new();
        let mut manager = NotificationManager::new(5_000);
        let id = manager.raise_global_error(&mut queue, 0, "index out of bounds: len 3, index 7");
        let shown = manager.get(id).expect("error alert shown");
        assert_eq!(shown.message, GENERIC_ERROR_MESSAGE);
        assert_eq!(shown.severity, Severity::Error);
        assert_eq!(shown.icon, "fa-exclamation-triangle");

        expire_due(&mut manager, &mut queue, 5_000);
        assert!(manager.active().is_empty());
    }
}
