use std::collections::VecDeque;
use std::time::{Duration, Instant};
use eframe::egui::Color32;
use uuid::Uuid;
use crate::error::AppError;

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);
const MAX_VISIBLE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

impl NotificationKind {
    pub fn color(&self) -> Color32 {
        match self {
            Self::Info => Color32::from_rgb(99, 102, 241),
            Self::Success => Color32::from_rgb(16, 185, 129),
            Self::Error => Color32::from_rgb(239, 68, 68),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }
}

impl From<&AppError> for Notification {
    fn from(err: &AppError) -> Self {
        Self::error(err.user_message())
    }
}

/// Transient status messages, newest last, each expiring after a fixed TTL
#[derive(Debug)]
pub struct Notifications {
    items: VecDeque<Notification>,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }
}

impl Notifications {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        if self.items.len() == MAX_VISIBLE {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    pub fn dismiss(&mut self, id: Uuid) {
        self.items.retain(|n| n.id != id);
    }

    /// Drops every notification older than the TTL
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created_at) < ttl);
    }

    /// Time until the oldest notification expires, for scheduling a repaint
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.items
            .iter()
            .map(|n| self.ttl.saturating_sub(now.saturating_duration_since(n.created_at)))
            .min()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_notifications_are_pruned() {
        let mut notifications = Notifications::default();
        let start = Instant::now();
        notifications.push(Notification::info("Creating a variation of this image..."));

        notifications.prune(start + Duration::from_secs(1));
        assert_eq!(notifications.len(), 1);

        notifications.prune(start + NOTIFICATION_TTL + Duration::from_millis(10));
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_dismiss_removes_only_target() {
        let mut notifications = Notifications::default();
        let keep = Notification::success("Image downloaded successfully");
        let drop = Notification::error("Error: Failed to generate image");
        let drop_id = drop.id;
        notifications.push(keep.clone());
        notifications.push(drop);

        notifications.dismiss(drop_id);
        let left: Vec<_> = notifications.visible().collect();
        assert_eq!(left, vec![&keep]);
    }

    #[test]
    fn test_oldest_dropped_when_full() {
        let mut notifications = Notifications::default();
        for i in 0..(MAX_VISIBLE + 2) {
            notifications.push(Notification::info(format!("message {}", i)));
        }
        assert_eq!(notifications.len(), MAX_VISIBLE);
        assert_eq!(notifications.visible().next().unwrap().message, "message 2");
    }

    #[test]
    fn test_error_notification_text() {
        let n = Notification::from(&AppError::Poll("Failed to check job status".into()));
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.message, "Error: Failed to check job status");
    }
}
