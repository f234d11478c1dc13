//! User-visible notifications
//!
//! Failures never escape a transition. They become a [`Notification`] in the
//! collaborator's state, which the presentation shows and dismisses.

use crate::environment::StorefrontEnvironment;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use storefront_api::FailureCategory;
use storefront_core::{delay, effect::Effect};

/// Identifier of a notification, unique within one state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Operation succeeded
    Success,
    /// Informational
    Info,
    /// Something secondary went wrong
    Warning,
    /// The requested operation failed
    Error,
}

/// A message for the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Identifier used to dismiss it
    pub id: NotificationId,
    /// Severity
    pub level: Level,
    /// Text shown to the user
    pub message: String,
    /// Failure category, for failures
    pub category: Option<FailureCategory>,
    /// When it was raised
    pub at: DateTime<Utc>,
}

/// Most notifications kept at once; pushing more drops the oldest
pub const MAX_NOTIFICATIONS: usize = 32;

/// Notifications currently shown, oldest first
///
/// Without a notification TTL nothing expires on its own: callers that live
/// longer than one command dismiss what they have shown, and past
/// [`MAX_NOTIFICATIONS`] the oldest are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Notifications {
    items: VecDeque<Notification>,
    next_id: u64,
}

impl Notifications {
    /// Record a notification and return its id
    pub fn push(
        &mut self,
        level: Level,
        message: impl Into<String>,
        category: Option<FailureCategory>,
        at: DateTime<Utc>,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        if self.items.len() == MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        self.items.push_back(Notification {
            id,
            level,
            message: message.into(),
            category,
            at,
        });
        id
    }

    /// Remove a notification; unknown ids are ignored
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// All notifications, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Most recent notification
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    /// Number of notifications at `level`
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.items.iter().filter(|n| n.level == level).count()
    }

    /// Number of notifications shown
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is shown
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Push a notification and schedule its auto-dismissal
///
/// Errors stay up twice as long as other levels.
pub(crate) fn notify<A>(
    notifications: &mut Notifications,
    env: &StorefrontEnvironment,
    level: Level,
    message: impl Into<String>,
    category: Option<FailureCategory>,
    dismiss: impl FnOnce(NotificationId) -> A,
) -> Effect<A> {
    let id = notifications.push(level, message, category, env.clock.now());

    match env.notification_ttl {
        Some(ttl) => {
            let duration = if level == Level::Error { ttl * 2 } else { ttl };
            delay! {
                duration: duration,
                action: dismiss(id)
            }
        },
        None => Effect::None,
    }
}
