//! User notifications
//!
//! Every dispatch ends in exactly one toast-style notification (unless the
//! late-completion policy drops it). Sinks implement `Notifier`; the view layer
//! usually takes a `ChannelNotifier` receiver and renders from that.

use care_records_types::{ActionKind, ClientId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::PortFailureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Failure,
}

/// One toast
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Dispatch that produced it
    pub dispatch_id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    /// Why the save failed, so the view can tell a bad form from a flaky backend.
    /// `None` on success and on dispatcher misuse.
    pub failure: Option<PortFailureKind>,
    pub action: ActionKind,
    pub client_id: ClientId,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

/// Where notifications go
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to the view layer over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            // View unmounted; nothing left to show it on
            tracing::debug!(
                dispatch_id = %e.0.dispatch_id,
                title = %e.0.title,
                "Notification receiver dropped"
            );
        }
    }
}

/// Logs notifications, for headless embedding
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Success => tracing::info!(
                dispatch_id = %n.dispatch_id,
                action = %n.action,
                client_id = %n.client_id,
                "{}: {}",
                n.title,
                n.message
            ),
            NotificationLevel::Failure => tracing::warn!(
                dispatch_id = %n.dispatch_id,
                action = %n.action,
                failure = ?n.failure,
                client_id = %n.client_id,
                "{}: {}",
                n.title,
                n.message
            ),
        }
    }
}
