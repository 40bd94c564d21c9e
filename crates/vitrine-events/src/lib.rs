#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Session signals shared between the API client and its front ends.
//!
//! The transport layer never navigates on its own. When a session ends it
//! publishes a [`SessionEvent`] on a `tokio::broadcast` channel and whoever owns
//! navigation (a router, a CLI prompt) subscribes and reacts. Publishing with no
//! live subscriber is not an error: the event is simply dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};

/// Entry point front ends navigate to once the session is gone.
pub const LOGIN_ROUTE: &str = "/login";

/// Default channel capacity; session transitions are rare.
const DEFAULT_CAPACITY: usize = 16;

/// Session lifecycle transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A login completed and credentials are now stored.
    LoggedIn {
        /// Identifier of the authenticated user.
        user_id: String,
    },
    /// The user logged out locally.
    LoggedOut,
    /// The backend rejected the stored credentials; the session was cleared.
    Unauthenticated {
        /// Route the subscriber should navigate to.
        redirect_to: String,
    },
}

impl SessionEvent {
    /// Session-expiry event pointing at [`LOGIN_ROUTE`].
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated {
            redirect_to: LOGIN_ROUTE.to_string(),
        }
    }

    /// Machine-friendly discriminator for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LoggedIn { .. } => "session.logged_in",
            Self::LoggedOut => "session.logged_out",
            Self::Unauthenticated { .. } => "session.unauthenticated",
        }
    }
}

/// Broadcast handle cloned into every component that emits or observes
/// session transitions.
#[derive(Clone, Debug)]
pub struct SessionSignals {
    sender: Sender<SessionEvent>,
}

impl SessionSignals {
    /// Construct a channel with a custom capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Construct a channel with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: SessionEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = kind, receivers, "session event published");
                receivers
            }
            Err(_) => {
                tracing::debug!(event = kind, "session event dropped without subscribers");
                0
            }
        }
    }
}

impl Default for SessionSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_unauthenticated_with_login_route() {
        let signals = SessionSignals::new();
        let mut rx = signals.subscribe();

        assert_eq!(signals.publish(SessionEvent::unauthenticated()), 1);

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(
            event,
            SessionEvent::Unauthenticated {
                redirect_to: "/login".to_string()
            }
        );
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let signals = SessionSignals::default();
        assert_eq!(signals.publish(SessionEvent::LoggedOut), 0);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(SessionEvent::LoggedIn {
            user_id: "u1".into(),
        })
        .expect("serialize");
        assert_eq!(value["type"], "logged_in");
        assert_eq!(value["user_id"], "u1");
        assert_eq!(SessionEvent::LoggedOut.kind(), "session.logged_out");
    }
}
