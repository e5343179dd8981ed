//! Per-session streaming broadcaster
//!
//! One publish/subscribe topic per streaming session, named
//! deterministically from the session id. Delivery is at-most-once per
//! subscriber connection: there is no replay buffer, so a subscriber
//! joining after pages have already streamed misses them, and a lagging
//! subscriber drops the oldest undelivered events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identifier of one streaming session
pub type SessionId = Uuid;

/// Event published on a session topic
///
/// The happy-path wire schema is `{songs, page, done}`; the terminal
/// failure event additionally carries `error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamEvent {
    pub songs: Vec<String>,
    pub page: u32,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StreamEvent {
    /// Incremental event carrying one page's raw titles
    pub fn page(songs: Vec<String>, page: u32) -> Self {
        Self {
            songs,
            page,
            done: false,
            error: None,
        }
    }

    /// Terminal success event
    pub fn done(last_page: u32) -> Self {
        Self {
            songs: Vec::new(),
            page: last_page,
            done: true,
            error: None,
        }
    }

    /// Terminal failure event
    pub fn failed(page: u32, message: String) -> Self {
        Self {
            songs: Vec::new(),
            page,
            done: true,
            error: Some(message),
        }
    }
}

/// Registry of open session topics
pub struct SessionBroadcaster {
    topics: RwLock<HashMap<SessionId, broadcast::Sender<StreamEvent>>>,
    capacity: usize,
}

impl SessionBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Deterministic topic name for a session
    pub fn topic_name(session_id: &SessionId) -> String {
        format!("artist_songs_{}", session_id)
    }

    /// Open a fresh session topic and return its id
    pub async fn open_session(&self) -> SessionId {
        let session_id = Uuid::new_v4();
        let (sender, _) = broadcast::channel(self.capacity);
        self.topics.write().await.insert(session_id, sender);
        tracing::debug!(topic = %Self::topic_name(&session_id), "stream session opened");
        session_id
    }

    /// Subscribe to a session topic, if it is still open
    pub async fn subscribe(
        &self,
        session_id: &SessionId,
    ) -> Option<broadcast::Receiver<StreamEvent>> {
        let topics = self.topics.read().await;
        topics.get(session_id).map(|sender| sender.subscribe())
    }

    /// Get the raw sender for a session topic
    ///
    /// The streaming job holds this handle so it can publish from inside
    /// the sequential page walk without touching the registry per page.
    pub async fn sender(&self, session_id: &SessionId) -> Option<broadcast::Sender<StreamEvent>> {
        let topics = self.topics.read().await;
        topics.get(session_id).cloned()
    }

    /// Publish an event to a session topic
    ///
    /// Publishing to a topic with no subscribers is not an error; the
    /// event is simply dropped (at-most-once, no replay).
    pub async fn publish(&self, session_id: &SessionId, event: StreamEvent) {
        let topics = self.topics.read().await;
        if let Some(sender) = topics.get(session_id) {
            let _ = sender.send(event);
        }
    }

    /// Drop a session topic once its terminal event has been published
    pub async fn close_session(&self, session_id: &SessionId) {
        self.topics.write().await.remove(session_id);
        tracing::debug!(topic = %Self::topic_name(session_id), "stream session closed");
    }

    /// Number of open session topics
    pub async fn session_count(&self) -> usize {
        self.topics.read().await.len()
    }
}
