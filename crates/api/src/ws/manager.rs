//! Registry of live stream subscribers.
//!
//! Each socket task owns the receiving half of an unbounded channel; the
//! registry keeps the sending half. A send failure means the socket task is
//! gone, so fan-out drops that entry on the spot.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use sysguard_core::types::Timestamp;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

pub type ConnectionId = Uuid;

struct Subscriber {
    outbox: mpsc::UnboundedSender<Message>,
    since: Timestamp,
}

#[derive(Default)]
pub struct WsManager {
    subscribers: RwLock<HashMap<ConnectionId, Subscriber>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`; the returned receiver yields every frame addressed to it.
    pub async fn add(&self, id: ConnectionId) -> mpsc::UnboundedReceiver<Message> {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let subscriber = Subscriber {
            outbox,
            since: chrono::Utc::now(),
        };
        self.subscribers.write().await.insert(id, subscriber);
        inbox
    }

    pub async fn remove(&self, id: &ConnectionId) {
        if let Some(sub) = self.subscribers.write().await.remove(id) {
            let secs = (chrono::Utc::now() - sub.since).num_seconds();
            tracing::debug!(conn_id = %id, connected_secs = secs, "Subscriber removed");
        }
    }

    /// Deliver `message` to every subscriber and return how many accepted it.
    pub async fn broadcast(&self, message: Message) -> usize {
        let mut subs = self.subscribers.write().await;
        subs.retain(|id, sub| {
            let alive = sub.outbox.send(message.clone()).is_ok();
            if !alive {
                tracing::debug!(conn_id = %id, "Dropping closed subscriber");
            }
            alive
        });
        subs.len()
    }

    /// Deliver to one subscriber. `false` if unknown or closed.
    pub async fn send_to(&self, id: &ConnectionId, message: Message) -> bool {
        match self.subscribers.read().await.get(id) {
            Some(sub) => sub.outbox.send(message).is_ok(),
            None => false,
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Keep-alive frame for every subscriber.
    pub async fn ping_all(&self) -> usize {
        self.broadcast(Message::Ping(Bytes::new())).await
    }

    /// Send Close to everyone and empty the registry.
    pub async fn shutdown_all(&self) {
        let drained: Vec<_> = self.subscribers.write().await.drain().collect();
        for (_, sub) in &drained {
            let _ = sub.outbox.send(Message::Close(None));
        }
        tracing::info!(count = drained.len(), "Stream subscribers closed");
    }
}
