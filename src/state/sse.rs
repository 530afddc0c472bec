//! Broadcast hubs behind the public and admin event streams.

use tokio::sync::{Mutex, broadcast};
use tracing::trace;

use crate::dto::sse::ServerEvent;

/// Both event streams plus the token of the admin currently connected.
pub struct SseState {
    public: SseHub,
    admin: SseHub,
    admin_token: Mutex<Option<String>>,
}

impl SseState {
    pub fn new(capacity: usize) -> Self {
        Self {
            public: SseHub::new("public", capacity),
            admin: SseHub::new("admin", capacity),
            admin_token: Mutex::new(None),
        }
    }

    pub fn public(&self) -> &SseHub {
        &self.public
    }

    pub fn admin(&self) -> &SseHub {
        &self.admin
    }

    /// At most one admin stream holds a token at a time.
    pub fn admin_token(&self) -> &Mutex<Option<String>> {
        &self.admin_token
    }
}

/// Fan-out channel for one stream. Slow subscribers lag and skip events.
pub struct SseHub {
    stream: &'static str,
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    pub fn new(stream: &'static str, capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { stream, sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send to every connected client; returns how many received the event.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        let name = event.event.clone();
        match self.sender.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                trace!(stream = self.stream, event = ?name, "no subscriber for event");
                0
            }
        }
    }
}
