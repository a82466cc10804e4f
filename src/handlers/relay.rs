use std::sync::atomic::{AtomicU64, Ordering};
use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

pub type ClientId = u64;

/// The live set of open connections. Every connection gets an unbounded
/// outbound queue; broadcasting pushes a copy of the payload onto each queue
/// without waiting on the peer.
#[derive(Default)]
pub struct Relay {
    clients: DashMap<ClientId, mpsc::UnboundedSender<Message>>,
    next_id: AtomicU64,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection. It only sees messages broadcast after this call.
    pub fn connect(&self) -> (ClientId, mpsc::UnboundedReceiver<Message>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.insert(id, tx);
        debug!("Registered client {} ({} open)", id, self.clients.len());
        (id, rx)
    }

    pub fn disconnect(&self, id: ClientId) -> bool {
        let removed = self.clients.remove(&id).is_some();
        if removed {
            debug!("Removed client {} ({} open)", id, self.clients.len());
        }
        removed
    }

    /// Hands `payload` to every registered connection, the origin included.
    /// Connections whose queue is already closed are skipped.
    pub fn broadcast(&self, from: ClientId, payload: Message) -> usize {
        let mut delivered = 0;
        for client in self.clients.iter() {
            match client.value().send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => debug!("Client {} is not open, skipping message from {}", client.key(), from),
            }
        }
        delivered
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
