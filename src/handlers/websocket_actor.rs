use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, info};
use crate::handlers::relay::{ClientId, Relay};
use crate::task::AutoCancelTask;

/// One open relay connection: an inbound task that fans every message out
/// through the [`Relay`], and an outbound task that drains this connection's
/// queue into the socket.
pub struct WebsocketActor {
    id: ClientId,
    relay: Arc<Relay>,
    recv_task: AutoCancelTask<()>,
    send_task: AutoCancelTask<()>,
}

impl WebsocketActor {
    pub fn new(socket: WebSocket, relay: Arc<Relay>) -> Self {
        let (id, mut outbound) = relay.connect();
        let (mut ws_sender, mut ws_receiver) = socket.split();

        let inbound_relay = relay.clone();
        let inbound_task = tokio::spawn(async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(msg @ (Message::Text(_) | Message::Binary(_))) => {
                        log_arrival(id, &msg);
                        inbound_relay.broadcast(id, msg);
                    }
                    // The next read flushes the close reply and then ends the stream.
                    Ok(Message::Close(frame)) => debug!("Client {} sent close: {:?}", id, frame),
                    Ok(_) => {}
                    Err(e) => {
                        error!("WebSocket error on client {}: {}", id, e);
                        break;
                    }
                }
            }
        });

        let outbound_task = tokio::spawn(async move {
            while let Some(msg) = outbound.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    debug!("Dropping client {} after failed send: {}", id, e);
                    break;
                }
            }
        });

        Self {
            id,
            relay,
            recv_task: AutoCancelTask(inbound_task),
            send_task: AutoCancelTask(outbound_task),
        }
    }

    pub async fn run_actor(mut self) {
        tokio::select! {
            _ = &mut self.recv_task.0 => (),
            _ = &mut self.send_task.0 => ()
        }
        self.relay.disconnect(self.id);
        info!("Client {} disconnected", self.id);
    }
}

fn log_arrival(id: ClientId, msg: &Message) {
    let received_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    match msg {
        Message::Text(text) => info!("Received from {}: {} {}", id, text, received_at),
        Message::Binary(bytes) => info!("Received from {}: <{} bytes> {}", id, bytes.len(), received_at),
        _ => {}
    }
}
