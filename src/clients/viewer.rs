use std::time::Duration;
use async_stream::stream;
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};
use crate::models::error::ClientError;
use crate::models::position::Position;
use crate::task::AutoCancelTask;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Connected,
    Position(Position),
    Malformed(String),
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Reconnecting,
}

/// What a viewer currently shows: the last good position, if any, and the
/// state of its connection to the relay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerState {
    pub position: Option<Position>,
    pub status: ConnectionStatus,
}

impl TrackerState {
    pub fn apply(&mut self, event: &TrackerEvent) {
        match event {
            TrackerEvent::Connected => self.status = ConnectionStatus::Connected,
            TrackerEvent::Position(position) => self.position = Some(*position),
            TrackerEvent::Malformed(_) => {}
            TrackerEvent::Disconnected => self.status = ConnectionStatus::Reconnecting,
        }
    }
}

/// Decodes a relay frame into a position. Binary frames carry the same JSON
/// text as text frames; control frames carry nothing.
pub fn decode_frame(frame: Message) -> Result<Option<Position>, ClientError> {
    match frame {
        Message::Text(text) => Ok(Some(Position::from_json(&text)?)),
        Message::Binary(bytes) => Ok(Some(Position::from_json(std::str::from_utf8(&bytes)?)?)),
        _ => Ok(None),
    }
}

pub struct LocationTracker {
    url: String,
    reconnect_delay: Duration,
}

impl LocationTracker {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
        }
    }

    /// Connects and keeps reconnecting forever, waiting a fixed
    /// `reconnect_delay` after every close or failed attempt.
    pub fn track(self) -> impl Stream<Item = TrackerEvent> {
        stream! {
            loop {
                match connect_async(self.url.as_str()).await {
                    Ok((mut socket, _)) => {
                        info!("WebSocket connected to {}", self.url);
                        yield TrackerEvent::Connected;
                        while let Some(frame) = socket.next().await {
                            let frame = match frame {
                                Ok(frame) => frame,
                                Err(e) => {
                                    error!("{}", ClientError::Socket(e));
                                    break;
                                }
                            };
                            match decode_frame(frame) {
                                Ok(Some(position)) => {
                                    yield TrackerEvent::Position(position);
                                }
                                Ok(None) => {}
                                Err(e) => {
                                    error!("{}", e);
                                    yield TrackerEvent::Malformed(e.to_string());
                                }
                            }
                        }
                    }
                    Err(e) => error!("{}", ClientError::Connect(e)),
                }
                warn!("WebSocket closed. Attempting to reconnect in {:?}...", self.reconnect_delay);
                yield TrackerEvent::Disconnected;
                tokio::time::sleep(self.reconnect_delay).await;
            }
        }
    }

    /// Runs the tracker in the background. Dropping the handle stops it and
    /// closes the socket.
    pub fn spawn(self) -> TrackerHandle {
        let (state_tx, state_rx) = watch::channel(TrackerState::default());
        let task = tokio::spawn(async move {
            let events = self.track();
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                state_tx.send_modify(|state| state.apply(&event));
            }
        });
        TrackerHandle {
            state: state_rx,
            _task: AutoCancelTask(task),
        }
    }
}

pub struct TrackerHandle {
    state: watch::Receiver<TrackerState>,
    _task: AutoCancelTask<()>,
}

impl TrackerHandle {
    pub fn state(&self) -> watch::Receiver<TrackerState> {
        self.state.clone()
    }

    pub fn current(&self) -> TrackerState {
        self.state.borrow().clone()
    }
}
