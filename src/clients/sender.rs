use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use crate::clients::source::PositionSource;
use crate::models::error::{ClientError, PositionError};
use crate::models::position::Position;
use crate::task::AutoCancelTask;

pub const FETCH_ERROR: &str = "Unable to fetch location. Please enable location permissions.";
pub const TRACK_ERROR: &str = "Unable to track location.";
pub const UNSUPPORTED_ERROR: &str = "Geolocation is not supported.";

type Outbound = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SenderState {
    pub position: Option<Position>,
    pub error: Option<&'static str>,
}

/// Publishes positions from a [`PositionSource`] to the relay over a single
/// connection. There is no reconnect: once the socket closes, further
/// updates are dropped.
pub struct LocationSender {
    url: String,
    state: watch::Sender<SenderState>,
}

impl LocationSender {
    pub fn new(url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(SenderState::default());
        Self {
            url: url.into(),
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<SenderState> {
        self.state.subscribe()
    }

    pub async fn run<S: PositionSource>(self, mut source: S) -> Result<(), ClientError> {
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(ClientError::Connect)?;
        info!("WebSocket connected to {}", self.url);

        let (mut outbound, mut inbound) = socket.split();
        let open = Arc::new(AtomicBool::new(true));

        let reader_open = open.clone();
        let _echoes = AutoCancelTask(tokio::spawn(async move {
            while let Some(frame) = inbound.next().await {
                match frame {
                    Ok(frame) => debug!("Ignoring relayed message: {:?}", frame),
                    Err(e) => {
                        error!("{}", ClientError::Socket(e));
                        break;
                    }
                }
            }
            reader_open.store(false, Ordering::SeqCst);
        }));

        match source.current_position().await {
            Ok(position) => self.publish(&mut outbound, &open, position).await,
            Err(PositionError::Unsupported) => {
                error!("Position source is not supported");
                self.fail(UNSUPPORTED_ERROR);
                return Ok(());
            }
            Err(e) => {
                error!("Error getting location: {}", e);
                self.fail(FETCH_ERROR);
            }
        }

        while let Some(update) = source.watch_position().await {
            match update {
                Ok(position) => self.publish(&mut outbound, &open, position).await,
                Err(e) => {
                    error!("Error watching position: {}", e);
                    self.fail(TRACK_ERROR);
                }
            }
        }

        if let Err(e) = outbound.close().await {
            debug!("Error closing socket: {}", e);
        }
        Ok(())
    }

    async fn publish(&self, outbound: &mut Outbound, open: &AtomicBool, position: Position) {
        self.state.send_modify(|state| state.position = Some(position));

        if !open.load(Ordering::SeqCst) {
            warn!("Socket is not open, dropping {:?}", position);
            return;
        }
        let payload = match position.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Unable to serialize {:?}: {}", position, e);
                return;
            }
        };
        if let Err(e) = outbound.send(Message::Text(payload)).await {
            warn!("Socket closed while sending {:?}: {}", position, e);
            open.store(false, Ordering::SeqCst);
        }
    }

    fn fail(&self, message: &'static str) {
        self.state.send_modify(|state| state.error = Some(message));
    }
}
