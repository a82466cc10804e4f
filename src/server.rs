use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::extract::connect_info::ConnectInfo;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{BoxError, Router, TypedHeader};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;
use crate::handlers::relay::Relay;
use crate::handlers::websocket_actor::WebsocketActor;

pub fn app(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        // trace every upgrade request with its headers
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(relay)
}

/// Binds the relay to `addr` and returns the bound address together with the
/// server future. Nothing is accepted until the future is polled.
pub fn bind(
    addr: SocketAddr,
    relay: Arc<Relay>,
) -> Result<(SocketAddr, impl Future<Output = Result<(), BoxError>>), BoxError> {
    let server = axum::Server::try_bind(&addr)?
        .serve(app(relay).into_make_service_with_connect_info::<SocketAddr>());
    let local_addr = server.local_addr();
    Ok((local_addr, async move { server.await.map_err(Into::into) }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(relay): State<Arc<Relay>>,
) -> impl IntoResponse {
    let user_agent = user_agent
        .map(|TypedHeader(agent)| agent.to_string())
        .unwrap_or_else(|| "unknown client".to_string());
    info!("Client connected from {} ({})", addr, user_agent);
    ws.on_upgrade(move |socket| WebsocketActor::new(socket, relay).run_actor())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
    use super::*;

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn start() -> (String, Arc<Relay>) {
        let relay = Arc::new(Relay::new());
        let (addr, server) = bind("127.0.0.1:0".parse().unwrap(), relay.clone()).unwrap();
        tokio::spawn(server);
        (format!("ws://{}", addr), relay)
    }

    async fn wait_for_clients(relay: &Relay, count: usize) {
        timeout(Duration::from_secs(5), async {
            while relay.client_count() != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("relay never reached expected client count");
    }

    async fn next_message(client: &mut Client) -> Message {
        timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for message")
            .expect("stream ended")
            .expect("socket error")
    }

    async fn assert_silent(client: &mut Client) {
        let next = timeout(Duration::from_millis(200), client.next()).await;
        assert!(next.is_err(), "expected no message, got {:?}", next);
    }

    #[tokio::test]
    async fn echoes_to_all_then_only_to_remaining_client() {
        let (url, relay) = start().await;
        let (mut a, _) = connect_async(url.as_str()).await.unwrap();
        let (mut b, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_clients(&relay, 2).await;

        a.send(Message::Text(r#"{"lat":1,"lng":2}"#.to_string())).await.unwrap();
        assert_eq!(next_message(&mut a).await, Message::Text(r#"{"lat":1,"lng":2}"#.to_string()));
        assert_eq!(next_message(&mut b).await, Message::Text(r#"{"lat":1,"lng":2}"#.to_string()));

        b.close(None).await.unwrap();
        wait_for_clients(&relay, 1).await;

        a.send(Message::Text(r#"{"lat":3,"lng":4}"#.to_string())).await.unwrap();
        assert_eq!(next_message(&mut a).await, Message::Text(r#"{"lat":3,"lng":4}"#.to_string()));
    }

    #[tokio::test]
    async fn forwards_every_message_in_order() {
        let (url, relay) = start().await;
        let (mut a, _) = connect_async(url.as_str()).await.unwrap();
        let (mut b, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_clients(&relay, 2).await;

        let sent: Vec<String> = (0..20)
            .map(|i| format!("{{\"lat\":{}.5,\"lng\":-{}.25}}", i, i))
            .collect();
        for payload in &sent {
            a.send(Message::Text(payload.clone())).await.unwrap();
        }

        for payload in &sent {
            assert_eq!(next_message(&mut b).await, Message::Text(payload.clone()));
        }
        assert_silent(&mut b).await;
    }

    #[tokio::test]
    async fn late_client_does_not_see_earlier_messages() {
        let (url, relay) = start().await;
        let (mut a, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_clients(&relay, 1).await;

        a.send(Message::Text("early".to_string())).await.unwrap();
        assert_eq!(next_message(&mut a).await, Message::Text("early".to_string()));

        let (mut c, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_clients(&relay, 2).await;
        assert_silent(&mut c).await;

        a.send(Message::Text("late".to_string())).await.unwrap();
        assert_eq!(next_message(&mut c).await, Message::Text("late".to_string()));
    }

    #[tokio::test]
    async fn malformed_and_binary_payloads_pass_through_verbatim() {
        let (url, relay) = start().await;
        let (mut a, _) = connect_async(url.as_str()).await.unwrap();
        let (mut b, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_clients(&relay, 2).await;

        a.send(Message::Text("not-json".to_string())).await.unwrap();
        assert_eq!(next_message(&mut b).await, Message::Text("not-json".to_string()));

        let blob = br#"{"lat":5,"lng":6}"#.to_vec();
        a.send(Message::Binary(blob.clone())).await.unwrap();
        assert_eq!(next_message(&mut b).await, Message::Binary(blob));
    }

    #[tokio::test]
    async fn dropped_connection_is_removed_from_relay() {
        let (url, relay) = start().await;
        let (a, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_clients(&relay, 1).await;

        drop(a);
        wait_for_clients(&relay, 0).await;
    }

    #[tokio::test]
    async fn completes_closing_handshake() {
        let (url, relay) = start().await;
        let (mut a, _) = connect_async(url.as_str()).await.unwrap();
        wait_for_clients(&relay, 1).await;

        a.send(Message::Close(None)).await.unwrap();
        match timeout(Duration::from_secs(5), a.next()).await.expect("timed out waiting for close") {
            Some(Ok(Message::Close(_))) | None => {}
            other => panic!("expected close reply, got {:?}", other),
        }
        wait_for_clients(&relay, 0).await;
    }
}
