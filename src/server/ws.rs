//! WebSocket push channel on `/ws`
//!
//! A client gets the latest snapshot right after the handshake, then one
//! text frame per broadcast. Incoming frames are ignored apart from close;
//! pings are answered by tungstenite itself.

use super::routes::{text, Body};
use super::ServerState;
use futures::{SinkExt, StreamExt};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{
    HeaderValue, CONNECTION, SEC_WEBSOCKET_ACCEPT, SEC_WEBSOCKET_KEY, UPGRADE,
};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast::error::RecvError;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Answer the handshake and hand the upgraded connection to a client task.
pub fn upgrade(state: Arc<ServerState>, req: &mut Request<Incoming>) -> Response<Body> {
    let wants_websocket = req
        .headers()
        .get(UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.eq_ignore_ascii_case("websocket"));

    let accept = match req.headers().get(SEC_WEBSOCKET_KEY) {
        Some(key) if wants_websocket => derive_accept_key(key.as_bytes()),
        _ => return text(StatusCode::BAD_REQUEST, "Expected WebSocket upgrade"),
    };
    let Ok(accept) = HeaderValue::from_str(&accept) else {
        return text(StatusCode::BAD_REQUEST, "Invalid WebSocket key");
    };

    let on_upgrade = hyper::upgrade::on(req);
    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => {
                let socket =
                    WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None)
                        .await;
                serve_client(state, socket).await;
            }
            Err(e) => tracing::warn!("WebSocket upgrade failed: {}", e),
        }
    });

    let mut res = Response::new(Full::new(Bytes::new()));
    *res.status_mut() = StatusCode::SWITCHING_PROTOCOLS;
    let headers = res.headers_mut();
    headers.insert(UPGRADE, HeaderValue::from_static("websocket"));
    headers.insert(CONNECTION, HeaderValue::from_static("Upgrade"));
    headers.insert(SEC_WEBSOCKET_ACCEPT, accept);
    res
}

async fn serve_client<S>(state: Arc<ServerState>, socket: WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Subscribe before reading `latest` so no broadcast falls in between
    let mut updates = state.subscribe();
    tracing::info!(
        "WebSocket client connected ({} total)",
        state.client_connected()
    );

    let (mut sink, mut incoming) = socket.split();

    let mut open = match state.latest_json().await {
        Some(json) => sink.send(Message::Text(json)).await.is_ok(),
        None => true,
    };

    while open {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(json) => open = sink.send(Message::Text(json)).await.is_ok(),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("WebSocket client lagged by {} updates, resyncing", skipped);
                    if let Some(json) = state.latest_json().await {
                        open = sink.send(Message::Text(json)).await.is_ok();
                    }
                }
                Err(RecvError::Closed) => open = false,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_))) | None => open = false,
                // Push out the queued pong
                Some(Ok(Message::Ping(_))) => open = sink.flush().await.is_ok(),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!("WebSocket read failed: {}", e);
                    open = false;
                }
            },
        }
    }

    let _ = sink.close().await;
    tracing::info!(
        "WebSocket client disconnected ({} total)",
        state.client_disconnected()
    );
}
