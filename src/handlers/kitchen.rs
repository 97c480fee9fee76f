//! Kitchen display websocket: `GET /ws/kitchen`.
//!
//! Lifecycle: `Connecting` (upgrade accepted, handle opened) -> `Active`
//! (registered with the hub) -> `Closed` (peer closed, read/send error, send
//! timeout, or the hub dropped the display), at which point it is
//! unregistered.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{config::AppState, services::kitchen_hub::ConnectionId};

/// WebSocket upgrade handler.
pub async fn kitchen_socket(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_display(socket, app_state))
}

async fn serve_display(socket: WebSocket, app_state: AppState) {
    let hub = app_state.kitchen_hub.clone();

    let (connection, outbound) = hub.open_connection();
    let connected_at = connection.connected_at;
    let id = hub.register(connection);

    let (sink, stream) = socket.split();

    let mut writer = tokio::spawn(write_frames(
        sink,
        outbound,
        app_state.config.kitchen_send_timeout,
        app_state.config.kitchen_ping_interval,
        id,
    ));
    let mut reader = tokio::spawn(read_frames(stream, id));

    // Whichever half ends first takes the other one down.
    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    hub.unregister(&id);
    info!(
        connection = %id,
        connected_secs = (Utc::now() - connected_at).num_seconds(),
        "kitchen display disconnected"
    );
}

/// Drains the display's buffer onto the socket, one frame at a time, so
/// events keep their broadcast order. Every send is bounded by
/// `send_timeout`; a stuck peer ends the connection instead of piling up.
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<String>,
    send_timeout: Duration,
    ping_every: Duration,
    id: ConnectionId,
) {
    let mut ping = tokio::time::interval(ping_every);
    ping.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ping.tick().await; // the first tick is immediate

    loop {
        let frame = tokio::select! {
            next = outbound.recv() => match next {
                Some(text) => Message::Text(text.into()),
                // Unregistered by the hub, or shutting down.
                None => break,
            },
            _ = ping.tick() => Message::Ping(Bytes::new()),
        };

        match tokio::time::timeout(send_timeout, sink.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(connection = %id, error = %e, "kitchen display send failed");
                break;
            }
            Err(_) => {
                warn!(connection = %id, timeout_ms = send_timeout.as_millis() as u64, "kitchen display send timed out");
                break;
            }
        }
    }

    let _ = tokio::time::timeout(send_timeout, sink.close()).await;
}

/// Displays have nothing to say; inbound frames only prove the peer is
/// alive. Ends on close or on a transport error.
async fn read_frames(mut stream: SplitStream<WebSocket>, id: ConnectionId) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(_) => debug!(connection = %id, "ignoring inbound kitchen frame"),
            Err(e) => {
                debug!(connection = %id, error = %e, "kitchen display read failed");
                break;
            }
        }
    }
}
