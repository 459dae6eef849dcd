//! Realtime relay WebSocket endpoints.
//!
//! `/ws/phone/{session}` accepts binary frames (camera images) and forwards
//! each one to `/ws/wizard/{session}`. The wizard side only receives; any
//! text it sends is a keepalive and is discarded.
//!
//! Forwarding is fire-and-forget: frames for a session with no wizard
//! connected, or whose wizard is too slow to drain its queue, are dropped
//! and the phone is not told.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use relay::{EndpointKey, Role};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::state::AppState;

/// WebSocket upgrade handler for both roles.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path((role, session_id)): Path<(String, String)>,
) -> Result<Response> {
    let role: Role = role.parse()?;
    let key = EndpointKey::new(role, session_id);

    info!(key = %key, "WebSocket connection request");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, key)))
}

/// Run one connection until the peer closes, I/O fails, or the key is taken over.
async fn handle_socket(socket: WebSocket, state: AppState, key: EndpointKey) {
    let (mut channel, _) = state.relay.register(key.clone());
    let target = key.peer();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Binary(data))) => match key.role {
                    Role::Phone => {
                        state.relay.forward(&target, data);
                    }
                    Role::Wizard => {
                        debug!(key = %key, len = data.len(), "Binary frame from wizard ignored");
                    }
                },
                Some(Ok(Message::Text(text))) => {
                    debug!(key = %key, len = text.len(), "Keepalive received");
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(key = %key, "Client closed connection");
                    break;
                }
                // Pings are answered by axum.
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Err(err)) => {
                    warn!(key = %key, error = %err, "WebSocket receive error");
                    break;
                }
            },
            outgoing = channel.recv() => match outgoing {
                Some(frame) => {
                    if let Err(err) = sender.send(Message::Binary(frame)).await {
                        warn!(key = %key, error = %err, "Failed to push frame, closing connection");
                        break;
                    }
                }
                None => {
                    info!(key = %key, "Connection replaced by a newer one");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
        }
    }

    state.relay.release(&key, channel.id());
}
