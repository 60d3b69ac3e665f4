//! Synchronization gateway: the WebSocket side of the service
//!
//! One task per connection. A connection starts unsubscribed, may join any
//! number of mitplans, and pushes whole-document state updates that are
//! committed write-through and broadcast to the room (sender included).
//!
//! Concurrency model: updates are last-write-wins at whole-document
//! granularity. There is no per-mitplan lock and no version token, so two
//! connections racing on the same mitplan commit in arbitrary order and
//! the later durable write stands. Stronger ordering (per-mitplan writer
//! queue, compare-and-swap commits) is a deliberate non-feature here.
//!
//! Every failure is converted to an ack/error frame at the message
//! boundary; nothing that goes wrong for one request tears down the
//! connection, and nothing reaches other subscribers unless a commit
//! succeeded.

use crate::messages::{ClientMessage, ServerMessage};
use crate::registry::ConnectionId;
use crate::server::AppContext;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use mitplan_common::model::Mitplan;
use mitplan_common::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Handle for one live connection: identity plus its outbound channel
pub struct Connection {
    pub id: ConnectionId,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: ConnectionId::new(),
            tx,
        }
    }

    /// Queue a message to this connection only
    ///
    /// A closed channel means the connection is already tearing down; the
    /// message is dropped and the disconnect path does the cleanup.
    pub fn send(&self, message: ServerMessage) {
        if self.tx.send(message).is_err() {
            debug!(connection = %self.id, "send on closed connection channel");
        }
    }
}

/// GET /ws upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<AppContext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(ctx, socket))
}

/// Per-connection task: frame pump around the message handler
async fn handle_socket(ctx: AppContext, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let conn = Connection::new(tx);
    info!(connection = %conn.id, "client connected");

    // Outbound half: serialize queued ServerMessages onto the socket
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!("failed to serialize outbound message: {e}");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Inbound half: parse and dispatch until the peer goes away
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => handle_client_message(&ctx, &conn, message).await,
                Err(e) => {
                    warn!(connection = %conn.id, "malformed message: {e}");
                    conn.send(ServerMessage::Error {
                        message: format!("malformed message: {e}"),
                    });
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // binary/ping/pong frames carry nothing in this protocol
            Err(e) => {
                debug!(connection = %conn.id, "socket error: {e}");
                break;
            }
        }
    }

    ctx.registry.unsubscribe(conn.id);
    send_task.abort();
    info!(connection = %conn.id, "client disconnected");
}

/// Dispatch one parsed client message
///
/// This is the failure boundary: errors from the store layer become an
/// error ack to the sender and go no further.
pub async fn handle_client_message(ctx: &AppContext, conn: &Connection, message: ClientMessage) {
    let result = match message {
        ClientMessage::JoinMitplan { mitplan_id } => handle_join(ctx, conn, &mitplan_id).await,
        ClientMessage::StateUpdate { mitplan_id, state } => {
            handle_state_update(ctx, conn, &mitplan_id, state).await
        }
    };

    if let Err(e) = result {
        error!(connection = %conn.id, "message handling failed: {e}");
        conn.send(ServerMessage::ack_error("internal server error"));
    }
}

/// joinMitplan: subscribe, load, reply with the current document
async fn handle_join(ctx: &AppContext, conn: &Connection, mitplan_id: &str) -> Result<()> {
    let newly_added = ctx.registry.subscribe(conn.id, mitplan_id, conn.tx.clone());

    match ctx.store.load(mitplan_id).await {
        Ok(Some(state)) => {
            info!(connection = %conn.id, mitplan_id, "joined mitplan");
            conn.send(ServerMessage::ack_ok());
            conn.send(ServerMessage::MitplanState {
                mitplan_id: mitplan_id.to_string(),
                state,
            });
            Ok(())
        }
        Ok(None) => {
            // Roll back only a membership this join created; a failed
            // re-join must not evict an existing subscription
            if newly_added {
                ctx.registry.unsubscribe_from(conn.id, mitplan_id);
            }
            warn!(connection = %conn.id, mitplan_id, "join rejected, mitplan not found");
            conn.send(ServerMessage::ack_error("Mitplan not found"));
            Ok(())
        }
        Err(e) => {
            if newly_added {
                ctx.registry.unsubscribe_from(conn.id, mitplan_id);
            }
            Err(e)
        }
    }
}

/// stateUpdate: validate membership, clamp, commit, broadcast to the room
async fn handle_state_update(
    ctx: &AppContext,
    conn: &Connection,
    mitplan_id: &str,
    mut state: Mitplan,
) -> Result<()> {
    if !ctx.registry.is_subscribed(conn.id, mitplan_id) {
        warn!(connection = %conn.id, mitplan_id, "state update from non-subscriber rejected");
        conn.send(ServerMessage::ack_error(format!(
            "not subscribed to mitplan {mitplan_id}"
        )));
        return Ok(());
    }

    state.clamp_timestamps();
    ctx.store.commit(mitplan_id, &state).await?;

    let delivered = ctx.registry.broadcast(
        mitplan_id,
        &ServerMessage::StateUpdate {
            mitplan_id: mitplan_id.to_string(),
            state,
        },
    );
    debug!(connection = %conn.id, mitplan_id, delivered, "state update broadcast");
    Ok(())
}
