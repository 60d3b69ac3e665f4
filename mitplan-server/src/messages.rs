//! Wire messages for the synchronization gateway
//!
//! JSON text frames, discriminated by a `type` field. Names match the
//! client protocol: `joinMitplan` / `stateUpdate` inbound; `ack`,
//! `mitplanState`, `stateUpdate`, `error` outbound.

use mitplan_common::model::Mitplan;
use serde::{Deserialize, Serialize};

/// Messages a client may send over the WebSocket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Subscribe to a mitplan and request its current document
    #[serde(rename_all = "camelCase")]
    JoinMitplan { mitplan_id: String },

    /// Replace the mitplan document wholesale (last write wins)
    #[serde(rename_all = "camelCase")]
    StateUpdate { mitplan_id: String, state: Mitplan },
}

/// Messages the server pushes to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Outcome of the sender's last request
    Ack {
        status: AckStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Full document sent to a connection that just joined
    #[serde(rename_all = "camelCase")]
    MitplanState { mitplan_id: String, state: Mitplan },

    /// Full document broadcast to every subscriber after a commit
    #[serde(rename_all = "camelCase")]
    StateUpdate { mitplan_id: String, state: Mitplan },

    /// Malformed-frame report, delivered to the sender only
    Error { message: String },
}

/// Request outcome carried by ack frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
    Error,
}

impl ServerMessage {
    pub fn ack_ok() -> Self {
        ServerMessage::Ack {
            status: AckStatus::Ok,
            message: None,
        }
    }

    pub fn ack_error(message: impl Into<String>) -> Self {
        ServerMessage::Ack {
            status: AckStatus::Error,
            message: Some(message.into()),
        }
    }
}
