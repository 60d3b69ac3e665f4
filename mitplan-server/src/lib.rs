//! # Mitplan Synchronization Server
//!
//! Real-time collaborative state synchronization for mitplans. Clients
//! connect over WebSocket, subscribe to a mitplan id, and exchange
//! whole-document state updates that are persisted write-through (hot
//! cache + durable store) and fanned out to every subscriber of that
//! mitplan. A small HTTP surface covers out-of-band operations (create,
//! force-save).

pub mod api;
pub mod cache;
pub mod gateway;
pub mod messages;
pub mod registry;
pub mod server;
pub mod store;
