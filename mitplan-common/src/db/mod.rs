//! Database layer: the durable, authoritative store of mitplan state

pub mod init;
pub mod queries;

pub use init::init_database;
