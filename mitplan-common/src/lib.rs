//! # Mitplan Common Library
//!
//! Shared code for the mitplan synchronization service:
//! - Document model (Mitplan, Sheet, AssignmentEvent, Roster)
//! - Built-in encounter reference data
//! - Plan identifier generator
//! - Database initialization and queries
//! - Configuration resolution
//! - Error types

pub mod config;
pub mod db;
pub mod encounters;
pub mod error;
pub mod idgen;
pub mod model;

pub use error::{Error, Result};
