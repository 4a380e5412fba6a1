//! Core types and trait definitions for the Folio writing organizer.
//!
//! This crate is deliberately free of database and filesystem dependencies.
//! The SQLite backend and the project session both depend on it.

pub mod connection;
pub mod details;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod narrative;
pub mod store;
pub mod template;
pub mod world;

pub use error::{Error, Result};
