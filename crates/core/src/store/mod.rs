//! SQLite-backed named response stores.
//!
//! This module provides persistent, versioned stores keyed by canonical
//! request, using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Deterministic store names derived from a version tag and a role
//! - Request keys hashed with SHA-256
//! - Automatic schema migrations
//! - Wholesale store deletion (the only invalidation mechanism)

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod names;

pub use crate::Error;

pub use connection::StoreDb;
pub use names::{StoreNames, StoreRole, VersionTag};
