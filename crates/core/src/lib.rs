//! Core types and shared functionality for offgrid.
//!
//! This crate provides:
//! - Named, versioned response stores with a SQLite backend
//! - The request/response envelope model shared by the engine and server
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use model::{InterceptedRequest, RequestMode, ResponseEnvelope, ResponseKind};
pub use store::{StoreDb, StoreNames, StoreRole, VersionTag};
