//! Store inspection tools.
//!
//! Read-only views of the named stores. Stores are only ever deleted by
//! activation.

pub mod get;
pub mod list;

pub use get::{StoreGetOutput, StoreGetParams, get_impl};
pub use list::{StoreListOutput, list_impl};
