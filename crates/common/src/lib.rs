//! Common types, protocol definitions, and errors shared across `note-vault` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
