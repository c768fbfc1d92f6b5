//! Persistence layer for stock exports
//!
//! Exports never touch the database; their only storage is the local
//! scratch directory.

pub mod scratch;

pub use scratch::{ScratchDir, ScratchError, TemporaryArtifact};
