//! Core types shared across the snapshot engine.

pub mod error;

pub use error::SnapshotError;
