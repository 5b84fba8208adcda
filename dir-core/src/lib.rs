//! # Directory Core
//!
//! Shared types and traits for directory synchronization.
//!
//! This crate provides:
//! - The provider-agnostic entry model (`UserEntry`, `GroupEntry`,
//!   `DirectorySnapshot`) that downstream reconciliation consumes
//! - The `DirectoryService` trait implemented by provider connectors
//! - The caller session context checked before any provider call

pub mod traits;
pub mod types;

pub use traits::DirectoryService;
pub use types::{DirectorySnapshot, GroupEntry, SessionState, UserEntry};
