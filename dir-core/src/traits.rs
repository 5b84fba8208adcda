//! Traits implemented by directory provider connectors.

use crate::types::DirectorySnapshot;
use async_trait::async_trait;

/// A read-only view onto an external organizational directory.
///
/// Implementations fetch the current roster of users and groups and return
/// it as a [`DirectorySnapshot`]. Repeated calls against an unchanged remote
/// directory yield set-equal snapshots; the operation is read-only and
/// leaves no partial side effects on failure.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    type Error;

    /// Fetch the complete roster. `force_group_refresh` widens the decision
    /// to re-fetch per-group membership detail; it carries no caching
    /// semantics of its own.
    async fn fetch_snapshot(
        &self,
        force_group_refresh: bool
    ) -> Result<DirectorySnapshot, Self::Error>;
}
