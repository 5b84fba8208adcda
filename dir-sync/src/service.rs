use crate::config::DirectorySettings;
use crate::error::{DirSyncError, DirSyncResult};
use crate::google::{DirectoryClient, RawMember};
use crate::normalize::{normalize_group, normalize_user};
use crate::pages::page_stream;
use async_trait::async_trait;
use dir_core::{DirectoryService, DirectorySnapshot, GroupEntry, SessionState, UserEntry};
use futures_util::{TryStreamExt, pin_mut};
use std::sync::Arc;
use tracing::{debug, info};

/// Assembles a [`DirectorySnapshot`] from the provider's user and group
/// listings.
///
/// Stateless per call: no caching between calls, no internal retries, and
/// any fetch failure aborts the whole operation without a partial result.
pub struct DirectorySnapshotService {
    settings: DirectorySettings,
    session: SessionState,
    client: Arc<dyn DirectoryClient>
}

impl DirectorySnapshotService {
    pub fn new(
        settings: DirectorySettings,
        session: SessionState,
        client: Arc<dyn DirectoryClient>
    ) -> Self {
        Self {
            settings,
            session,
            client
        }
    }

    /// Fetch the current roster.
    ///
    /// Membership detail is re-fetched for every group when
    /// `force_group_refresh` is set or when the user phase surfaced at least
    /// one active, non-deleted user; otherwise groups are listed with empty
    /// member sets.
    pub async fn fetch_snapshot(
        &self,
        force_group_refresh: bool
    ) -> DirSyncResult<DirectorySnapshot> {
        if !self.session.ready() {
            return Err(DirSyncError::NotAuthenticated);
        }
        if self.settings.server.is_none() {
            return Err(DirSyncError::MissingServerConfig);
        }
        let sync = self
            .settings
            .sync
            .as_ref()
            .ok_or(DirSyncError::MissingSyncConfig)?
            .clone();

        let users = if sync.sync_users {
            let mut entries = self.fetch_users(sync.user_filter.as_deref(), false).await?;
            entries.extend(self.fetch_users(sync.user_filter.as_deref(), true).await?);
            info!(count = entries.len(), "Fetched users from directory");
            Some(entries)
        } else {
            None
        };

        let groups = if sync.sync_groups {
            let refresh_members = force_group_refresh
                || users
                    .as_ref()
                    .is_some_and(|entries| entries.iter().any(UserEntry::is_active));
            let entries = self
                .fetch_groups(sync.group_filter.as_deref(), refresh_members)
                .await?;
            info!(
                count = entries.len(),
                refresh_members, "Fetched groups from directory"
            );
            Some(entries)
        } else {
            None
        };

        Ok(DirectorySnapshot { groups, users })
    }

    async fn fetch_users(
        &self,
        filter: Option<&str>,
        deleted: bool
    ) -> DirSyncResult<Vec<UserEntry>> {
        let client = Arc::clone(&self.client);
        let filter = filter.map(str::to_string);
        let stream = page_stream(move |token: Option<String>| {
            let client = Arc::clone(&client);
            let filter = filter.clone();
            async move {
                client
                    .list_users(filter.as_deref(), deleted, token.as_deref())
                    .await
            }
        });
        pin_mut!(stream);

        let mut entries = Vec::new();
        while let Some(user) = stream.try_next().await? {
            if let Some(entry) = normalize_user(user, deleted) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn fetch_groups(
        &self,
        filter: Option<&str>,
        refresh_members: bool
    ) -> DirSyncResult<Vec<GroupEntry>> {
        let client = Arc::clone(&self.client);
        let filter = filter.map(str::to_string);
        let stream = page_stream(move |token: Option<String>| {
            let client = Arc::clone(&client);
            let filter = filter.clone();
            async move { client.list_groups(filter.as_deref(), token.as_deref()).await }
        });
        pin_mut!(stream);

        let mut entries = Vec::new();
        while let Some(group) = stream.try_next().await? {
            let members = if refresh_members {
                self.fetch_members(&group.id).await?
            } else {
                Vec::new()
            };
            debug!(group_id = %group.id, members = members.len(), "Normalizing group");
            entries.push(normalize_group(group, members));
        }
        Ok(entries)
    }

    async fn fetch_members(&self, group_id: &str) -> DirSyncResult<Vec<RawMember>> {
        let client = Arc::clone(&self.client);
        let group_id = group_id.to_string();
        page_stream(move |token: Option<String>| {
            let client = Arc::clone(&client);
            let group_id = group_id.clone();
            async move {
                client
                    .list_group_members(&group_id, token.as_deref())
                    .await
            }
        })
        .try_collect()
        .await
    }
}

#[async_trait]
impl DirectoryService for DirectorySnapshotService {
    type Error = DirSyncError;

    async fn fetch_snapshot(
        &self,
        force_group_refresh: bool
    ) -> Result<DirectorySnapshot, DirSyncError> {
        DirectorySnapshotService::fetch_snapshot(self, force_group_refresh).await
    }
}
