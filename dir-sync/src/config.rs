use crate::credentials::ServiceAccountKey;
use serde::{Deserialize, Serialize};

/// Connection configuration for a Google Workspace directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GSuiteConfig {
    /// Primary domain to list against.
    pub domain: String,
    /// Customer id; falls back to the domain scope when absent.
    #[serde(default)]
    pub customer: Option<String>,
    /// Admin identity impersonated through domain-wide delegation.
    pub admin_user: String,
    /// Parsed service account credential document.
    pub service_account: ServiceAccountKey
}

/// Which entity types to fetch and the optional provider-side filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub sync_users: bool,
    pub sync_groups: bool,
    /// Free-text query applied to both the active and deleted user listings.
    #[serde(default)]
    pub user_filter: Option<String>,
    #[serde(default)]
    pub group_filter: Option<String>
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_users: true,
            sync_groups: true,
            user_filter: None,
            group_filter: None
        }
    }
}

/// Top-level settings handed to the snapshot service.
///
/// Either section may be absent; the snapshot service surfaces a distinct
/// configuration error for each before issuing any provider call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySettings {
    #[serde(default)]
    pub server: Option<GSuiteConfig>,
    #[serde(default)]
    pub sync: Option<SyncConfig>
}
