use crate::config::GSuiteConfig;
use crate::credentials::ServiceAccountTokens;
use crate::error::{DirSyncError, DirSyncResult};
use crate::pages::Page;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://admin.googleapis.com/admin/directory/v1";
const PAGE_SIZE: u32 = 200;

/// Read-only slice of the directory provider's list API.
///
/// The snapshot service takes this as `Arc<dyn DirectoryClient>` so tests
/// can substitute a stub provider.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn list_users(
        &self,
        query: Option<&str>,
        show_deleted: bool,
        page_token: Option<&str>
    ) -> DirSyncResult<UserPage>;

    async fn list_groups(
        &self,
        query: Option<&str>,
        page_token: Option<&str>
    ) -> DirSyncResult<GroupPage>;

    async fn list_group_members(
        &self,
        group_id: &str,
        page_token: Option<&str>
    ) -> DirSyncResult<MemberPage>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: String,
    /// Absent on records returned by the deleted-accounts listing.
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub suspended: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    pub id: String,
    pub name: String
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMember {
    pub id: String,
    #[serde(rename = "type", default)]
    pub member_type: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<RawUser>,
    pub next_page_token: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPage {
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    pub next_page_token: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPage {
    #[serde(default)]
    pub members: Vec<RawMember>,
    pub next_page_token: Option<String>
}

impl Page for UserPage {
    type Item = RawUser;

    fn next_page_token(&self) -> Option<String> {
        self.next_page_token.clone()
    }

    fn into_items(self) -> Vec<RawUser> {
        self.users
    }
}

impl Page for GroupPage {
    type Item = RawGroup;

    fn next_page_token(&self) -> Option<String> {
        self.next_page_token.clone()
    }

    fn into_items(self) -> Vec<RawGroup> {
        self.groups
    }
}

impl Page for MemberPage {
    type Item = RawMember;

    fn next_page_token(&self) -> Option<String> {
        self.next_page_token.clone()
    }

    fn into_items(self) -> Vec<RawMember> {
        self.members
    }
}

/// Admin SDK Directory API client authenticated through a service account
/// with domain-wide delegation.
pub struct GoogleDirectoryClient {
    http: Client,
    config: GSuiteConfig,
    tokens: ServiceAccountTokens,
    base_url: String
}

impl GoogleDirectoryClient {
    /// Build the client and validate the credential document. Fails without
    /// issuing any network call if the credential material is unusable.
    pub fn new(config: GSuiteConfig) -> DirSyncResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(DirSyncError::Http)?;

        let tokens =
            ServiceAccountTokens::new(&config.service_account, &config.admin_user, http.clone())?;

        Ok(Self {
            http,
            config,
            tokens,
            base_url: DEFAULT_BASE_URL.to_string()
        })
    }

    /// Point the client at a different Admin SDK base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn scope_params(&self) -> String {
        let mut params = format!("&domain={}", urlencoding::encode(&self.config.domain));
        if let Some(customer) = &self.config.customer {
            params.push_str(&format!("&customer={}", urlencoding::encode(customer)));
        }
        params
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> DirSyncResult<T> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Making Admin SDK request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.json::<T>().await?;
                Ok(body)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(DirSyncError::RateLimited {
                    retry_after_seconds: retry_after
                })
            }
            StatusCode::UNAUTHORIZED => {
                self.tokens.invalidate().await;
                Err(DirSyncError::Authentication(
                    "directory rejected the access token".to_string()
                ))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(DirSyncError::Api {
                    status: status.as_u16(),
                    message: body
                })
            }
        }
    }
}

#[async_trait]
impl DirectoryClient for GoogleDirectoryClient {
    async fn list_users(
        &self,
        query: Option<&str>,
        show_deleted: bool,
        page_token: Option<&str>
    ) -> DirSyncResult<UserPage> {
        let mut path = format!("/users?maxResults={}{}", PAGE_SIZE, self.scope_params());
        if let Some(query) = query {
            path.push_str(&format!("&query={}", urlencoding::encode(query)));
        }
        if show_deleted {
            path.push_str("&showDeleted=true");
        }
        if let Some(token) = page_token {
            path.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        self.get(&path).await
    }

    async fn list_groups(
        &self,
        query: Option<&str>,
        page_token: Option<&str>
    ) -> DirSyncResult<GroupPage> {
        let mut path = format!("/groups?maxResults={}{}", PAGE_SIZE, self.scope_params());
        if let Some(query) = query {
            path.push_str(&format!("&query={}", urlencoding::encode(query)));
        }
        if let Some(token) = page_token {
            path.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        self.get(&path).await
    }

    async fn list_group_members(
        &self,
        group_id: &str,
        page_token: Option<&str>
    ) -> DirSyncResult<MemberPage> {
        let mut path = format!(
            "/groups/{}/members?maxResults={}",
            urlencoding::encode(group_id),
            PAGE_SIZE
        );
        if let Some(token) = page_token {
            path.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        self.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_page_deserialization() {
        let page: UserPage = serde_json::from_str(
            r#"{
                "users": [
                    {"id": "u1", "primaryEmail": "a@example.com", "suspended": false},
                    {"id": "u2", "suspended": true}
                ],
                "nextPageToken": "abc"
            }"#
        )
        .unwrap();

        assert_eq!(page.users.len(), 2);
        assert_eq!(page.users[0].primary_email.as_deref(), Some("a@example.com"));
        assert!(page.users[1].primary_email.is_none());
        assert_eq!(page.users[1].suspended, Some(true));
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_listing_omits_collection() {
        let page: UserPage = serde_json::from_str(r#"{"kind": "admin#directory#users"}"#).unwrap();
        assert!(page.users.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_member_page_deserialization() {
        let page: MemberPage = serde_json::from_str(
            r#"{
                "members": [
                    {"id": "m1", "type": "USER", "role": "MEMBER", "status": "ACTIVE"},
                    {"id": "m2", "type": "GROUP", "role": "MEMBER", "status": "ACTIVE"},
                    {"id": "m3"}
                ]
            }"#
        )
        .unwrap();

        assert_eq!(page.members.len(), 3);
        assert_eq!(page.members[0].member_type, "USER");
        assert_eq!(page.members[1].member_type, "GROUP");
        assert!(page.members[2].member_type.is_empty());
        assert!(page.members[2].role.is_empty());
    }

    #[test]
    fn test_group_page_items_keep_arrival_order() {
        let page: GroupPage = serde_json::from_str(
            r#"{
                "groups": [
                    {"id": "g2", "name": "Two"},
                    {"id": "g1", "name": "One"}
                ]
            }"#
        )
        .unwrap();

        let ids: Vec<String> = page.into_items().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["g2", "g1"]);
    }
}
