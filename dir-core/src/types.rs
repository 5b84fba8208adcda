use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A user as reported by the directory provider, reduced to the fields the
/// downstream reconciliation engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    /// Stable local-facing identifier. Populated from the provider's native
    /// user id; downstream stores may diverge from `external_id` later.
    pub reference_id: String,
    /// The provider's native user id.
    pub external_id: String,
    /// Primary email. May be blank only on a deletion tombstone.
    pub email: String,
    /// Provider-reported suspension state.
    pub disabled: bool,
    /// True only when the entry was sourced from a deleted-accounts query.
    pub deleted: bool
}

impl UserEntry {
    /// A user that is neither deleted nor disabled. Presence of at least one
    /// active user in a fetch triggers a full group-membership refresh.
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.disabled
    }
}

/// A group with its direct members, split by member kind.
///
/// Nested-group edges are recorded exactly as the provider reports them.
/// Cycles (including self-reference) are possible and are not resolved here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub reference_id: String,
    /// The provider's native group id.
    pub external_id: String,
    pub name: String,
    /// Ids of direct user members, referencing `UserEntry::external_id`.
    pub user_member_external_ids: HashSet<String>,
    /// Ids of direct nested-group members, referencing other groups'
    /// `reference_id`.
    pub group_member_reference_ids: HashSet<String>
}

impl GroupEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            reference_id: id.clone(),
            external_id: id,
            name: name.into(),
            user_member_external_ids: HashSet::new(),
            group_member_reference_ids: HashSet::new()
        }
    }
}

/// The complete result of one fetch against the directory provider.
///
/// A collection is `None` when syncing of that entity type is disabled,
/// never merely empty. The snapshot has no identity beyond the single call;
/// ownership transfers entirely to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub groups: Option<Vec<GroupEntry>>,
    pub users: Option<Vec<UserEntry>>
}

/// Authentication and organization context of the calling application.
///
/// Supplied by the embedding application's session layer; this crate only
/// checks it, it never mutates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub authenticated: bool,
    pub organization_set: bool
}

impl SessionState {
    pub fn ready(&self) -> bool {
        self.authenticated && self.organization_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_entry_is_active() {
        let mut user = UserEntry {
            reference_id: "u1".to_string(),
            external_id: "u1".to_string(),
            email: "a@example.com".to_string(),
            disabled: false,
            deleted: false
        };
        assert!(user.is_active());

        user.disabled = true;
        assert!(!user.is_active());

        user.disabled = false;
        user.deleted = true;
        assert!(!user.is_active());
    }

    #[test]
    fn test_group_entry_new_mirrors_id() {
        let group = GroupEntry::new("g1", "Engineering");
        assert_eq!(group.reference_id, "g1");
        assert_eq!(group.external_id, "g1");
        assert!(group.user_member_external_ids.is_empty());
        assert!(group.group_member_reference_ids.is_empty());
    }

    #[test]
    fn test_snapshot_serialization_keeps_absent_collections() {
        let snapshot = DirectorySnapshot {
            groups: None,
            users: Some(vec![])
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: DirectorySnapshot = serde_json::from_str(&json).unwrap();
        assert!(back.groups.is_none());
        assert_eq!(back.users, Some(vec![]));
    }

    #[test]
    fn test_session_state_ready() {
        assert!(!SessionState::default().ready());
        assert!(
            SessionState {
                authenticated: true,
                organization_set: true
            }
            .ready()
        );
        assert!(
            !SessionState {
                authenticated: true,
                organization_set: false
            }
            .ready()
        );
    }
}
