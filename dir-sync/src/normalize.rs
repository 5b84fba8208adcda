//! Mapping of raw provider records into canonical entries.
//!
//! Records dropped here are a deliberate filtering policy, not errors: a
//! non-deleted user without an email never reaches the snapshot, and group
//! members outside role `member` / status `active` (or of an unrecognized
//! type) are excluded silently. A deleted user is kept even without an
//! email so downstream reconciliation sees the tombstone.

use crate::google::{RawGroup, RawMember, RawUser};
use dir_core::{GroupEntry, UserEntry};

const MEMBER_ROLE: &str = "member";
const MEMBER_STATUS: &str = "active";

/// Map a raw user record. `deleted` marks records sourced from the
/// deleted-accounts listing. Returns `None` when the record must be dropped.
pub fn normalize_user(user: RawUser, deleted: bool) -> Option<UserEntry> {
    let email = user.primary_email.unwrap_or_default();
    if email.trim().is_empty() && !deleted {
        return None;
    }

    Some(UserEntry {
        reference_id: user.id.clone(),
        external_id: user.id,
        email,
        disabled: user.suspended.unwrap_or(false),
        deleted
    })
}

/// Map a raw group and its raw membership into a group entry, partitioning
/// members into user and nested-group sets under the role/status filter.
pub fn normalize_group(group: RawGroup, members: Vec<RawMember>) -> GroupEntry {
    let mut entry = GroupEntry::new(group.id, group.name);

    for member in members {
        if !member.role.eq_ignore_ascii_case(MEMBER_ROLE)
            || !member.status.eq_ignore_ascii_case(MEMBER_STATUS)
        {
            continue;
        }

        if member.member_type.eq_ignore_ascii_case("user") {
            entry.user_member_external_ids.insert(member.id);
        } else if member.member_type.eq_ignore_ascii_case("group") {
            entry.group_member_reference_ids.insert(member.id);
        }
    }

    entry
}
