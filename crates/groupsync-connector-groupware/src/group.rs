//! Group state as seen by the reconciler.
//!
//! A [`GroupSnapshot`] is read from the backend and never mutated; a
//! [`DesiredGroup`] is derived from it (or from a create request) for a single
//! reconciliation and dropped afterwards.

use std::collections::BTreeSet;

use groupsync_connector::error::{ConnectorError, ConnectorResult};
use groupsync_connector::operation::AttributeSet;
use tracing::warn;

use crate::diff::{desired_members, MembershipDiff};
use crate::model::{Group, GroupPayload, MemberRecord};

/// Attribute holding the backend id.
pub const ATTR_ID: &str = "id";
/// Attribute holding the display name.
pub const ATTR_NAME: &str = "name";
/// Attribute holding the group address; also the pivot.
pub const ATTR_EMAIL: &str = "email";
/// Attribute holding member email addresses.
pub const ATTR_MEMBERS: &str = "members";
/// Read-only attribute naming who created the group.
pub const ATTR_CREATOR: &str = "creator";

/// Current state of a group on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub creator: Option<String>,
    pub members: BTreeSet<String>,
}

impl GroupSnapshot {
    /// Build a snapshot from a fetched group and its member records.
    ///
    /// Members without a known address cannot take part in an email diff and
    /// are skipped.
    pub fn from_parts(group: Group, records: &[MemberRecord]) -> Self {
        let mut members = BTreeSet::new();
        for record in records {
            match record.email() {
                Some(email) => {
                    members.insert(email.to_string());
                }
                None => warn!(
                    group = %group.email,
                    member_id = record.id(),
                    object_type = %record.object_type(),
                    "Skipping member without email"
                ),
            }
        }

        Self {
            id: group.id,
            name: group.name,
            email: group.email,
            creator: group.creator,
            members,
        }
    }

    /// Attributes exposed to the synchronization engine.
    ///
    /// `creator` is informational; change requests never write it.
    pub fn to_attributes(&self) -> AttributeSet {
        AttributeSet::new()
            .with(ATTR_ID, self.id.as_str())
            .with(ATTR_NAME, self.name.clone())
            .with(ATTR_EMAIL, self.email.as_str())
            .with(ATTR_CREATOR, self.creator.clone())
            .with(
                ATTR_MEMBERS,
                self.members.iter().cloned().collect::<Vec<_>>(),
            )
    }

    /// Desired state for an update request against this snapshot.
    ///
    /// Name and email not present in `attributes` keep their current values.
    /// An absent `members` attribute leaves memberships unchanged; a present
    /// but empty one removes every member.
    pub fn desired(&self, attributes: &AttributeSet) -> DesiredGroup {
        let requested = desired_members(attributes, ATTR_MEMBERS);
        let diff = MembershipDiff::against(&self.members, requested.as_ref());

        DesiredGroup {
            id: Some(self.id.clone()),
            name: non_blank(attributes, ATTR_NAME)
                .map(str::to_string)
                .or_else(|| self.name.clone()),
            email: non_blank(attributes, ATTR_EMAIL)
                .map_or_else(|| self.email.clone(), str::to_string),
            members: requested.unwrap_or_else(|| self.members.clone()),
            members_to_add: diff.to_add,
            members_to_remove: diff.to_remove,
        }
    }
}

/// Target state of one reconciliation request.
///
/// `id` is unset for a group that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: String,
    pub members: BTreeSet<String>,
    pub members_to_add: BTreeSet<String>,
    pub members_to_remove: BTreeSet<String>,
}

impl DesiredGroup {
    /// Desired state for a group that does not exist yet.
    ///
    /// Every requested member is to be added. Fails when `email` is missing.
    pub fn for_create(attributes: &AttributeSet) -> ConnectorResult<Self> {
        let email = non_blank(attributes, ATTR_EMAIL).ok_or_else(|| ConnectorError::InvalidData {
            message: "a group requires an email".to_string(),
        })?;
        let members = desired_members(attributes, ATTR_MEMBERS).unwrap_or_default();

        Ok(Self {
            id: None,
            name: non_blank(attributes, ATTR_NAME).map(str::to_string),
            email: email.to_string(),
            members_to_add: members.clone(),
            members,
            members_to_remove: BTreeSet::new(),
        })
    }

    #[must_use]
    pub fn is_create(&self) -> bool {
        self.id.is_none()
    }

    /// Body of the base-field write.
    ///
    /// Creation sends an empty member list and adds members in a separate
    /// batch; updates omit the list so memberships are left alone.
    #[must_use]
    pub fn payload(&self) -> GroupPayload {
        GroupPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            members: self.is_create().then(Vec::new),
        }
    }

    #[must_use]
    pub fn membership_diff(&self) -> MembershipDiff {
        MembershipDiff {
            to_add: self.members_to_add.clone(),
            to_remove: self.members_to_remove.clone(),
        }
    }
}

fn non_blank<'a>(attributes: &'a AttributeSet, name: &str) -> Option<&'a str> {
    attributes
        .get_string(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
