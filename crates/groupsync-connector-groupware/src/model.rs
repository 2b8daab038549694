//! Wire types of the groupware group API.

use serde::{Deserialize, Serialize};

/// Kind of group member, as tagged by the backend's `objectType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Account in the platform's own user directory.
    User,
    /// Bare external email address.
    Email,
    /// Nested group.
    Group,
}

impl ObjectType {
    /// Get the string representation used on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::User => "user",
            ObjectType::Email => "email",
            ObjectType::Group => "group",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group summary returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

/// Full group object returned by the email lookup and by create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub creator: Option<String>,
}

/// Entry of the user directory, as returned by the email lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserItem {
    pub id: String,
}

/// Denormalised user attached to a `user` member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "preferredEmail", default)]
    pub preferred_email: Option<String>,
}

/// Denormalised group attached to a `group` member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProfile {
    #[serde(default)]
    pub email: Option<String>,
}

/// A member of a group as listed by the members endpoint.
///
/// Each kind carries a differently shaped payload; [`MemberRecord::email`]
/// is the shared way to read the address the member is known by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "objectType", rename_all = "lowercase")]
pub enum MemberRecord {
    User {
        id: String,
        #[serde(default)]
        member: Option<UserProfile>,
    },
    Email {
        id: String,
        /// The external address; older records only carry it as `id`.
        #[serde(default)]
        member: Option<String>,
    },
    Group {
        id: String,
        #[serde(default)]
        member: Option<GroupProfile>,
    },
}

impl MemberRecord {
    /// Opaque identifier assigned by the backend.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            MemberRecord::User { id, .. }
            | MemberRecord::Email { id, .. }
            | MemberRecord::Group { id, .. } => id,
        }
    }

    #[must_use]
    pub fn object_type(&self) -> ObjectType {
        match self {
            MemberRecord::User { .. } => ObjectType::User,
            MemberRecord::Email { .. } => ObjectType::Email,
            MemberRecord::Group { .. } => ObjectType::Group,
        }
    }

    /// Email address of the member.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            MemberRecord::User { member, .. } => {
                member.as_ref().and_then(|m| m.preferred_email.as_deref())
            }
            MemberRecord::Email { id, member } => member.as_deref().or(Some(id)),
            MemberRecord::Group { member, .. } => member.as_ref().and_then(|m| m.email.as_deref()),
        }
    }
}

/// Typed pointer to a member, as required by the write API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "objectType", rename_all = "lowercase")]
pub enum MembershipReference {
    User { id: String },
    Email { id: String },
    Group { id: String },
}

impl MembershipReference {
    pub fn user(id: impl Into<String>) -> Self {
        MembershipReference::User { id: id.into() }
    }

    pub fn email(email: impl Into<String>) -> Self {
        MembershipReference::Email { id: email.into() }
    }

    pub fn group(id: impl Into<String>) -> Self {
        MembershipReference::Group { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            MembershipReference::User { id }
            | MembershipReference::Email { id }
            | MembershipReference::Group { id } => id,
        }
    }

    #[must_use]
    pub fn object_type(&self) -> ObjectType {
        match self {
            MembershipReference::User { .. } => ObjectType::User,
            MembershipReference::Email { .. } => ObjectType::Email,
            MembershipReference::Group { .. } => ObjectType::Group,
        }
    }
}

/// Body of the create and update-base-fields calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    /// Omitted on update so the backend leaves memberships alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<MembershipReference>>,
}

/// Membership batch action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipAction {
    Add,
    Remove,
}

impl MembershipAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipAction::Add => "add",
            MembershipAction::Remove => "remove",
        }
    }
}
