//! Identity resolution for membership changes.
//!
//! The write API wants typed member references, but the synchronization
//! engine only knows email addresses. Each email is looked up in the user and
//! group directories; whatever is found nowhere is an external email.

use std::collections::BTreeSet;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEFAULT_LOOKUP_CONCURRENCY;
use crate::directory::DirectoryLookup;
use crate::error::GroupwareResult;
use crate::model::MembershipReference;

/// Whether a member is being added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Remove,
}

impl Direction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Add => "add",
            Direction::Remove => "remove",
        }
    }
}

/// Lookup order used to classify an email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Internal user, then group, then plain email.
    #[default]
    UserGroupEmail,
    /// Group, then plain email. Internal users are added as plain emails.
    GroupEmail,
}

/// Classifies emails into membership references.
///
/// Removals always use [`ResolutionPolicy::UserGroupEmail`]: a member stored
/// as a user can only be removed through a user reference.
pub struct IdentityResolver<'a, D: DirectoryLookup + ?Sized> {
    directory: &'a D,
    add_policy: ResolutionPolicy,
    concurrency: usize,
}

impl<'a, D: DirectoryLookup + ?Sized> IdentityResolver<'a, D> {
    pub fn new(directory: &'a D, add_policy: ResolutionPolicy) -> Self {
        Self {
            directory,
            add_policy,
            concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }

    /// Limit how many emails are resolved at once in [`Self::resolve_all`].
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    fn policy(&self, direction: Direction) -> ResolutionPolicy {
        match direction {
            Direction::Add => self.add_policy,
            Direction::Remove => ResolutionPolicy::UserGroupEmail,
        }
    }

    /// Classify one email.
    ///
    /// Unresolved or ambiguous lookups fall through to the next lookup.
    /// Transport failures are returned as errors.
    pub async fn resolve(
        &self,
        email: &str,
        direction: Direction,
    ) -> GroupwareResult<MembershipReference> {
        let reference = match self.policy(direction) {
            ResolutionPolicy::UserGroupEmail => {
                match self.directory.find_internal_user_id(email).await? {
                    Some(id) => MembershipReference::user(id),
                    None => self.group_or_email(email).await?,
                }
            }
            ResolutionPolicy::GroupEmail => self.group_or_email(email).await?,
        };

        debug!(
            email,
            direction = direction.as_str(),
            object_type = %reference.object_type(),
            "Resolved member"
        );
        Ok(reference)
    }

    async fn group_or_email(&self, email: &str) -> GroupwareResult<MembershipReference> {
        Ok(match self.directory.find_group_id(email).await? {
            Some(id) => MembershipReference::group(id),
            None => MembershipReference::email(email),
        })
    }

    /// Classify a batch of emails.
    ///
    /// At most `concurrency` emails are resolved at a time; the result follows
    /// the set's order. The first failure fails the batch.
    pub async fn resolve_all(
        &self,
        emails: &BTreeSet<String>,
        direction: Direction,
    ) -> GroupwareResult<Vec<MembershipReference>> {
        let lookups: Vec<_> = emails
            .iter()
            .map(|email| self.resolve(email, direction))
            .collect();
        stream::iter(lookups)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}
