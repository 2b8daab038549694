//! Typed lookups against the groupware directories.
//!
//! The backend has no "what is this email?" endpoint: internal users and
//! groups are found by probing two directories with an email filter.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::GroupwareClient;
use crate::error::GroupwareResult;

/// Email-keyed lookups used to classify group members.
///
/// Lookups are side-effect free and may run concurrently for different
/// emails. An email matching several entries is logged and reported as
/// unresolved rather than failing.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Id of the internal user owning `email`, if exactly one matches.
    async fn find_internal_user_id(&self, email: &str) -> GroupwareResult<Option<String>>;

    /// Id of the group whose address is `email`, if exactly one matches.
    async fn find_group_id(&self, email: &str) -> GroupwareResult<Option<String>>;
}

/// Reduce a lookup result to a single id; more than one match is ambiguous.
pub(crate) fn single_match<I>(kind: &str, email: &str, ids: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut ids = ids.into_iter();
    let first = ids.next();
    let extra = ids.count();

    match first {
        None => {
            debug!(kind, email, "No directory entry for email");
            None
        }
        Some(_) if extra > 0 => {
            warn!(
                kind,
                email,
                matches = extra + 1,
                "Ambiguous directory state: several entries share this email, treating as unresolved"
            );
            None
        }
        Some(id) => Some(id),
    }
}

#[async_trait]
impl DirectoryLookup for GroupwareClient {
    async fn find_internal_user_id(&self, email: &str) -> GroupwareResult<Option<String>> {
        let users = self.find_users_by_email(email).await?;
        Ok(single_match("user", email, users.into_iter().map(|u| u.id)))
    }

    async fn find_group_id(&self, email: &str) -> GroupwareResult<Option<String>> {
        let groups = self.find_groups_by_email(email).await?;
        Ok(single_match("group", email, groups.into_iter().map(|g| g.id)))
    }
}
