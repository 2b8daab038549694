//! Group reconciliation.
//!
//! Each request runs a short state machine that stops at the first failure:
//!
//! 1. fetch the current group by email (update/delete only)
//! 2. write the base fields (create or update)
//! 3. resolve and submit the add batch
//! 4. resolve and submit the remove batch
//!
//! Empty batches are never submitted: the backend reads an empty member list
//! as "remove everyone".

use std::collections::BTreeSet;
use std::sync::Arc;

use groupsync_connector::error::ConnectorResult;
use groupsync_connector::operation::AttributeSet;
use tracing::{debug, error, info, instrument};

use crate::client::GroupwareClient;
use crate::diff::MembershipDiff;
use crate::error::{GroupwareError, GroupwareResult};
use crate::group::{DesiredGroup, GroupSnapshot};
use crate::model::{Group, MembershipAction};
use crate::resolver::{Direction, IdentityResolver, ResolutionPolicy};

/// Outcome of looking a group up by its email.
#[derive(Debug)]
pub(crate) enum GroupLookup {
    Found(Group),
    NotFound,
    Ambiguous(usize),
}

pub(crate) async fn lookup_group(
    client: &GroupwareClient,
    email: &str,
) -> GroupwareResult<GroupLookup> {
    let mut groups = client.find_groups_by_email(email).await?;
    if groups.len() > 1 {
        return Ok(GroupLookup::Ambiguous(groups.len()));
    }
    Ok(groups.pop().map_or(GroupLookup::NotFound, GroupLookup::Found))
}

/// Applies create/update/delete requests to groups and their memberships.
///
/// Holds no per-request state; concurrent requests for different groups are
/// fine. Two concurrent requests for the same group race between fetch and
/// submit.
pub struct GroupReconciler {
    client: Arc<GroupwareClient>,
    add_policy: ResolutionPolicy,
    lookup_concurrency: usize,
}

impl GroupReconciler {
    pub fn new(
        client: Arc<GroupwareClient>,
        add_policy: ResolutionPolicy,
        lookup_concurrency: usize,
    ) -> Self {
        Self {
            client,
            add_policy,
            lookup_concurrency,
        }
    }

    /// Create a group, then add its members.
    #[instrument(skip(self, desired), fields(email = %desired.email))]
    pub async fn create(&self, desired: &DesiredGroup) -> ConnectorResult<bool> {
        report(&desired.email, "create", self.run_create(desired).await)
    }

    /// Update the group whose email is `pivot`.
    #[instrument(skip(self, attributes), fields(email = %pivot))]
    pub async fn update(&self, pivot: &str, attributes: &AttributeSet) -> ConnectorResult<bool> {
        report(pivot, "update", self.run_update(pivot, attributes).await)
    }

    /// Delete the group whose email is `pivot`.
    #[instrument(skip(self), fields(email = %pivot))]
    pub async fn delete(&self, pivot: &str) -> ConnectorResult<bool> {
        report(pivot, "delete", self.run_delete(pivot).await)
    }

    async fn run_create(&self, desired: &DesiredGroup) -> GroupwareResult<bool> {
        let created = self.client.create_group(&desired.payload()).await?;
        info!(group_id = %created.id, "Created group");

        self.apply_memberships(&created.id, &desired.membership_diff())
            .await?;
        Ok(true)
    }

    async fn run_update(&self, pivot: &str, attributes: &AttributeSet) -> GroupwareResult<bool> {
        let Some(current) = self.fetch_current(pivot).await? else {
            return Ok(false);
        };

        let desired = current.desired(attributes);
        self.client
            .update_group(&current.id, &desired.payload())
            .await?;
        debug!(group_id = %current.id, "Updated group base fields");

        self.apply_memberships(&current.id, &desired.membership_diff())
            .await?;
        Ok(true)
    }

    async fn run_delete(&self, pivot: &str) -> GroupwareResult<bool> {
        let Some(group) = self.find_group(pivot).await? else {
            return Ok(false);
        };

        self.client.delete_group(&group.id).await?;
        info!(group_id = %group.id, "Deleted group");
        Ok(true)
    }

    /// Find the single group owning `email`.
    ///
    /// Missing and ambiguous groups fail the request without raising an error.
    async fn find_group(&self, email: &str) -> GroupwareResult<Option<Group>> {
        match lookup_group(&self.client, email).await? {
            GroupLookup::Found(group) => Ok(Some(group)),
            GroupLookup::NotFound => {
                error!(email, "Group not found");
                Ok(None)
            }
            GroupLookup::Ambiguous(matches) => {
                error!(email, matches, "Several groups share this email");
                Ok(None)
            }
        }
    }

    async fn fetch_current(&self, email: &str) -> GroupwareResult<Option<GroupSnapshot>> {
        let Some(group) = self.find_group(email).await? else {
            return Ok(None);
        };

        let records = self.client.list_members(&group.id).await?;
        Ok(Some(GroupSnapshot::from_parts(group, &records)))
    }

    async fn apply_memberships(&self, group_id: &str, diff: &MembershipDiff) -> GroupwareResult<()> {
        self.submit(group_id, &diff.to_add, Direction::Add).await?;
        self.submit(group_id, &diff.to_remove, Direction::Remove)
            .await
    }

    async fn submit(
        &self,
        group_id: &str,
        emails: &BTreeSet<String>,
        direction: Direction,
    ) -> GroupwareResult<()> {
        if emails.is_empty() {
            debug!(group_id, direction = direction.as_str(), "No members to submit");
            return Ok(());
        }

        let resolver = IdentityResolver::new(self.client.as_ref(), self.add_policy)
            .with_concurrency(self.lookup_concurrency);
        let references = resolver.resolve_all(emails, direction).await?;

        let action = match direction {
            Direction::Add => MembershipAction::Add,
            Direction::Remove => MembershipAction::Remove,
        };
        self.client
            .update_members(group_id, action, &references)
            .await?;

        info!(
            group_id,
            action = action.as_str(),
            count = references.len(),
            "Submitted membership batch"
        );
        Ok(())
    }
}

/// Backend rejections become `false`; anything else is a communication error.
fn report(email: &str, operation: &str, result: GroupwareResult<bool>) -> ConnectorResult<bool> {
    match result {
        Ok(done) => Ok(done),
        Err(GroupwareError::Rejected {
            status,
            reason,
            body,
        }) => {
            error!(
                email,
                operation,
                status,
                reason = %reason,
                body = %body,
                "Groupware backend rejected request"
            );
            Ok(false)
        }
        Err(e) => {
            error!(email, operation, error = %e, "Groupware request failed");
            Err(e.into())
        }
    }
}
