//! Group service exposed to the synchronization engine.
//!
//! Groups are keyed by email. Reads go straight to the client; writes are
//! delegated to the [`GroupReconciler`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use groupsync_connector::config::ConnectorConfig;
use groupsync_connector::error::{ConnectorError, ConnectorResult};
use groupsync_connector::operation::AttributeSet;
use groupsync_connector::traits::{Connector, WritableService};
use tracing::{debug, error, info, instrument, warn};

use crate::client::GroupwareClient;
use crate::config::GroupwareConfig;
use crate::group::{DesiredGroup, GroupSnapshot, ATTR_EMAIL, ATTR_ID, ATTR_NAME};
use crate::reconciler::{lookup_group, GroupLookup, GroupReconciler};

/// Groupware group connector.
pub struct GroupwareGroupService {
    config: GroupwareConfig,
    display_name: String,
    client: Arc<GroupwareClient>,
    reconciler: GroupReconciler,
}

impl std::fmt::Debug for GroupwareGroupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupwareGroupService")
            .field("display_name", &self.display_name)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl GroupwareGroupService {
    /// Validate the configuration and build the shared client.
    pub fn new(config: GroupwareConfig) -> ConnectorResult<Self> {
        config.validate()?;

        let client = Arc::new(GroupwareClient::new(&config)?);
        let reconciler = GroupReconciler::new(
            Arc::clone(&client),
            config.add_resolution,
            config.lookup_concurrency,
        );
        let display_name = format!("Groupware: {}", client.base_url());

        debug!(config = ?config.redacted(), "Groupware group service configured");

        Ok(Self {
            config,
            display_name,
            client,
            reconciler,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &GroupwareConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for GroupwareGroupService {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn test_connection(&self) -> ConnectorResult<()> {
        self.client.ping().await.map_err(|e| {
            warn!(error = %e, "Groupware connection test failed");
            ConnectorError::from(e)
        })?;

        info!(base_url = %self.client.base_url(), "Groupware connection test successful");
        Ok(())
    }
}

#[async_trait]
impl WritableService for GroupwareGroupService {
    #[instrument(skip(self))]
    async fn list_pivots(&self) -> ConnectorResult<HashMap<String, AttributeSet>> {
        let groups = self.client.list_groups().await?;
        let mut pivots = HashMap::with_capacity(groups.len());

        for group in groups {
            if pivots.contains_key(&group.email) {
                warn!(email = %group.email, group_id = %group.id, "Duplicate group email, keeping first");
                continue;
            }
            let attributes = AttributeSet::new()
                .with(ATTR_ID, group.id)
                .with(ATTR_NAME, group.name)
                .with(ATTR_EMAIL, group.email.as_str());
            pivots.insert(group.email, attributes);
        }

        debug!(count = pivots.len(), "Listed groups");
        Ok(pivots)
    }

    #[instrument(skip(self))]
    async fn fetch_one(&self, pivot: &str) -> ConnectorResult<Option<AttributeSet>> {
        let group = match lookup_group(&self.client, pivot).await? {
            GroupLookup::Found(group) => group,
            GroupLookup::NotFound => return Ok(None),
            GroupLookup::Ambiguous(matches) => {
                error!(email = pivot, matches, "Several groups share this email");
                return Err(ConnectorError::CorrelationMultipleMatches {
                    attribute: ATTR_EMAIL.to_string(),
                    value: pivot.to_string(),
                });
            }
        };

        let records = self.client.list_members(&group.id).await?;
        Ok(Some(GroupSnapshot::from_parts(group, &records).to_attributes()))
    }

    async fn apply_create(&self, attributes: &AttributeSet) -> ConnectorResult<bool> {
        match DesiredGroup::for_create(attributes) {
            Ok(desired) => self.reconciler.create(&desired).await,
            Err(e) => {
                error!(error = %e, "Refusing to create group");
                Ok(false)
            }
        }
    }

    async fn apply_update(&self, pivot: &str, attributes: &AttributeSet) -> ConnectorResult<bool> {
        self.reconciler.update(pivot, attributes).await
    }

    async fn apply_delete(&self, pivot: &str) -> ConnectorResult<bool> {
        self.reconciler.delete(pivot).await
    }

    fn writable_attributes(&self) -> Vec<String> {
        self.config.writable_attributes.clone()
    }
}
