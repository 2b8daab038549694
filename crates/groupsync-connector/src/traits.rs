//! Connector Framework traits
//!
//! The synchronization engine talks to a destination through these traits:
//! it lists pivots, fetches single objects, and submits change requests.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::ConnectorResult;
use crate::operation::{AttributeSet, ModificationKind, Modifications};

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Get the display name for this connector instance.
    fn display_name(&self) -> &str;

    /// Test the connection to the target system.
    ///
    /// Returns `Ok(())` if the connection is successful, or an error describing
    /// what went wrong.
    async fn test_connection(&self) -> ConnectorResult<()>;
}

/// A destination the synchronization engine can read from and write to.
///
/// Write operations return `Ok(false)` when the target rejected the change or
/// the target object could not be resolved; details go to the logs. `Err` is
/// reserved for communication failures.
#[async_trait]
pub trait WritableService: Connector {
    /// List every object, keyed by pivot value.
    async fn list_pivots(&self) -> ConnectorResult<HashMap<String, AttributeSet>>;

    /// Fetch the full attributes of the object identified by `pivot`.
    ///
    /// Returns `Ok(None)` if no such object exists.
    async fn fetch_one(&self, pivot: &str) -> ConnectorResult<Option<AttributeSet>>;

    /// Create a new object.
    async fn apply_create(&self, attributes: &AttributeSet) -> ConnectorResult<bool>;

    /// Update the object identified by `pivot`.
    async fn apply_update(&self, pivot: &str, attributes: &AttributeSet)
        -> ConnectorResult<bool>;

    /// Delete the object identified by `pivot`.
    async fn apply_delete(&self, pivot: &str) -> ConnectorResult<bool>;

    /// Names of the attributes this service writes.
    fn writable_attributes(&self) -> Vec<String>;

    /// Apply a change request by dispatching on its kind.
    async fn apply(&self, modifications: &Modifications) -> ConnectorResult<bool> {
        match modifications.kind {
            ModificationKind::Create => self.apply_create(&modifications.attributes).await,
            ModificationKind::Update => {
                self.apply_update(&modifications.main_identifier, &modifications.attributes)
                    .await
            }
            ModificationKind::Delete => self.apply_delete(&modifications.main_identifier).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Connector for RecordingService {
        fn display_name(&self) -> &str {
            "recording"
        }

        async fn test_connection(&self) -> ConnectorResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl WritableService for RecordingService {
        async fn list_pivots(&self) -> ConnectorResult<HashMap<String, AttributeSet>> {
            Ok(HashMap::new())
        }

        async fn fetch_one(&self, _pivot: &str) -> ConnectorResult<Option<AttributeSet>> {
            Ok(None)
        }

        async fn apply_create(&self, attributes: &AttributeSet) -> ConnectorResult<bool> {
            let email = attributes.get_string("email").unwrap_or_default();
            self.calls.lock().unwrap().push(format!("create:{email}"));
            Ok(true)
        }

        async fn apply_update(
            &self,
            pivot: &str,
            _attributes: &AttributeSet,
        ) -> ConnectorResult<bool> {
            self.calls.lock().unwrap().push(format!("update:{pivot}"));
            Ok(true)
        }

        async fn apply_delete(&self, pivot: &str) -> ConnectorResult<bool> {
            self.calls.lock().unwrap().push(format!("delete:{pivot}"));
            Ok(false)
        }

        fn writable_attributes(&self) -> Vec<String> {
            vec!["name".to_string()]
        }
    }

    #[tokio::test]
    async fn test_apply_dispatches_on_kind() {
        let service = RecordingService::default();
        let attrs = AttributeSet::new().with("email", "team@example.com");

        assert!(service
            .apply(&Modifications::new(
                ModificationKind::Create,
                "team@example.com",
                attrs.clone()
            ))
            .await
            .unwrap());
        assert!(service
            .apply(&Modifications::new(
                ModificationKind::Update,
                "team@example.com",
                attrs
            ))
            .await
            .unwrap());
        assert!(!service
            .apply(&Modifications::delete("team@example.com"))
            .await
            .unwrap());

        let calls = service.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "create:team@example.com",
                "update:team@example.com",
                "delete:team@example.com"
            ]
        );
    }
}
