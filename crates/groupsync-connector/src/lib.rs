//! # Connector Framework
//!
//! Core abstractions shared by group synchronization connectors.
//!
//! A synchronization engine drives a destination through the
//! [`traits::WritableService`] trait: it lists pivots, fetches single
//! objects, and submits create/update/delete requests expressed as
//! [`operation::AttributeSet`]s.
//!
//! ## Crate Organization
//!
//! - [`error`] - Error types with transient/permanent classification
//! - [`operation`] - Attribute sets and modification requests
//! - [`config`] - Configuration trait and shared settings
//! - [`traits`] - Connector and service traits

pub mod config;
pub mod error;
pub mod operation;
pub mod traits;

/// Prelude module for convenient imports.
///
/// ```
/// use groupsync_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConnectionSettings, ConnectorConfig, TlsConfig};
    pub use crate::error::{ConnectorError, ConnectorResult};
    pub use crate::operation::{AttributeSet, AttributeValue, ModificationKind, Modifications};
    pub use crate::traits::{Connector, WritableService};
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;
