//! # Groupware Group Connector
//!
//! Synchronizes groups (name, email, membership) into a groupware platform
//! through its REST API.
//!
//! Memberships arrive from the synchronization engine as plain email
//! addresses. The connector diffs them against the current members and
//! classifies every added or removed address as an internal user, a nested
//! group, or an external email before submitting typed references.
//!
//! ## Crate Organization
//!
//! - [`client`] - REST transport
//! - [`directory`] - User and group lookups by email
//! - [`diff`] - Membership differ
//! - [`resolver`] - Identity resolution
//! - [`reconciler`] - Create/update/delete state machine
//! - [`service`] - Pivot-oriented facade
//!
//! ## Example
//!
//! ```ignore
//! use groupsync_connector::prelude::*;
//! use groupsync_connector_groupware::{GroupwareConfig, GroupwareGroupService};
//!
//! let config = GroupwareConfig::new("https://groupware.example.com", "admin", "secret");
//! let service = GroupwareGroupService::new(config)?;
//!
//! let attrs = AttributeSet::new().with("members", vec!["ann@example.com"]);
//! let ok = service.apply_update("team@example.com", &attrs).await?;
//! ```

pub mod client;
pub mod config;
pub mod diff;
pub mod directory;
pub mod error;
pub mod group;
pub mod model;
pub mod reconciler;
pub mod resolver;
pub mod service;

// Re-exports
pub use client::GroupwareClient;
pub use config::GroupwareConfig;
pub use diff::MembershipDiff;
pub use directory::DirectoryLookup;
pub use error::{GroupwareError, GroupwareResult};
pub use group::{DesiredGroup, GroupSnapshot};
pub use model::{MemberRecord, MembershipReference, ObjectType};
pub use reconciler::GroupReconciler;
pub use resolver::{Direction, IdentityResolver, ResolutionPolicy};
pub use service::GroupwareGroupService;
