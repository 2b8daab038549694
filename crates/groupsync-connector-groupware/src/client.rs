//! Groupware REST API client (reqwest-based).
//!
//! One `GroupwareClient` is built per connector instance from its
//! configuration and is immutable afterwards; it is shared by reference
//! between the directory lookups, the reconciler, and the service.

use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::config::{GroupwareConfig, DEFAULT_PAGE_LIMIT};
use crate::error::{GroupwareError, GroupwareResult};
use crate::model::{
    Group, GroupItem, GroupPayload, MemberRecord, MembershipAction, MembershipReference, UserItem,
};

/// Path of the group collection, relative to the base URL.
pub const GROUPS_PATH: &str = "/group/api/groups";

/// Path of the user directory, relative to the base URL.
pub const USERS_PATH: &str = "/api/users";

/// HTTP client for the groupware group and user APIs.
pub struct GroupwareClient {
    /// Base URL without trailing slash.
    base_url: String,
    username: String,
    password: SecretString,
    http_client: Client,
    /// `limit` sent on list requests.
    page_limit: u32,
}

impl std::fmt::Debug for GroupwareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupwareClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("page_limit", &self.page_limit)
            .finish_non_exhaustive()
    }
}

impl GroupwareClient {
    /// Create a client from a validated configuration.
    pub fn new(config: &GroupwareConfig) -> GroupwareResult<Self> {
        let http_client = Client::builder()
            .timeout(config.connection.read_timeout())
            .connect_timeout(config.connection.connection_timeout())
            .danger_accept_invalid_certs(!config.tls.verify_certificate)
            .user_agent(concat!(
                "groupsync-connector-groupware/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| GroupwareError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(
            &config.base_url,
            config.username.clone(),
            config.password.clone(),
            http_client,
        )
        .with_page_limit(config.page_limit))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        base_url: &str,
        username: String,
        password: String,
        http_client: Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password: SecretString::from(password),
            http_client,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Set the `limit` sent on list requests.
    #[must_use]
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Groups ────────────────────────────────────────────────────────

    /// List group summaries (`GET /group/api/groups?limit=N`).
    #[instrument(skip(self))]
    pub async fn list_groups(&self) -> GroupwareResult<Vec<GroupItem>> {
        let limit = self.page_limit.to_string();
        self.get(&self.groups_url(""), &[("limit", limit.as_str())])
            .await
    }

    /// Find full groups by email (`GET /group/api/groups?email=<e>`).
    ///
    /// A well-formed directory returns zero or one group.
    #[instrument(skip(self))]
    pub async fn find_groups_by_email(&self, email: &str) -> GroupwareResult<Vec<Group>> {
        self.get(&self.groups_url(""), &[("email", email)]).await
    }

    /// List the members of a group (`GET /group/api/groups/{id}/members?limit=N`).
    #[instrument(skip(self))]
    pub async fn list_members(&self, group_id: &str) -> GroupwareResult<Vec<MemberRecord>> {
        let limit = self.page_limit.to_string();
        self.get(
            &self.groups_url(&format!("/{group_id}/members")),
            &[("limit", limit.as_str())],
        )
        .await
    }

    /// Create a group (`POST /group/api/groups`) and return it with its new id.
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_group(&self, payload: &GroupPayload) -> GroupwareResult<Group> {
        let body = self.post(&self.groups_url(""), &[], payload).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Update the base fields of a group (`POST /group/api/groups/{id}`).
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn update_group(&self, group_id: &str, payload: &GroupPayload) -> GroupwareResult<()> {
        self.post(&self.groups_url(&format!("/{group_id}")), &[], payload)
            .await
            .map(drop)
    }

    /// Delete a group (`DELETE /group/api/groups/{id}`).
    #[instrument(skip(self))]
    pub async fn delete_group(&self, group_id: &str) -> GroupwareResult<()> {
        let url = self.groups_url(&format!("/{group_id}"));
        debug!("DELETE {}", url);
        let response = self.authorized(self.http_client.delete(&url)).send().await?;
        Self::read_success(response).await.map(drop)
    }

    /// Add or remove a batch of members
    /// (`POST /group/api/groups/{id}/members?action=add|remove`).
    ///
    /// Callers must not send an empty batch: the backend reads `[]` as
    /// "clear all members".
    #[instrument(skip(self, references), fields(count = references.len()))]
    pub async fn update_members(
        &self,
        group_id: &str,
        action: MembershipAction,
        references: &[MembershipReference],
    ) -> GroupwareResult<()> {
        self.post(
            &self.groups_url(&format!("/{group_id}/members")),
            &[("action", action.as_str())],
            references,
        )
        .await
        .map(drop)
    }

    // ── Users ─────────────────────────────────────────────────────────

    /// Find internal users by email (`GET /api/users?email=<e>`).
    #[instrument(skip(self))]
    pub async fn find_users_by_email(&self, email: &str) -> GroupwareResult<Vec<UserItem>> {
        let url = format!("{}{}", self.base_url, USERS_PATH);
        self.get(&url, &[("email", email)]).await
    }

    /// Cheapest authenticated call, used to test the connection.
    pub async fn ping(&self) -> GroupwareResult<()> {
        let _: Vec<GroupItem> = self.get(&self.groups_url(""), &[("limit", "1")]).await?;
        Ok(())
    }

    // ── Internal HTTP Methods ─────────────────────────────────────────

    fn groups_url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, GROUPS_PATH, suffix)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> GroupwareResult<T> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .authorized(self.http_client.get(url))
            .query(query)
            .send()
            .await?;
        let body = Self::read_success(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> GroupwareResult<String> {
        debug!("POST {} {:?}", url, query);
        let response = self
            .authorized(self.http_client.post(url))
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::read_success(response).await
    }

    /// Return the body of a 2xx response, or a `Rejected` error carrying
    /// status, reason and raw body.
    async fn read_success(response: Response) -> GroupwareResult<String> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(GroupwareError::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            })
        }
    }
}
