//! Common test utilities for groupsync-connector-groupware integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Once;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groupsync_connector_groupware::{GroupwareConfig, GroupwareGroupService, ResolutionPolicy};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn create_config(base_url: &str) -> GroupwareConfig {
    GroupwareConfig::new(base_url, "admin@example.com", "secret")
}

pub fn create_service(server: &MockServer) -> GroupwareGroupService {
    init_test_logging();
    GroupwareGroupService::new(create_config(&server.uri())).unwrap()
}

pub fn create_service_with_policy(
    server: &MockServer,
    policy: ResolutionPolicy,
) -> GroupwareGroupService {
    init_test_logging();
    GroupwareGroupService::new(create_config(&server.uri()).with_add_resolution(policy)).unwrap()
}

/// Full group object as returned by the email lookup.
pub fn group_json(id: &str, name: &str, email: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "creator": "admin",
        "timestamps": { "creation": "2020-03-01T10:00:00Z" }
    })
}

pub fn user_member(id: &str, email: &str) -> Value {
    json!({
        "objectType": "user",
        "id": id,
        "member": { "id": id, "preferredEmail": email, "firstname": "Test" }
    })
}

/// External member; the backend id is opaque and the address is in `member`.
pub fn email_member(email: &str) -> Value {
    json!({
        "objectType": "email",
        "id": format!("em-{}", email.replace('@', "-at-")),
        "member": email
    })
}

pub fn group_member(id: &str, email: &str) -> Value {
    json!({
        "objectType": "group",
        "id": id,
        "member": { "id": id, "email": email, "name": "Nested" }
    })
}

/// Answer every user and group lookup not matched by an earlier mock with
/// an empty list. Mount after the specific lookups.
pub async fn mount_empty_lookups(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}
