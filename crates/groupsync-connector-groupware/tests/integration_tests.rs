//! Integration tests for the groupware group connector using wiremock.
//!
//! These tests drive the service against a mock backend and check the exact
//! requests issued for listing, fetching, creating, updating and deleting
//! groups, including member classification and skipped empty batches.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use groupsync_connector::error::ConnectorError;
use groupsync_connector::operation::{AttributeSet, ModificationKind, Modifications};
use groupsync_connector::traits::{Connector, WritableService};
use groupsync_connector_groupware::{GroupwareGroupService, ResolutionPolicy};

use common::{
    create_config, create_service, create_service_with_policy, email_member, group_json,
    group_member, mount_empty_lookups, user_member,
};

const TEAM: &str = "team@example.com";

// =============================================================================
// Test Helpers
// =============================================================================

/// Mount the pivot lookup and member listing for the `team` group (id g1).
async fn mount_team(server: &MockServer, members: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .and(query_param("email", TEAM))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([group_json("g1", "Team", TEAM)])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("limit", "2147483647"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members))
        .mount(server)
        .await;
}

async fn mount_user(server: &MockServer, email: &str, id: &str) {
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("email", email))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": id }])))
        .mount(server)
        .await;
}

async fn mount_group(server: &MockServer, email: &str, id: &str) {
    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .and(query_param("email", email))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([group_json(id, "Nested", email)])),
        )
        .mount(server)
        .await;
}

/// Accept the base-field update of g1.
async fn mount_base_update(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(expected)
        .mount(server)
        .await;
}

/// Fail the test if any membership batch is submitted for g1.
async fn forbid_member_batches(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

// =============================================================================
// Connection Tests
// =============================================================================

#[tokio::test]
async fn test_connection_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let result = service.test_connection().await;
    assert!(result.is_ok(), "Connection should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_connection_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let service = create_service(&server);
    let err = service.test_connection().await.unwrap_err();
    assert!(matches!(err, ConnectorError::AuthenticationFailed));
}

#[tokio::test]
async fn test_transport_failure_is_error_not_false() {
    common::init_test_logging();
    // Nothing listens on port 1.
    let service = GroupwareGroupService::new(create_config("http://127.0.0.1:1")).unwrap();

    let err = service.apply_delete(TEAM).await.unwrap_err();
    assert!(err.is_transient(), "expected communication error, got {err:?}");
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_list_pivots_keyed_by_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .and(query_param("limit", "2147483647"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "g1", "name": "Team", "email": TEAM },
            { "id": "g2", "name": "Sub team", "email": "sub@example.com" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let pivots = service.list_pivots().await.unwrap();

    assert_eq!(pivots.len(), 2);
    let team = &pivots[TEAM];
    assert_eq!(team.get_string("id"), Some("g1"));
    assert_eq!(team.get_string("name"), Some("Team"));
    assert_eq!(team.get_string("email"), Some(TEAM));
    assert_eq!(pivots["sub@example.com"].get_string("id"), Some("g2"));
}

#[tokio::test]
async fn test_list_pivots_uses_configured_page_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_config(&server.uri()).with_page_limit(50);
    let service = GroupwareGroupService::new(config).unwrap();
    assert!(service.list_pivots().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_one_returns_member_emails() {
    let server = MockServer::start().await;
    mount_team(
        &server,
        json!([
            user_member("u1", "ann@example.com"),
            email_member("ext@elsewhere.org"),
            group_member("g2", "sub@example.com")
        ]),
    )
    .await;

    let service = create_service(&server);
    let attrs = service.fetch_one(TEAM).await.unwrap().expect("group exists");

    assert_eq!(attrs.get_string("id"), Some("g1"));
    assert_eq!(attrs.get_string("name"), Some("Team"));
    assert_eq!(attrs.get_string("creator"), Some("admin"));
    assert_eq!(
        attrs.get_strings("members"),
        Some(vec!["ann@example.com", "ext@elsewhere.org", "sub@example.com"])
    );
}

#[tokio::test]
async fn test_fetch_one_not_found() {
    let server = MockServer::start().await;
    mount_empty_lookups(&server).await;

    let service = create_service(&server);
    assert!(service.fetch_one("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_one_ambiguous_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .and(query_param("email", TEAM))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            group_json("g1", "Team", TEAM),
            group_json("g9", "Team copy", TEAM)
        ])))
        .mount(&server)
        .await;

    let service = create_service(&server);
    let err = service.fetch_one(TEAM).await.unwrap_err();
    assert!(matches!(
        err,
        ConnectorError::CorrelationMultipleMatches { ref attribute, ref value }
            if attribute == "email" && value == TEAM
    ));
}

// =============================================================================
// Update Tests
// =============================================================================

#[tokio::test]
async fn test_update_adds_and_removes_typed_members() {
    let server = MockServer::start().await;
    mount_team(
        &server,
        json!([
            user_member("u1", "ann@example.com"),
            email_member("ext@elsewhere.org")
        ]),
    )
    .await;
    mount_user(&server, "bob@example.com", "u3").await;
    mount_group(&server, "sub@example.com", "g2").await;
    mount_empty_lookups(&server).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1"))
        .and(body_json(json!({ "name": "Renamed", "email": TEAM })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "add"))
        .and(body_json(json!([
            { "objectType": "user", "id": "u3" },
            { "objectType": "group", "id": "g2" }
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "remove"))
        .and(body_json(json!([
            { "objectType": "email", "id": "ext@elsewhere.org" }
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("name", "Renamed").with(
        "members",
        vec!["sub@example.com", "ann@example.com", "bob@example.com"],
    );

    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_removes_internal_user_by_user_reference() {
    let server = MockServer::start().await;
    mount_team(
        &server,
        json!([
            user_member("u1", "ann@example.com"),
            user_member("u2", "bob@example.com")
        ]),
    )
    .await;
    mount_user(&server, "bob@example.com", "u2").await;
    mount_empty_lookups(&server).await;
    mount_base_update(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "remove"))
        .and(body_json(json!([{ "objectType": "user", "id": "u2" }])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("members", vec!["ann@example.com"]);
    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_with_empty_members_removes_everyone() {
    let server = MockServer::start().await;
    mount_team(
        &server,
        json!([
            email_member("a@elsewhere.org"),
            email_member("b@elsewhere.org")
        ]),
    )
    .await;
    mount_empty_lookups(&server).await;
    mount_base_update(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "remove"))
        .and(body_json(json!([
            { "objectType": "email", "id": "a@elsewhere.org" },
            { "objectType": "email", "id": "b@elsewhere.org" }
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("members", Vec::<String>::new());
    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_without_members_leaves_membership_alone() {
    let server = MockServer::start().await;
    mount_team(&server, json!([user_member("u1", "ann@example.com")])).await;
    mount_base_update(&server, 1).await;
    forbid_member_batches(&server).await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("name", "Renamed");
    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_to_current_state_submits_no_batches() {
    let server = MockServer::start().await;
    mount_team(
        &server,
        json!([
            user_member("u1", "ann@example.com"),
            group_member("g2", "sub@example.com")
        ]),
    )
    .await;
    mount_base_update(&server, 2).await;
    forbid_member_batches(&server).await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("members", vec!["sub@example.com", "ann@example.com"]);

    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_rejected_base_write_stops_request() {
    let server = MockServer::start().await;
    mount_team(&server, json!([])).await;
    forbid_member_batches(&server).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid email" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("members", vec!["new@example.com"]);
    assert!(!service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_rejected_member_batch_is_false() {
    let server = MockServer::start().await;
    mount_team(&server, json!([])).await;
    mount_empty_lookups(&server).await;
    mount_base_update(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("members", vec!["new@example.com"]);
    assert!(!service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_missing_group_is_false() {
    let server = MockServer::start().await;
    mount_empty_lookups(&server).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("name", "Renamed");
    assert!(!service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_update_ambiguous_group_is_false() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/group/api/groups"))
        .and(query_param("email", TEAM))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            group_json("g1", "Team", TEAM),
            group_json("g9", "Team copy", TEAM)
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("name", "Renamed");
    assert!(!service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_ambiguous_member_falls_back_to_email() {
    let server = MockServer::start().await;
    mount_team(&server, json!([])).await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("email", "dup@example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "u1" }, { "id": "u2" }])),
        )
        .mount(&server)
        .await;
    mount_empty_lookups(&server).await;
    mount_base_update(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "add"))
        .and(body_json(json!([{ "objectType": "email", "id": "dup@example.com" }])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("members", vec!["dup@example.com"]);
    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
}

#[tokio::test]
async fn test_group_email_policy_adds_users_as_emails() {
    let server = MockServer::start().await;
    mount_team(&server, json!([])).await;
    mount_base_update(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "u1" }])))
        .expect(0)
        .mount(&server)
        .await;
    mount_empty_lookups(&server).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "add"))
        .and(body_json(json!([{ "objectType": "email", "id": "ann@example.com" }])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service_with_policy(&server, ResolutionPolicy::GroupEmail);
    let attrs = AttributeSet::new().with("members", vec!["ann@example.com"]);
    assert!(service.apply_update(TEAM, &attrs).await.unwrap());
}

// =============================================================================
// Create Tests
// =============================================================================

#[tokio::test]
async fn test_create_then_adds_members() {
    let server = MockServer::start().await;
    mount_user(&server, "ann@example.com", "u1").await;
    mount_empty_lookups(&server).await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups"))
        .and(body_json(json!({ "name": "Team", "email": TEAM, "members": [] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(group_json("g1", "Team", TEAM)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "add"))
        .and(body_json(json!([
            { "objectType": "user", "id": "u1" },
            { "objectType": "email", "id": "ext@elsewhere.org" }
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups/g1/members"))
        .and(query_param("action", "remove"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let change = Modifications::new(
        ModificationKind::Create,
        TEAM,
        AttributeSet::new()
            .with("name", "Team")
            .with("email", TEAM)
            .with("members", vec!["ext@elsewhere.org", "ann@example.com"]),
    );

    assert!(service.apply(&change).await.unwrap());
}

#[tokio::test]
async fn test_create_without_members_skips_batches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups"))
        .respond_with(ResponseTemplate::new(201).set_body_json(group_json("g1", "Team", TEAM)))
        .expect(1)
        .mount(&server)
        .await;
    forbid_member_batches(&server).await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("name", "Team").with("email", TEAM);
    assert!(service.apply_create(&attrs).await.unwrap());
}

#[tokio::test]
async fn test_create_without_email_is_refused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new().with("name", "Team");
    assert!(!service.apply_create(&attrs).await.unwrap());
}

#[tokio::test]
async fn test_create_rejected_is_false() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/group/api/groups"))
        .respond_with(ResponseTemplate::new(409).set_body_string("email already used"))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    let attrs = AttributeSet::new()
        .with("email", TEAM)
        .with("members", vec!["ann@example.com"]);
    assert!(!service.apply_create(&attrs).await.unwrap());
}

// =============================================================================
// Delete Tests
// =============================================================================

#[tokio::test]
async fn test_delete_existing_group() {
    let server = MockServer::start().await;
    mount_team(&server, json!([])).await;

    Mock::given(method("DELETE"))
        .and(path("/group/api/groups/g1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(&server);
    assert!(service.apply(&Modifications::delete(TEAM)).await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_group_is_false() {
    let server = MockServer::start().await;
    mount_empty_lookups(&server).await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(&server);
    assert!(!service.apply_delete(TEAM).await.unwrap());
}
