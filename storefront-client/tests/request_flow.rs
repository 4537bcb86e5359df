mod support;

use common_auth::Role;
use common_session::{CredentialSlot, CredentialStore};
use http::{Method, StatusCode};
use httpmock::prelude::*;
use serde_json::json;
use storefront_client::{AuthCommand, ClientError};
use support::harness;

const SELLER: CredentialSlot = CredentialSlot::Role(Role::Seller);
const ADMIN: CredentialSlot = CredentialSlot::Role(Role::Admin);
const CUSTOMER: CredentialSlot = CredentialSlot::Role(Role::Customer);

#[tokio::test]
async fn seller_page_sends_seller_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/products")
                .header("authorization", "Bearer seller-token");
            then.status(200).json_body(json!([{ "id": 1 }]));
        })
        .await;

    let h = harness("/seller/dashboard", &[(SELLER, "seller-token"), (CUSTOMER, "customer-token")]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let body: serde_json::Value = client.get_json("/products").await.expect("products");

    assert_eq!(body, json!([{ "id": 1 }]));
    mock.assert_async().await;
}

#[tokio::test]
async fn shared_page_uses_customer_token_for_catalog() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/products")
                .header("authorization", "Bearer customer-token");
            then.status(200).json_body(json!([]));
        })
        .await;

    let h = harness("/", &[(CUSTOMER, "customer-token")]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let _: serde_json::Value = client.get_json("/products").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn legacy_token_is_last_resort() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/orders").header("authorization", "Bearer legacy");
            then.status(200).json_body(json!({ "orders": [] }));
        })
        .await;

    let h = harness("/", &[(CredentialSlot::Legacy, "legacy")]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let _: serde_json::Value = client.get_json("/orders").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn anonymous_request_has_no_authorization_header() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/categories").header_missing("authorization");
            then.status(200).json_body(json!([]));
        })
        .await;

    let h = harness("/", &[]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let _: serde_json::Value = client.get_json("/categories").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_on_admin_page_evicts_once() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/admin/stats");
            then.status(401);
        })
        .await;

    let h = harness("/admin/x", &[(ADMIN, "stale-admin"), (CUSTOMER, "customer-token")]);
    let client = h.app.api_client(&server.base_url()).unwrap();

    let mut attempt = h.app.interceptor.before("/admin/stats");
    let (response, command) = client
        .send_attempt::<()>(Method::GET, "/admin/stats", None, &mut attempt)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(command, AuthCommand::EvictAndReload { slot: ADMIN });
    assert!(h.store.get(ADMIN).is_none());
    assert_eq!(h.store.get(CUSTOMER).as_deref(), Some("customer-token"));
    assert_eq!(h.navigator.reloads(), 1);

    h.store.set(ADMIN, "fresh-admin").unwrap();
    let (_, again) = client
        .send_attempt::<()>(Method::GET, "/admin/stats", None, &mut attempt)
        .await
        .unwrap();
    assert_eq!(again, AuthCommand::PassThrough);
    assert_eq!(h.store.get(ADMIN).as_deref(), Some("fresh-admin"));
    assert_eq!(h.navigator.reloads(), 1);
    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn get_json_reports_evicted_slot() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/delivery/assignments");
            then.status(401);
        })
        .await;

    let h = harness("/delivery/today", &[(CredentialSlot::Role(Role::Delivery), "d")]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let err = client
        .get_json::<serde_json::Value>("/delivery/assignments")
        .await
        .expect_err("401");

    match err {
        ClientError::Unauthorized { evicted } => {
            assert_eq!(evicted, Some(CredentialSlot::Role(Role::Delivery)))
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.app.sessions.active_sessions().is_empty());
}

#[tokio::test]
async fn unauthorized_on_shared_page_keeps_credentials() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cart");
            then.status(401);
        })
        .await;

    let h = harness("/", &[(CUSTOMER, "customer-token")]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let err = client.get_json::<serde_json::Value>("/cart").await.expect_err("401");

    assert!(matches!(err, ClientError::Unauthorized { evicted: None }));
    assert_eq!(h.store.get(CUSTOMER).as_deref(), Some("customer-token"));
    assert_eq!(h.navigator.reloads(), 0);
    let metrics = h.app.metrics.render().unwrap();
    assert!(metrics.contains("storefront_unauthorized_ignored_total 1"));
}

#[tokio::test]
async fn other_errors_pass_through() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/seller/products");
            then.status(500).body("boom");
        })
        .await;

    let h = harness("/seller/products/new", &[(SELLER, "seller-token")]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let err = client
        .post_json::<serde_json::Value, _>("/seller/products", &json!({ "name": "Mug" }))
        .await
        .expect_err("500");

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.store.get(SELLER).as_deref(), Some("seller-token"));
    assert_eq!(h.navigator.reloads(), 0);
}

#[tokio::test]
async fn unrooted_customer_path_uses_customer_token_on_back_office_page() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/cart").header("authorization", "Bearer c");
            then.status(200).json_body(json!({ "items": [] }));
        })
        .await;

    let h = harness("/seller/home", &[(CUSTOMER, "c")]);
    let client = h.app.api_client(&server.base_url()).unwrap();
    let _: serde_json::Value = client.get_json("cart").await.expect("cart");

    mock.assert_async().await;
}
