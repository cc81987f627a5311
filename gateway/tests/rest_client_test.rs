//! Integration tests for the gateway REST client against a mock server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use boxoffice_gateway::{Filter, GatewayError, OrderBy, RestClient};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct TicketRow {
    ticket_id: i64,
    price: f64,
    is_available: bool,
}

#[tokio::test]
async fn select_builds_filters_and_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tickets"))
        .and(query_param("event_id", "eq.7"))
        .and(query_param("is_available", "eq.true"))
        .and(query_param("order", "price.asc"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ticket_id": 1, "price": 50.0, "is_available": true },
            { "ticket_id": 2, "price": 75.0, "is_available": true }
        ])))
        .mount(&server)
        .await;

    let client = RestClient::new(server.uri(), "anon-key");
    let rows: Vec<TicketRow> = client
        .select(
            "tickets",
            &[Filter::eq("event_id", 7), Filter::eq("is_available", true)],
            Some(&OrderBy::asc("price")),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ticket_id, 1);
}

#[tokio::test]
async fn insert_one_returns_the_inserted_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/tickets"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({ "price": 10.0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!(
            { "ticket_id": 9, "price": 10.0, "is_available": true }
        )))
        .mount(&server)
        .await;

    let client = RestClient::new(server.uri(), "anon-key");
    let row: TicketRow = client
        .insert_one("tickets", &json!({ "price": 10.0 }))
        .await
        .unwrap();

    assert_eq!(row.ticket_id, 9);
}

#[tokio::test]
async fn update_applies_filters() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/tickets"))
        .and(query_param("ticket_id", "in.(1,2)"))
        .and(body_json(json!({ "is_available": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ticket_id": 1, "price": 50.0, "is_available": false },
            { "ticket_id": 2, "price": 75.0, "is_available": false }
        ])))
        .mount(&server)
        .await;

    let client = RestClient::new(server.uri(), "anon-key");
    let rows: Vec<TicketRow> = client
        .update(
            "tickets",
            &json!({ "is_available": false }),
            &[Filter::is_in("ticket_id", [1, 2])],
        )
        .await
        .unwrap();

    assert!(rows.iter().all(|r| !r.is_available));
}

#[tokio::test]
async fn sign_in_stores_session_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "session-token",
            "token_type": "bearer",
            "user": { "id": "5a3c1f9e-0000-0000-0000-000000000001", "email": "a@b.test" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            { "id": "5a3c1f9e-0000-0000-0000-000000000001", "email": "a@b.test" }
        )))
        .mount(&server)
        .await;

    let client = RestClient::new(server.uri(), "anon-key");
    let session = client.sign_in("a@b.test", "secret").await.unwrap();
    assert_eq!(session.access_token, "session-token");
    assert!(client.has_session().await);

    let user = client.current_user().await.unwrap().unwrap();
    assert_eq!(user.email.as_deref(), Some("a@b.test"));
}

#[tokio::test]
async fn current_user_without_session_is_none() {
    let client = RestClient::new("http://localhost:1", "anon-key");
    // No session token held, so no request is issued at all
    let user = client.current_user().await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn unauthorized_maps_to_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = RestClient::new(server.uri(), "anon-key");
    let result: Result<Vec<TicketRow>, _> = client.select("orders", &[], None).await;
    assert!(matches!(result, Err(GatewayError::Unauthorized)));
}

#[tokio::test]
async fn missing_single_row_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/tickets"))
        .respond_with(ResponseTemplate::new(406))
        .mount(&server)
        .await;

    let client = RestClient::new(server.uri(), "anon-key");
    let result: Result<TicketRow, _> = client
        .select_one("tickets", &[Filter::eq("ticket_id", 999)])
        .await;
    assert!(matches!(result, Err(GatewayError::NotFound)));
}
