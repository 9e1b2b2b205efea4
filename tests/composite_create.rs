//! `POST /customers-with-address/`.

mod common;

use axum::http::{Method, StatusCode};
use common::{spawn_app, spawn_app_with_schema};
use serde_json::json;

#[tokio::test]
async fn creates_customer_with_every_address() {
    let app = spawn_app().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/customers-with-address/",
            json!({
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com",
                "phone": "9000000001",
                "addresses": [
                    {
                        "street_address": "1 Main",
                        "city": "Pune",
                        "state": "MH",
                        "pincode": "411001"
                    },
                    {
                        "street_address": "2 Main",
                        "city": "Goa",
                        "state": "GA",
                        "pincode": "403001",
                        "country": "Portugal"
                    }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let addresses = body["addresses"].as_array().cloned().unwrap_or_default();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0]["country"], "India");
    assert_eq!(addresses[1]["country"], "Portugal");
    assert_eq!(addresses[0]["customer"], body["customer_id"]);
}

#[tokio::test]
async fn accepts_an_empty_address_list() {
    let app = spawn_app().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/customers-with-address/",
            json!({
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com",
                "phone": "9000000001",
                "addresses": []
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["addresses"], json!([]));
}

#[tokio::test]
async fn invalid_address_rejects_the_whole_request() {
    let app = spawn_app().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/customers-with-address/",
            json!({
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com",
                "phone": "9000000001",
                "addresses": [
                    {
                        "street_address": "1 Main",
                        "city": "Pune",
                        "state": "MH",
                        "pincode": "411001"
                    },
                    { "street_address": "2 Main", "state": "MH", "pincode": "411001" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["addresses[1].city"], json!(["This field is required."]));

    let (_, customers) = app.get("/customers/").await;
    assert_eq!(customers, json!([]));
    let (_, addresses) = app.get("/customer-addresses/").await;
    assert_eq!(addresses, json!([]));
}

#[tokio::test]
async fn missing_addresses_key_is_invalid() {
    let app = spawn_app().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/customers-with-address/",
            json!({
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com",
                "phone": "9000000001"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["addresses"], json!(["This field is required."]));
}

#[tokio::test]
async fn existing_email_is_a_field_error() {
    let app = spawn_app().await;
    app.create_customer("asha@example.com", "9000000001").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/customers-with-address/",
            json!({
                "first_name": "Other",
                "last_name": "Person",
                "email": "asha@example.com",
                "phone": "9000000002",
                "addresses": []
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["email"],
        json!(["Customer with this email already exists."])
    );
}

#[tokio::test]
async fn empty_body_is_a_bad_request() {
    let app = spawn_app().await;
    let (status, body) = app
        .send_raw(Method::POST, "/customers-with-address/", "{}")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request body cannot be empty.");
}

const REJECT_ADDRESS_INSERTS: &str = "CREATE TRIGGER reject_address_inserts \
    BEFORE INSERT ON customer_addresses \
    BEGIN SELECT RAISE(ABORT, 'address store unavailable'); END;";

#[tokio::test]
async fn store_failure_after_customer_insert_rolls_everything_back() {
    let app = spawn_app_with_schema("10000/min", Some(REJECT_ADDRESS_INSERTS)).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/customers-with-address/",
            json!({
                "first_name": "Asha",
                "last_name": "Rao",
                "email": "asha@example.com",
                "phone": "9000000001",
                "addresses": [
                    {
                        "street_address": "1 Main",
                        "city": "Pune",
                        "state": "MH",
                        "pincode": "411001"
                    }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|msg| msg.contains("address store unavailable")),
        "{body}"
    );

    let (_, customers) = app.get("/customers/").await;
    assert_eq!(customers, json!([]));

    // The connection is usable again once the transaction is gone.
    app.create_customer("asha@example.com", "9000000001").await;
}
