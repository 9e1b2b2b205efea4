#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use customer_service::bootstrap::{app_state_with_db, database};
use customer_service::modules::auth::service::AuthService;
use customer_service::routers::init_router;
use customer_service::shared::config::Config;
use customer_service::shared::state::AppState;
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub struct TestApp {
    pub router: Router,
    pub token: String,
}

fn test_config(rate: &str) -> Config {
    let rate = rate.to_string();
    Config::from_lookup(move |name| match name {
        "APP_ENV" => Some("dev".to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        "THROTTLE_RATE" => Some(rate.clone()),
        _ => None,
    })
    .expect("test config")
}

fn into_app(state: AppState) -> TestApp {
    let token = AuthService::issue_token(SECRET, "tester", Duration::hours(1)).expect("token");
    TestApp {
        router: init_router(state),
        token,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_rate("10000/min").await
}

/// Each app gets its own in-memory SQLite database.
pub async fn spawn_app_with_rate(rate: &str) -> TestApp {
    spawn_app_with_schema(rate, None).await
}

/// Like [`spawn_app_with_rate`], running `extra_sql` against the migrated
/// database before the app is built.
pub async fn spawn_app_with_schema(rate: &str, extra_sql: Option<&str>) -> TestApp {
    let config = test_config(rate);
    let db = database::connect(&config).await.expect("database");
    if let Some(sql) = extra_sql {
        db.execute_unprepared(sql).await.expect("extra schema");
    }
    into_app(app_state_with_db(&config, db))
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, false, Body::empty()).await
    }

    pub async fn head(&self, uri: &str) -> StatusCode {
        self.request(Method::HEAD, uri, false, Body::empty()).await.0
    }

    pub async fn send(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        self.request(method, uri, true, Body::from(bytes)).await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: &'static str,
    ) -> (StatusCode, Value) {
        self.request(method, uri, true, Body::from(body)).await
    }

    pub async fn send_anonymous(
        &self,
        method: Method,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        self.request(method, uri, false, Body::from(bytes)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, true, Body::empty()).await
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        authenticated: bool,
        body: Body,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if authenticated {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let request = builder.body(body).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("route request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read response body");

        let parsed = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, parsed)
    }

    pub async fn create_customer(&self, email: &str, phone: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/customers/",
                json!({
                    "first_name": "Asha",
                    "last_name": "Rao",
                    "email": email,
                    "phone": phone,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn create_address(&self, customer_id: i64, city: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/customer-addresses/",
                json!({
                    "customer_id": customer_id,
                    "street_address": "12 MG Road",
                    "city": city,
                    "state": "Maharashtra",
                    "pincode": "411001",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

pub fn id_of(record: &Value, key: &str) -> i64 {
    record[key].as_i64().expect("numeric id")
}
