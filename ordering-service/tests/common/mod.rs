//! Shared fixtures for ordering-service integration tests.
//!
//! The app runs over in-memory collaborators, so every test gets an isolated
//! store and needs no external services.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ordering_service::middleware::identity::{
    USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER,
};
use ordering_service::models::{IdentityContext, Order, OrderLineRequest, OrderRequest, Role};
use ordering_service::services::{InMemoryDirectory, InMemoryOrderStore, OrderLifecycleService};
use ordering_service::startup::{build_router, AppState};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const CLIENT_ID: i64 = 10;
pub const OTHER_CLIENT_ID: i64 = 11;
pub const OWNER_ID: i64 = 5;
pub const OTHER_OWNER_ID: i64 = 6;
pub const INTRUDER_ID: i64 = 99;
pub const ADMIN_ID: i64 = 1;

pub const RESTAURANT_ID: i64 = 1;
pub const OTHER_RESTAURANT_ID: i64 = 2;
pub const UNKNOWN_RESTAURANT_ID: i64 = 404;

pub const PRODUCT_ID: i64 = 1;
pub const SECOND_PRODUCT_ID: i64 = 2;

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryOrderStore>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let directory = InMemoryDirectory::new()
            .with_restaurant(RESTAURANT_ID, OWNER_ID)
            .with_restaurant(OTHER_RESTAURANT_ID, OTHER_OWNER_ID)
            .with_client(CLIENT_ID)
            .with_client(OTHER_CLIENT_ID)
            .with_product(PRODUCT_ID)
            .with_product(SECOND_PRODUCT_ID);

        let store = Arc::new(InMemoryOrderStore::new());
        let state = AppState::new(store.clone(), Arc::new(directory));

        TestApp { state, store }
    }

    pub fn lifecycle(&self) -> &OrderLifecycleService {
        &self.state.lifecycle
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Create an order for `CLIENT_ID` at `RESTAURANT_ID` through the core.
    pub async fn place_order(&self) -> Order {
        self.lifecycle()
            .create_order(&client(), &sample_request())
            .await
            .expect("Failed to create order")
    }

    /// Send a request through the router, returning status and JSON body
    /// (`Null` for an empty body).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        identity: Option<&IdentityContext>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(identity) = identity {
            builder = builder
                .header(USER_ID_HEADER, identity.subject_id().to_string())
                .header(USER_EMAIL_HEADER, identity.email())
                .header(USER_ROLE_HEADER, identity.role().as_str());
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("Failed to build request"),
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        let response = self
            .router()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }
}

pub fn client() -> IdentityContext {
    IdentityContext::new(CLIENT_ID, "cliente@example.com", Role::Cliente)
}

pub fn other_client() -> IdentityContext {
    IdentityContext::new(OTHER_CLIENT_ID, "otro@example.com", Role::Cliente)
}

pub fn owner() -> IdentityContext {
    IdentityContext::new(OWNER_ID, "owner@example.com", Role::Restaurante)
}

pub fn other_owner() -> IdentityContext {
    IdentityContext::new(OTHER_OWNER_ID, "owner2@example.com", Role::Restaurante)
}

pub fn intruder() -> IdentityContext {
    IdentityContext::new(INTRUDER_ID, "intruder@example.com", Role::Restaurante)
}

pub fn admin() -> IdentityContext {
    IdentityContext::new(ADMIN_ID, "admin@example.com", Role::Admin)
}

/// Two units of product 1 for 29.98 at restaurant 1.
pub fn sample_request() -> OrderRequest {
    OrderRequest {
        restaurant_id: RESTAURANT_ID,
        client_id: CLIENT_ID,
        status: None,
        comments: None,
        lines: vec![OrderLineRequest {
            product_id: PRODUCT_ID,
            quantity: 2,
            subtotal: dec!(29.98),
        }],
        total: dec!(29.98),
    }
}

pub fn sample_request_json() -> serde_json::Value {
    serde_json::json!({
        "restaurant_id": RESTAURANT_ID,
        "client_id": CLIENT_ID,
        "lines": [
            { "product_id": PRODUCT_ID, "quantity": 2, "subtotal": "29.98" }
        ],
        "total": "29.98"
    })
}
