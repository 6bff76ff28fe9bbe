#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use site_survey_api::{
    config::AppConfig,
    db,
    entities::{master_item, municipality, region},
    events::{self, EventSender},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Application router over a fresh in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (tx, rx) = mpsc::channel(64);
        let event_task = tokio::spawn(events::process_events(rx));
        let event_sender = Arc::new(EventSender::new(tx));

        let state = AppState::new(Arc::new(pool), cfg, Some(event_sender));
        let router = site_survey_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Creates a project and returns its id.
    pub async fn create_project(&self, body: Value) -> String {
        let (status, json) = self.json(Method::POST, "/api/v1/projects", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
        json["data"]["id"]
            .as_str()
            .expect("project id")
            .to_string()
    }

    pub async fn seed_region(&self, code: i32, name: &str, short_name: &str) -> region::Model {
        region::ActiveModel {
            code: Set(code),
            name: Set(name.to_string()),
            short_name: Set(short_name.to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed region")
    }

    pub async fn seed_municipality(&self, region_id: i32, name: &str) -> municipality::Model {
        municipality::ActiveModel {
            region_id: Set(region_id),
            name: Set(name.to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed municipality")
    }

    pub async fn seed_master_item(
        &self,
        region_id: i32,
        municipality_name: &str,
        description: &str,
        selling_price: i64,
        sort_order: i32,
    ) -> master_item::Model {
        master_item::ActiveModel {
            region_id: Set(region_id),
            municipality_name: Set(municipality_name.to_string()),
            description: Set(description.to_string()),
            quantity: Set("1".to_string()),
            unit: Set("式".to_string()),
            cost_price: Set(selling_price * 7 / 10),
            selling_price: Set(selling_price),
            lead_time_days: Set(None),
            sort_order: Set(sort_order),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed master item")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body")
        .to_vec()
}
