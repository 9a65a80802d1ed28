//! Shared harness: the full router over the in-memory store.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use taskboard::adapters::http::{TaskboardAppState, FROM_ID_HEADER};
use taskboard::adapters::{BcryptPasswordHasher, InMemoryTaskboardStore};
use taskboard::app::{build_app, build_state};
use taskboard::config::{RealtimeConfig, ServerConfig};

pub struct TestApp {
    pub router: Router,
    pub state: TaskboardAppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryTaskboardStore::new());
        let hasher = Arc::new(BcryptPasswordHasher::new(4));
        let state = build_state(store, hasher, &RealtimeConfig::default());
        let router = build_app(state.clone(), &ServerConfig::default())
            .await
            .expect("bootstrap");
        Self { router, state }
    }

    /// Sends one request; an empty response body comes back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        from: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(from) = from {
            request = request.header(FROM_ID_HEADER, from);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    /// Creates a task and returns its JSON.
    pub async fn create_task(&self, name: &str, board: &str) -> Value {
        let (status, task) = self
            .send(
                Method::POST,
                "/taskboard/tasks",
                None,
                Some(serde_json::json!({ "name": name, "boardId": board })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", task);
        task
    }

    /// `(name, dispOrder)` pairs of a board, in display order.
    pub async fn layout(&self, board: &str) -> Vec<(String, i64)> {
        let (status, tasks) = self.get(&format!("/taskboard/tasks?boardid={}", board)).await;
        assert_eq!(status, StatusCode::OK);
        tasks
            .as_array()
            .unwrap()
            .iter()
            .map(|t| {
                (
                    t["name"].as_str().unwrap().to_string(),
                    t["dispOrder"].as_i64().unwrap(),
                )
            })
            .collect()
    }
}

pub fn pairs(entries: &[(&str, i64)]) -> Vec<(String, i64)> {
    entries.iter().map(|(n, o)| (n.to_string(), *o)).collect()
}
