//! End-to-end change fan-out: HTTP mutation in, WebSocket text out.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tokio::sync::broadcast::Receiver;

use taskboard::adapters::websocket::{ConnectionId, Envelope};
use taskboard::ports::{ChangeKind, ChangeMessage, ClientIdentity};

use common::TestApp;

/// A simulated WebSocket client attached straight to the hub.
struct Client {
    connection: ConnectionId,
    rx: Receiver<Envelope>,
}

impl Client {
    async fn connect(app: &TestApp, identity: Option<&str>) -> Self {
        let (connection, rx) = app.state.websocket.hub.join().await;
        if let Some(identity) = ClientIdentity::parse(identity) {
            app.state.websocket.registry.register(identity, connection).await;
        }
        Self { connection, rx }
    }

    /// Frames this client would have been sent so far.
    fn received(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(envelope) = self.rx.try_recv() {
            if envelope.is_for(self.connection) {
                frames.push(envelope.text.to_string());
            }
        }
        frames
    }

    /// Received frames decoded back into change messages.
    fn changes(&mut self) -> Vec<ChangeMessage> {
        self.received()
            .iter()
            .map(|frame| frame.parse().expect("well-formed change frame"))
            .collect()
    }
}

#[tokio::test]
async fn originator_is_excluded_everyone_else_notified() {
    let app = TestApp::new().await;
    let mut alice = Client::connect(&app, Some("alice")).await;
    let mut bob = Client::connect(&app, Some("bob")).await;
    let mut anonymous = Client::connect(&app, None).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/taskboard/tasks",
            Some("alice"),
            Some(json!({ "name": "Plan", "boardId": "todo" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert!(alice.received().is_empty());
    assert_eq!(bob.received(), vec!["UPDATE_TASKBOARDS todo"]);
    assert_eq!(anonymous.received(), vec!["UPDATE_TASKBOARDS todo"]);
}

#[tokio::test]
async fn unknown_origin_reaches_every_session() {
    let app = TestApp::new().await;
    let mut alice = Client::connect(&app, Some("alice")).await;
    let mut bob = Client::connect(&app, Some("bob")).await;

    app.send(
        Method::POST,
        "/taskboard/boards",
        Some("carol"),
        Some(json!({ "name": "Review" })),
    )
    .await;

    assert_eq!(alice.received().len(), 1);
    assert_eq!(bob.received().len(), 1);
    assert!(alice.received().is_empty());
}

#[tokio::test]
async fn rejected_mutation_notifies_nobody() {
    let app = TestApp::new().await;
    let task = app.create_task("A", "todo").await;
    let mut bob = Client::connect(&app, Some("bob")).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/taskboard/tasks/{}", task["id"].as_str().unwrap()),
            Some("alice"),
            Some(json!({ "name": "B", "version": 7 })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(bob.received().is_empty());
}

#[tokio::test]
async fn cross_board_move_names_both_boards() {
    let app = TestApp::new().await;
    let task = app.create_task("X", "todo").await;
    let mut bob = Client::connect(&app, Some("bob")).await;

    app.send(
        Method::PUT,
        "/taskboard/taskorders",
        Some("alice"),
        Some(json!({
            "taskId": task["id"],
            "fromBoardId": "todo",
            "fromDispOrder": 0,
            "toBoardId": "done",
            "toDispOrder": 0
        })),
    )
    .await;

    let changes = bob.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::TaskBoardUpdated);
    assert_eq!(changes[0].ids, vec!["todo", "done"]);
}

#[tokio::test]
async fn reconnect_takes_over_identity() {
    let app = TestApp::new().await;
    let mut old = Client::connect(&app, Some("alice")).await;
    let mut new = Client::connect(&app, Some("alice")).await;

    app.send(
        Method::POST,
        "/taskboard/boards",
        Some("alice"),
        Some(json!({ "name": "Later" })),
    )
    .await;

    // only the newest connection counts as the originator
    assert!(new.received().is_empty());
    assert_eq!(old.received().len(), 1);
}

#[tokio::test]
async fn deleting_user_announces_unassigned_tasks() {
    let app = TestApp::new().await;
    let (_, user) = app
        .send(
            Method::POST,
            "/taskboard/users",
            None,
            Some(json!({ "name": "dave", "password": "pw" })),
        )
        .await;
    let user_id = user["id"].as_str().unwrap().to_string();
    let (_, task) = app
        .send(
            Method::POST,
            "/taskboard/tasks",
            None,
            Some(json!({ "name": "Fix", "assigneeUserId": user_id })),
        )
        .await;
    let task_id = task["id"].as_str().unwrap().to_string();
    let mut bob = Client::connect(&app, Some("bob")).await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/taskboard/users/{}?version=1", user_id),
            Some("alice"),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        bob.changes(),
        vec![
            ChangeMessage::new(ChangeKind::UserUpdated, Vec::new()),
            ChangeMessage::new(ChangeKind::TaskUpdated, vec![task_id.clone()]),
        ]
    );
    let (_, task) = app.get(&format!("/taskboard/tasks/{}", task_id)).await;
    assert!(task["assigneeUserId"].is_null());
}
