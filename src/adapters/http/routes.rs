//! Route configuration for the taskboard API.

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::extract::FROM_ID_HEADER;
use super::handlers::{
    create_board, create_task, create_user, delete_board, delete_task, delete_user, get_board,
    get_task, get_user, list_boards, list_tasks, list_users, login, reorder_task, update_board,
    update_task, update_user, TaskboardAppState,
};
use crate::adapters::websocket::websocket_router;
use crate::config::ServerConfig;

/// Path prefix shared by every endpoint.
pub const API_PREFIX: &str = "/taskboard";

/// Creates the taskboard router with all endpoints.
///
/// Routes (under `/taskboard`):
/// - `POST /login`
/// - `GET|POST /users`, `GET|PUT|DELETE /users/:id`
/// - `GET|POST /boards`, `GET|PUT|DELETE /boards/:id`
/// - `GET|POST /tasks`, `GET|PUT|DELETE /tasks/:id`
/// - `PUT /taskorders`
/// - `GET /ws?from=<identity>`
pub fn taskboard_router(state: TaskboardAppState) -> Router {
    let websocket: Router = websocket_router().with_state(state.websocket.clone());

    let api: Router = Router::new()
        .route("/login", post(login))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/boards", get(list_boards).post(create_board))
        .route(
            "/boards/:id",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/taskorders", put(reorder_task))
        .with_state(state);

    Router::new().nest(API_PREFIX, api.merge(websocket))
}

/// Wraps the router in the cross-cutting layers: request ids, tracing,
/// CORS, and the request timeout.
pub fn with_middleware(router: Router, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    router
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(config))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(FROM_ID_HEADER)]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
