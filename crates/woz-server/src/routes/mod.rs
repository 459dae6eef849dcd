//! Route handlers for the Wizard-of-Oz backend.

pub mod frequent_response;
pub mod health;
pub mod session;
pub mod task_classification;
pub mod ws;

use std::path::Path;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Frequent responses
        .route(
            "/frequentResponse",
            get(frequent_response::list).post(frequent_response::create),
        )
        .route(
            "/frequentResponse/:id",
            get(frequent_response::get)
                .put(frequent_response::update)
                .delete(frequent_response::delete),
        )
        // Task classifications
        .route(
            "/frequentResponse/taskClassifications",
            get(task_classification::list).post(task_classification::create),
        )
        .route(
            "/frequentResponse/taskClassifications/:id",
            put(task_classification::update).delete(task_classification::delete),
        )
        // Sessions
        .route("/message", post(session::post_message))
        .route("/log", post(session::post_log))
        .route("/sessions", get(session::list_sessions))
        .route("/sessions/:session_id", get(session::get_session))
        // Realtime relay
        .route("/ws/:role/:session_id", get(ws::ws_handler))
}

/// Full application: routes, static files, CORS and request tracing.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    // The wizard console is opened from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router()
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use relay::RelayRegistry;
    use tower::ServiceExt; // for `oneshot`
    use woz_store::{
        FrequentResponse, FrequentResponses, MemoryStore, TaskClassification, TaskClassifications,
    };

    use crate::state::AppState;

    /// Backing stores of a test app, for inspecting or failing writes.
    pub struct TestStores {
        pub frequent_responses: Arc<MemoryStore<FrequentResponse>>,
        pub task_classifications: Arc<MemoryStore<TaskClassification>>,
    }

    pub async fn test_state() -> (AppState, TestStores) {
        let stores = TestStores {
            frequent_responses: Arc::new(MemoryStore::new()),
            task_classifications: Arc::new(MemoryStore::new()),
        };
        let state = AppState::new(
            FrequentResponses::open(stores.frequent_responses.clone()).await,
            TaskClassifications::open(stores.task_classifications.clone()).await,
            RelayRegistry::new(8),
        );
        (state, stores)
    }

    pub async fn test_app() -> (Router, TestStores) {
        let (state, stores) = test_state().await;
        let dir = std::env::temp_dir();
        (super::app(state, &dir), stores)
    }

    /// Serve a fresh app on an ephemeral port.
    pub async fn serve() -> (SocketAddr, AppState) {
        let (state, _) = test_state().await;
        let app = super::app(state.clone(), &std::env::temp_dir());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, state)
    }

    /// Send a request and decode the JSON response body (`Null` if not JSON).
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}
