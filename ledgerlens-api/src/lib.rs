//! ledgerlens-api: axum HTTP surface over ingestion, analytics, and providers.

pub mod routes;
pub mod state;
pub mod store;

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;
pub use store::Store;

/// Statement PDFs run well past axum's 2 MB default
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/upload", post(routes::upload::upload))
        .route("/transactions", get(routes::transactions::get_transactions))
        .route("/analysis", get(routes::analysis::get_analysis))
        .route("/chat", post(routes::chat::chat))
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::root))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the API server until interrupted.
pub async fn run_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!("API listening on http://{host}:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ledgerlens_providers::ProviderKind;
    use tower::util::ServiceExt;

    fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Store::new(dir.path()), ProviderKind::Claude, None);
        (create_router(state), dir)
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let (app, _dir) = test_app();
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_transactions_empty_store() {
        let (app, _dir) = test_app();
        let resp = app
            .oneshot(Request::builder().uri("/api/transactions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analysis_requires_statement() {
        let (app, _dir) = test_app();
        let resp = app
            .oneshot(Request::builder().uri("/api/analysis").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_requires_report() {
        let (app, _dir) = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message":"how much did I spend?"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_extension() {
        // multipart body assembled by hand; boundary must match the header
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"notes.docx\"\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let (app, _dir) = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/upload")
                    .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
