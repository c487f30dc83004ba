use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{any, get},
    Router,
};
use proxy::GenerationProxy;
use storage::entry_storage::{EntryStorage, FileEntryStorage};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::utils::clock::DefaultClock;

pub mod args;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod shutdown;
pub mod storage;

use args::ServerArgs;

pub const ENTRIES_ROUTE: &str = "/api/timeEntries";
pub const GENERATION_ROUTE: &str = "/api/ollama/*path";

/// Shared by every handler. The collection is opened once when the server starts.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn EntryStorage>,
    pub proxy: Arc<GenerationProxy>,
}

impl AppState {
    pub fn new(storage: impl EntryStorage, proxy: GenerationProxy) -> Self {
        Self {
            storage: Arc::new(storage),
            proxy: Arc::new(proxy),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route(
            ENTRIES_ROUTE,
            get(routes::get_entries).post(routes::create_entry),
        )
        .route(GENERATION_ROUTE, any(proxy::forward_generation))
        .with_state(state)
        .layer(cors)
}

/// Starting point for `serve`. Runs until Ctrl-C or SIGTERM.
pub async fn start_server(args: ServerArgs, data_dir: PathBuf) -> Result<()> {
    let storage = FileEntryStorage::new(data_dir.join("data"), Box::new(DefaultClock))?;
    info!("Collection: {}", storage.collection_path().display());
    let state = AppState::new(storage, GenerationProxy::new(&args.ollama_url));
    info!("Forwarding generation requests to {}", args.ollama_url);

    let listener = TcpListener::bind(args.listen)
        .await
        .inspect_err(|e| error!("Failed to bind {} {e:?}", args.listen))?;

    let shutdown_token = CancellationToken::new();

    let (_, serve_result) = tokio::join!(shutdown::detect_shutdown(shutdown_token.clone()), async {
        let result = serve(listener, state, shutdown_token.clone()).await;
        shutdown_token.cancel();
        result
    });

    serve_result
}

/// Serves the API on an already bound listener until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Server stopped");
    Ok(())
}


#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::{routing::post, Json, Router};
    use chrono::{Duration, TimeZone, Utc};
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use crate::{
        server::{
            error::ErrorBody,
            proxy::GenerationProxy,
            storage::{
                entities::{TimeEntryDocument, TimeEntryFields},
                entry_storage::{EntryStorage, FileEntryStorage},
            },
            AppState,
        },
        tracker::entry::TimeEntry,
        utils::{clock::DefaultClock, logging::TEST_LOGGING},
    };

    use super::test_server::{spawn_api, spawn_router};

    struct BrokenStorage;

    #[async_trait]
    impl EntryStorage for BrokenStorage {
        async fn create(&self, _fields: TimeEntryFields) -> Result<TimeEntryDocument> {
            Err(anyhow!("store is down"))
        }

        async fn find_all(&self) -> Result<Vec<TimeEntryDocument>> {
            Err(anyhow!("store is down"))
        }
    }

    fn qantas_entry() -> TimeEntry {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        TimeEntry::begin("Qantas".into(), "flight research".into(), start)
            .complete(start + Duration::milliseconds(65_000))
    }

    #[tokio::test]
    async fn entries_round_trip_through_api() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let storage = FileEntryStorage::new(dir.path().to_path_buf(), Box::new(DefaultClock))?;
        let state = AppState::new(storage, GenerationProxy::new("http://127.0.0.1:9"));
        let (addr, token) = spawn_api(state).await?;
        let client = reqwest::Client::new();
        let url = format!("http://{addr}/api/timeEntries");

        let listed: Vec<Value> = client.get(&url).send().await?.json().await?;
        assert!(listed.is_empty());

        let entry = qantas_entry();
        let response = client.post(&url).json(&entry).send().await?;
        assert_eq!(response.status(), StatusCode::OK);
        let stored: TimeEntryDocument = response.json().await?;
        assert_eq!(stored.to_entry(), Some(entry.clone()));

        let listed: Vec<TimeEntryDocument> = client.get(&url).send().await?.json().await?;
        assert_eq!(listed, vec![stored]);

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn malformed_entry_is_a_generic_server_error() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileEntryStorage::new(dir.path().to_path_buf(), Box::new(DefaultClock))?;
        let state = AppState::new(storage, GenerationProxy::new("http://127.0.0.1:9"));
        let (addr, token) = spawn_api(state).await?;
        let url = format!("http://{addr}/api/timeEntries");

        let response = reqwest::Client::new()
            .post(&url)
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = response.json().await?;
        assert_eq!(body.error, "Failed to create entry");

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn store_failures_are_generic_server_errors() -> Result<()> {
        let state = AppState::new(BrokenStorage, GenerationProxy::new("http://127.0.0.1:9"));
        let (addr, token) = spawn_api(state).await?;
        let client = reqwest::Client::new();
        let url = format!("http://{addr}/api/timeEntries");

        let response = client.post(&url).json(&qantas_entry()).send().await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<ErrorBody>().await?.error,
            "Failed to create entry"
        );

        let response = client.get(&url).send().await?;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<ErrorBody>().await?.error,
            "Failed to fetch entries"
        );

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn generation_requests_are_forwarded() -> Result<()> {
        let upstream = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "model": body["model"],
                    "response": format!("echo: {}", body["prompt"].as_str().unwrap_or_default()),
                    "done": true,
                }))
            }),
        );
        let upstream_addr = spawn_router(upstream).await?;

        let state = AppState::new(
            BrokenStorage,
            GenerationProxy::new(&format!("http://{upstream_addr}")),
        );
        let (addr, token) = spawn_api(state).await?;

        let response = reqwest::Client::new()
            .post(format!("http://{addr}/api/ollama/generate"))
            .json(&json!({ "model": "llama2", "prompt": "hi", "stream": false }))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await?;
        assert_eq!(body["response"], "echo: hi");
        assert_eq!(body["model"], "llama2");

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn unknown_upstream_paths_keep_upstream_status() -> Result<()> {
        let upstream_addr = spawn_router(Router::new()).await?;
        let state = AppState::new(
            BrokenStorage,
            GenerationProxy::new(&format!("http://{upstream_addr}")),
        );
        let (addr, token) = spawn_api(state).await?;

        let response = reqwest::Client::new()
            .get(format!("http://{addr}/api/ollama/missing"))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        token.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_generation_service_is_bad_gateway() -> Result<()> {
        // Nothing listens on the discard port.
        let state = AppState::new(BrokenStorage, GenerationProxy::new("http://127.0.0.1:9"));
        let (addr, token) = spawn_api(state).await?;

        let response = reqwest::Client::new()
            .post(format!("http://{addr}/api/ollama/generate"))
            .json(&json!({ "model": "llama2", "prompt": "hi", "stream": false }))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.json::<ErrorBody>().await?.error,
            "Failed to reach generation service"
        );

        token.cancel();
        Ok(())
    }
}
