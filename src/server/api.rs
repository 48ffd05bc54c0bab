use crate::models::chat::{ FollowUpRequest, FollowUpResponse, GenerateRequest };
use crate::orchestrator::{ GenerateError, Orchestrator };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::{
    routing::post,
    Router,
    Json,
    extract::{ DefaultBodyLimit, State, rejection::JsonRejection },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use uuid::Uuid;
use log::{ info, warn, error };

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { detail: detail.into() })).into_response()
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let status = match self {
            GenerateError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GenerateError::UpstreamDecode | GenerateError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, self.to_string())
    }
}

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

pub fn router(orchestrator: Arc<Orchestrator>, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/generate", post(generate_handler))
        .route("/follow-up", post(follow_up_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .with_state(AppState { orchestrator })
}

pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

pub async fn start_http_server(
    addr: SocketAddr,
    app: Router,
    tls: Option<TlsPaths>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match tls {
        Some(paths) => {
            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                paths.cert_path,
                paths.key_path
            );
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &paths.cert_path,
                &paths.key_path
            ).await?;

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            });

            info!("HTTPS server listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service()).await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("HTTP server listening on: http://{}", addr);
            axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(shutdown_signal()).await?;
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>
) -> Response {
    let request_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!("[{}] POST /generate rejected: {}", request_id, rejection.body_text());
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    info!(
        "[{}] POST /generate files={} history={}",
        request_id,
        request.existing_files.len(),
        request.chat_history.len()
    );

    match state.orchestrator.generate(request).await {
        Ok(response) => {
            info!("[{}] completed with {} file(s)", request_id, response.files.len());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            match &e {
                GenerateError::InvalidRequest(msg) => warn!("[{}] invalid request: {}", request_id, msg),
                _ => error!("[{}] failed: {}", request_id, e),
            }
            e.into_response()
        }
    }
}

async fn follow_up_handler(
    State(state): State<AppState>,
    payload: Result<Json<FollowUpRequest>, JsonRejection>
) -> Response {
    let request_id = Uuid::new_v4();
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!("[{}] POST /follow-up rejected: {}", request_id, rejection.body_text());
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    info!("[{}] POST /follow-up", request_id);
    let question = state.orchestrator.follow_up(&request).await;
    (StatusCode::OK, Json(FollowUpResponse { question })).into_response()
}
