//! # HTTP Server
//!
//! Router assembly, request logging and the serve/shutdown lifecycle.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    Router,
};
use itemstore_core::core_version;
use itemstore_core::db::{open_db, provision_db};
use log::{info, warn};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::routes::item_routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full router with request logging
pub fn build_router(state: AppState) -> Router {
    item_routes(state).layer(middleware::from_fn(log_requests))
}

/// Opens the store, serves until a shutdown signal, then closes the store.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let location = config.database_location()?;
    let conn = if config.should_provision(&location) {
        provision_db(&location)?
    } else {
        open_db(&location)?
    };
    let state = AppState::new(conn);

    let addr: SocketAddr = config
        .listen
        .parse()
        .map_err(|_| ServerError::ListenAddr(config.listen.clone()))?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        "event=server_start module=server status=ok listen={} database={} version={}",
        listener.local_addr()?,
        location,
        core_version()
    );

    axum::serve(listener, build_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    state.close()?;
    Ok(())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    info!(
        "event=http_request module=server status={} method={} path={} request_id={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        request_id,
        started_at.elapsed().as_millis()
    );
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("event=signal module=server status=error error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("event=signal module=server status=error error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("event=shutdown_requested module=server status=ok");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_rejects_malformed_database_url() {
        let config = ServerConfig::with_database_url("mysql://localhost/items");
        let err = serve(config).await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn test_serve_refuses_unprovisioned_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:///{}", dir.path().join("items.db").display());
        let err = serve(ServerConfig::with_database_url(url)).await.unwrap_err();
        assert!(matches!(err, ServerError::Database(_)));
    }

    #[tokio::test]
    async fn test_serve_rejects_bad_listen_address() {
        let mut config = ServerConfig::with_database_url("sqlite::memory:");
        config.listen = "not-an-address".to_string();
        let err = serve(config).await.unwrap_err();
        assert!(matches!(err, ServerError::ListenAddr(addr) if addr == "not-an-address"));
    }
}
