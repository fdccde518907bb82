//! HTTP transport.
//!
//! Read-only JSON API over the level repository:
//!
//! - `GET /api/v1/levels/{level_id}` returns the validated level.
//! - `GET /api/v1/levels` lists the catalog.
//! - `GET /health` reports liveness and catalog size.
//!
//! Unknown levels are a client error (404). Invalid or unreadable stored
//! documents are operator misconfiguration and surface as 500 without the
//! internal diagnostic, which is logged instead.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{FailureKind, LookupError, TransportError};
use crate::repository::LevelRepository;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind to, e.g. `"0.0.0.0:8080"`.
    pub bind_addr: String,
}

// ============================================================================
// Server
// ============================================================================

/// A bound HTTP listener serving one repository.
#[derive(Debug)]
pub struct HttpServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    repository: Arc<LevelRepository>,
}

impl HttpServer {
    /// Binds the listener.
    ///
    /// Binding to port 0 picks an ephemeral port; [`HttpServer::local_addr`]
    /// reports the actual one.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Bind`] if the TCP listener cannot bind.
    pub async fn bind(
        config: &HttpConfig,
        repository: Arc<LevelRepository>,
    ) -> Result<Self, TransportError> {
        let listener =
            TcpListener::bind(&config.bind_addr)
                .await
                .map_err(|source| TransportError::Bind {
                    addr: config.bind_addr.clone(),
                    source,
                })?;
        let local_addr = listener.local_addr().map_err(|source| TransportError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;

        Ok(Self {
            listener,
            local_addr,
            repository,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until `cancel` fires, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Serve`] if the server loop fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), TransportError> {
        let bound_addr = self.local_addr;
        info!(%bound_addr, "HTTP server listening");

        axum::serve(self.listener, router(self.repository))
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
            })
            .await
            .map_err(TransportError::Serve)?;

        debug!("HTTP server shut down");
        Ok(())
    }
}

/// Builds the API router.
pub fn router(repository: Arc<LevelRepository>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/v1/levels", get(handle_list_levels))
        .route("/api/v1/levels/{level_id}", get(handle_get_level))
        .with_state(repository)
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/v1/levels/{level_id}`
async fn handle_get_level(
    State(repository): State<Arc<LevelRepository>>,
    Path(level_id): Path<String>,
) -> Result<Response, ApiError> {
    let level = repository.lookup(&level_id).await?;
    Ok(Json(level.as_ref()).into_response())
}

#[derive(Serialize)]
struct LevelList<'a> {
    levels: Vec<&'a str>,
}

/// `GET /api/v1/levels`
#[allow(clippy::unused_async)]
async fn handle_list_levels(State(repository): State<Arc<LevelRepository>>) -> Response {
    let body = LevelList {
        levels: repository.catalog().ids().collect(),
    };
    Json(body).into_response()
}

/// `GET /health`
#[allow(clippy::unused_async)]
async fn handle_health(State(repository): State<Arc<LevelRepository>>) -> Response {
    Json(json!({
        "status": "ok",
        "levels": repository.catalog().len(),
    }))
    .into_response()
}

// ============================================================================
// Errors
// ============================================================================

/// A lookup failure rendered as an HTTP response.
///
/// Bodies have the form `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug)]
pub struct ApiError(pub LookupError);

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status and machine-readable code for this failure.
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self.0.kind() {
            FailureKind::NotFound => (StatusCode::NOT_FOUND, "LEVEL_NOT_FOUND"),
            FailureKind::Validation => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_LEVEL"),
            FailureKind::Storage => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self.0.kind() {
            FailureKind::NotFound => self.0.to_string(),
            FailureKind::Validation => {
                tracing::error!(level_id = %self.0.id(), error = %self.0, "serving invalid level configuration");
                "level configuration is invalid".to_string()
            }
            FailureKind::Storage => {
                tracing::error!(level_id = %self.0.id(), error = %self.0, "level storage failure");
                "level configuration could not be read".to_string()
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses a bind address string into a full `host:port` form.
///
/// Accepts:
/// - `:8080` → `0.0.0.0:8080`
/// - `8080` → `0.0.0.0:8080`
/// - `1.2.3.4:8080` → as-is
///
/// # Errors
///
/// Returns [`TransportError::InvalidAddress`] if the result cannot be
/// parsed as a valid socket address.
pub fn parse_bind_addr(input: &str) -> Result<String, TransportError> {
    let addr = if input.starts_with(':') {
        format!("0.0.0.0{input}")
    } else if input.parse::<u16>().is_ok() {
        format!("0.0.0.0:{input}")
    } else {
        input.to_string()
    };
    addr.parse::<SocketAddr>()
        .map_err(|e| TransportError::InvalidAddress {
            input: input.to_string(),
            message: e.to_string(),
        })?;
    Ok(addr)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use leveldeck_core::ValidationError;

    #[test]
    fn parse_bind_addr_colon_port() {
        assert_eq!(parse_bind_addr(":8080").unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn parse_bind_addr_port_only() {
        assert_eq!(parse_bind_addr("8080").unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn parse_bind_addr_full() {
        assert_eq!(parse_bind_addr("1.2.3.4:8080").unwrap(), "1.2.3.4:8080");
        assert_eq!(parse_bind_addr("[::1]:3000").unwrap(), "[::1]:3000");
    }

    #[test]
    fn parse_bind_addr_invalid() {
        assert!(matches!(
            parse_bind_addr("not-an-address"),
            Err(TransportError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError(LookupError::NotFound {
            id: "nonexistent".to_string(),
        });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::NOT_FOUND, "LEVEL_NOT_FOUND")
        );
    }

    #[test]
    fn invalid_level_maps_to_500() {
        let err = ApiError(LookupError::Invalid {
            id: "1".to_string(),
            source: ValidationError::Structural { issues: vec![] },
        });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_LEVEL")
        );
    }

    #[test]
    fn storage_failure_maps_to_500() {
        let err = ApiError(LookupError::Storage {
            id: "1".to_string(),
            source: StorageError::Missing { id: "1".to_string() },
        });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
        );
    }

    #[tokio::test]
    async fn bind_reports_ephemeral_port() {
        use crate::repository::{MemoryStore, RepositoryOptions};
        use leveldeck_core::RawDocument;

        let store = Arc::new(MemoryStore::new().with_document("1", RawDocument::json("{}")));
        let repository = Arc::new(
            LevelRepository::initialize(store, RepositoryOptions::default())
                .await
                .unwrap(),
        );
        let server = HttpServer::bind(
            &HttpConfig {
                bind_addr: "127.0.0.1:0".to_string(),
            },
            repository,
        )
        .await
        .unwrap();
        assert_ne!(server.local_addr().port(), 0);

        let cancel = CancellationToken::new();
        cancel.cancel();
        server.run(cancel).await.unwrap();
    }
}
