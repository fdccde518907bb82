//! `serve` command handler.

use std::sync::Arc;

use leveldeck_core::ValidationOptions;
use tokio_util::sync::CancellationToken;

use crate::cli::args::ServeArgs;
use crate::error::LevelDeckError;
use crate::repository::{DirectoryStore, LevelRepository, RepositoryOptions};
use crate::transport::http::{HttpConfig, HttpServer, parse_bind_addr};

/// Builds the repository and serves it over HTTP until cancelled.
///
/// # Errors
///
/// Returns a transport error for an invalid or unbindable address, or a
/// startup error if the level directory is missing or holds no levels.
pub async fn run(args: &ServeArgs, cancel: CancellationToken) -> Result<(), LevelDeckError> {
    let bind_addr = parse_bind_addr(&args.http)?;

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    tracing::info!(levels = %args.levels.display(), "loading level catalog");
    let store = Arc::new(DirectoryStore::new(&args.levels));
    let options = RepositoryOptions {
        validation: ValidationOptions {
            unknown_fields: args.unknown_fields,
        },
        cache: args.cache,
    };
    let repository = Arc::new(LevelRepository::initialize(store, options).await?);

    let server = HttpServer::bind(&HttpConfig { bind_addr }, repository).await?;
    server.run(cancel).await?;
    Ok(())
}
