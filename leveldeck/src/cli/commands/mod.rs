//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod list;
pub mod serve;
pub mod validate;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::error::LevelDeckError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` fires when the process receives a shutdown signal.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), LevelDeckError> {
    match cli.command {
        Commands::Serve(args) => serve::run(&args, cancel).await,
        Commands::Validate(args) => validate::run(&args).await,
        Commands::List(args) => list::run(&args).await,
        Commands::Version(args) => version::run(&args),
    }
}
