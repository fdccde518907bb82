//! `list` command handler.

use serde_json::json;

use crate::cli::args::{ListArgs, OutputFormat};
use crate::error::LevelDeckError;
use crate::repository::{Catalog, DirectoryStore, LevelStore};

/// Prints the level identifiers found in `args.levels`.
///
/// Documents are not validated; use `validate` for that.
///
/// # Errors
///
/// Returns a storage error if the directory is missing, unreadable, or
/// holds two documents with the same identifier.
pub async fn run(args: &ListArgs) -> Result<(), LevelDeckError> {
    let store = DirectoryStore::new(&args.levels);
    let catalog = Catalog::new(store.list_ids().await?);
    tracing::info!(location = %store.location(), levels = catalog.len(), "listed levels");

    match args.format {
        OutputFormat::Human => {
            for id in catalog.ids() {
                println!("{id}");
            }
        }
        OutputFormat::Json => {
            let out = json!({ "location": store.location(), "levels": catalog });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
