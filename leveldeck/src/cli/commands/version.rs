//! Version information display
//!
//! Prints version metadata in human or JSON format.

use serde_json::json;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::error::LevelDeckError;

/// Print version information.
///
/// # Errors
///
/// Returns a JSON error if the version record cannot be serialized.
pub fn run(args: &VersionArgs) -> Result<(), LevelDeckError> {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version}");
        }
        OutputFormat::Json => {
            let out = json!({ "name": name, "version": version });
            println!("{}", serde_json::to_string(&out)?);
        }
    }
    Ok(())
}
