//! Shared integration-test helpers: fixture paths, temporary level
//! directories, and running the `leveldeck` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use leveldeck::repository::{DirectoryStore, LevelRepository, RepositoryOptions};
use tempfile::TempDir;

/// The smallest complete level: one enemy, one damage tower, one wave.
pub const MINIMAL_LEVEL: &str = r#"{
    "id": 1,
    "name": "Test Level",
    "start_gold": 100,
    "lives": 10,
    "map": {"width": 800, "height": 600, "path": [{"x": 0, "y": 0}, {"x": 10, "y": 0}]},
    "enemy_types": [
        {"id": "e1", "name": "Grunt", "hp": 10, "speed": 1.0, "reward": 5, "slow_resistance": 0}
    ],
    "tower_types": [
        {"id": "t1", "name": "Arrow", "damage": 5, "attack_speed": 1.0, "range": 3.0, "cost": 50, "type": "damage"}
    ],
    "waves": [
        {"number": 1, "spawns": [{"enemy_type": "e1", "count": 3, "spawn_interval": 1.0}]}
    ]
}"#;

/// Resolves a path under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Creates a temporary level directory holding `files`.
#[allow(clippy::missing_panics_doc)]
pub fn level_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).expect("failed to write level");
    }
    dir
}

/// Builds a repository over a directory with default options.
#[allow(clippy::missing_panics_doc)]
pub async fn repository(dir: &Path) -> Arc<LevelRepository> {
    repository_with(dir, RepositoryOptions::default()).await
}

/// Builds a repository over a directory with explicit options.
#[allow(clippy::missing_panics_doc)]
pub async fn repository_with(dir: &Path, options: RepositoryOptions) -> Arc<LevelRepository> {
    let store = Arc::new(DirectoryStore::new(dir));
    Arc::new(
        LevelRepository::initialize(store, options)
            .await
            .expect("repository should initialize"),
    )
}

/// Runs the `leveldeck` binary to completion with logging silenced.
#[allow(clippy::missing_panics_doc)]
pub fn run_leveldeck(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_leveldeck"))
        .args(args)
        .env_remove("LEVELDECK_LEVELS")
        .env_remove("LEVELDECK_HTTP")
        .env_remove("LEVELDECK_LOG_LEVEL")
        .output()
        .expect("failed to run leveldeck")
}

/// Converts a path to `&str` for use as a CLI argument.
#[allow(clippy::missing_panics_doc)]
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 path")
}
