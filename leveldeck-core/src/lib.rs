//! `leveldeck` core: level configuration schema and validation engine
//!
//! This crate owns the typed model of a tower-defense level document and
//! the engine that turns an untyped document into that model. It is shared
//! by the `leveldeck` service (repository, HTTP, CLI) and the fuzz targets.

pub mod error;
pub mod level;

pub use error::{ReferentialViolation, ValidationError, ValidationIssue, ValidationKind};
pub use level::document::{DocumentFormat, RawDocument};
pub use level::schema::{
    Bound, DamageTower, EnemyType, LevelConfig, MapConfig, Point, SlowTower, Spawn, TowerType, Wave,
};
pub use level::validation::{UnknownFieldPolicy, ValidationOptions, Validator};
