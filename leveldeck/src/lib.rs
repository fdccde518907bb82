//! `leveldeck` - validated tower-defense level configuration service
//!
//! This library provides the level repository, the HTTP adapter that
//! exposes it, and the command-line front end. Schema and validation live
//! in `leveldeck-core`.

pub mod cli;
pub mod error;
pub mod observability;
pub mod repository;
pub mod transport;
