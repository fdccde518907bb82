//! Transport adapters exposing the level repository.

pub mod http;

pub use http::{ApiError, HttpConfig, HttpServer, parse_bind_addr, router};
