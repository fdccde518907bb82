//! Level configuration model
//!
//! Raw documents come in through [`document`], the typed model lives in
//! [`schema`], and [`validation`] turns the former into the latter.

pub mod document;
pub mod schema;
pub mod validation;

pub use document::{DocumentFormat, RawDocument};
pub use schema::*;
pub use validation::{UnknownFieldPolicy, ValidationOptions, Validator};
