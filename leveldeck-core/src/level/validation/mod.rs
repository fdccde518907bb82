//! Level document validation
//!
//! Two ordered phases turn an untyped document into a [`LevelConfig`]:
//!
//! 1. **Structural** ([`structural`]): walks the document field by field in
//!    declaration order, checking each field on its own. All violations are
//!    collected, not just the first, so one run reports every broken field.
//! 2. **Referential** ([`referential`]): runs only on a structurally valid
//!    document. Checks id uniqueness and spawn references, stopping at the
//!    first violation.
//!
//! The outcome is binary: a complete `LevelConfig` or a [`ValidationError`].

mod referential;
mod structural;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::level::document::RawDocument;
use crate::level::schema::LevelConfig;

/// What to do with document fields the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Skip unknown fields silently (default)
    #[default]
    Ignore,
    /// Report each unknown field as a structural violation
    Deny,
}

/// Options for the [`Validator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Handling of undeclared fields.
    pub unknown_fields: UnknownFieldPolicy,
}

/// Level document validator.
///
/// Stateless apart from its options, so one instance can serve concurrent
/// validations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    /// Creates a validator with the given options.
    #[must_use]
    pub const fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Parses and validates a raw document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Syntax`] if the document cannot be
    /// parsed, otherwise the same errors as [`Validator::validate`].
    pub fn validate_document(&self, document: &RawDocument) -> Result<LevelConfig, ValidationError> {
        let value = document.parse()?;
        self.validate(&value)
    }

    /// Validates an untyped document tree.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Structural`] with every field violation
    /// found, or, for a structurally valid document, the first
    /// [`ValidationError::Referential`] violation.
    pub fn validate(&self, value: &Value) -> Result<LevelConfig, ValidationError> {
        let config = structural::Walker::new(self.options)
            .run(value)
            .map_err(|issues| ValidationError::Structural { issues })?;

        referential::check(&config)?;

        Ok(config)
    }
}

/// Suggests the closest candidate for a misspelled name.
///
/// Returns the candidate with the smallest Damerau-Levenshtein distance,
/// if that distance is at most 3 and smaller than the input itself.
fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .map(|c| (c, strsim::damerau_levenshtein(input, c)))
        .filter(|(_, dist)| *dist <= 3 && *dist < input.chars().count())
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| c.to_string())
}
