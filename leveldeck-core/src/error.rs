//! Validation error types for level documents
//!
//! Every failure the validation engine can produce. The service crate wraps
//! these in its own lookup and startup errors.

use serde::Serialize;
use thiserror::Error;

use crate::level::document::DocumentFormat;

// ============================================================================
// Validation Errors
// ============================================================================

/// A level document failed validation.
///
/// Validation is binary: a document either produces a complete
/// [`LevelConfig`](crate::LevelConfig) or one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The raw bytes could not be parsed into a document tree
    #[error("malformed {format} document{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    Syntax {
        /// Format the document was parsed as
        format: DocumentFormat,
        /// Line number where parsing failed (if the parser reports one)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// One or more fields violate their declared constraint.
    ///
    /// Issues are ordered by field declaration order, then list order.
    #[error("{} structural violation(s), first: {}", issues.len(), first_issue(issues))]
    Structural {
        /// Every violation found, in walk order
        issues: Vec<ValidationIssue>,
    },

    /// A uniqueness or cross-reference invariant does not hold
    #[error(transparent)]
    Referential(#[from] ReferentialViolation),
}

impl ValidationError {
    /// Returns which validation phase rejected the document.
    ///
    /// Syntax failures belong to the structural phase.
    #[must_use]
    pub const fn kind(&self) -> ValidationKind {
        match self {
            Self::Syntax { .. } | Self::Structural { .. } => ValidationKind::Structural,
            Self::Referential(_) => ValidationKind::Referential,
        }
    }

    /// Returns the structural issues, or an empty slice for other variants.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Structural { issues } => issues,
            Self::Syntax { .. } | Self::Referential(_) => &[],
        }
    }
}

fn first_issue(issues: &[ValidationIssue]) -> String {
    issues
        .first()
        .map_or_else(|| "<none>".to_string(), ToString::to_string)
}

/// Validation phase classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// Per-field constraint checking
    Structural,
    /// Cross-entity consistency checking
    Referential,
}

impl ValidationKind {
    /// Stable lowercase label, used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Referential => "referential",
        }
    }
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Structural Issues
// ============================================================================

/// A single field that violates its declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path to the offending field (e.g. `"tower_types[1].slow_percent"`).
    /// Empty for the document root.
    pub path: String,
    /// Description of the violation
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue at `path`.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} at document root", self.message)
        } else {
            write!(f, "{} at {}", self.message, self.path)
        }
    }
}

// ============================================================================
// Referential Violations
// ============================================================================

/// The first cross-entity invariant found broken.
///
/// Checked in a fixed order: enemy id uniqueness, tower id uniqueness,
/// then spawn references wave by wave.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferentialViolation {
    /// Two enemy types share an id
    #[error("duplicate enemy type id '{id}' at enemy_types[{index}] (first declared at enemy_types[{first_index}])")]
    DuplicateEnemyId {
        /// The repeated id
        id: String,
        /// Index of the first declaration
        first_index: usize,
        /// Index of the repeated declaration
        index: usize,
    },

    /// Two tower types share an id
    #[error("duplicate tower type id '{id}' at tower_types[{index}] (first declared at tower_types[{first_index}])")]
    DuplicateTowerId {
        /// The repeated id
        id: String,
        /// Index of the first declaration
        first_index: usize,
        /// Index of the repeated declaration
        index: usize,
    },

    /// A spawn names an enemy type the level does not declare
    #[error(
        "unknown enemy_type '{enemy_type}' in wave {wave_number} (waves[{wave_index}].spawns[{spawn_index}]){}",
        suggestion.as_ref().map_or_else(String::new, |s| format!("; did you mean '{s}'?"))
    )]
    UnknownEnemyType {
        /// Position of the wave in `waves`
        wave_index: usize,
        /// The wave's declared `number`
        wave_number: u32,
        /// Position of the spawn in the wave's `spawns`
        spawn_index: usize,
        /// The unresolved reference
        enemy_type: String,
        /// Closest declared enemy id, if any is close
        suggestion: Option<String>,
    },
}

impl ReferentialViolation {
    /// Path to the offending field, in the same notation as
    /// [`ValidationIssue::path`].
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::DuplicateEnemyId { index, .. } => format!("enemy_types[{index}].id"),
            Self::DuplicateTowerId { index, .. } => format!("tower_types[{index}].id"),
            Self::UnknownEnemyType {
                wave_index,
                spawn_index,
                ..
            } => format!("waves[{wave_index}].spawns[{spawn_index}].enemy_type"),
        }
    }
}
