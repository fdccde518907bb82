//! `validate` command handler.
//!
//! Checks level documents offline with the same validator the server uses
//! and reports every file, not just the first failure.

use std::path::{Path, PathBuf};

use leveldeck_core::{LevelConfig, ValidationError, ValidationIssue, ValidationOptions, Validator};
use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::error::{LevelDeckError, StorageError};
use crate::repository::{DocumentLimits, read_document};

/// Outcome for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File as given on the command line
    pub file: PathBuf,
    /// Whether the file holds a valid level
    pub valid: bool,
    /// Summary of the level, when valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelSummary>,
    /// Violations, when invalid
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationIssue>,
}

/// Headline facts about a valid level.
#[derive(Debug, Serialize)]
pub struct LevelSummary {
    pub id: i64,
    pub name: String,
    pub enemy_types: usize,
    pub tower_types: usize,
    pub waves: usize,
}

impl From<&LevelConfig> for LevelSummary {
    fn from(level: &LevelConfig) -> Self {
        Self {
            id: level.id,
            name: level.name.clone(),
            enemy_types: level.enemy_types.len(),
            tower_types: level.tower_types.len(),
            waves: level.waves.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    total: usize,
    valid: usize,
    invalid: usize,
}

/// Validates every file in `args.files` and prints a report.
///
/// # Errors
///
/// Returns a storage error if any file could not be read, otherwise
/// [`LevelDeckError::Invalid`] if any file failed validation.
pub async fn run(args: &ValidateArgs) -> Result<(), LevelDeckError> {
    let validator = Validator::new(ValidationOptions {
        unknown_fields: args.unknown_fields,
    });
    let limits = DocumentLimits::default();

    let mut reports = Vec::with_capacity(args.files.len());
    let mut read_failure: Option<StorageError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating level document");
        match check_file(&validator, path, limits).await {
            Ok(report) => reports.push(report),
            Err(err) => {
                tracing::error!(file = %path.display(), error = %err, "cannot read level document");
                reports.push(FileReport {
                    file: path.clone(),
                    valid: false,
                    level: None,
                    errors: vec![ValidationIssue::new("", err.to_string())],
                });
                read_failure.get_or_insert(err);
            }
        }
    }

    let invalid = reports.iter().filter(|r| !r.valid).count();
    let summary = Summary {
        total: reports.len(),
        valid: reports.len() - invalid,
        invalid,
    };

    match args.format {
        OutputFormat::Human => print_human(&reports, &summary),
        OutputFormat::Json => {
            let out = serde_json::json!({ "files": reports, "summary": summary });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    if let Some(err) = read_failure {
        return Err(err.into());
    }
    if invalid > 0 {
        return Err(LevelDeckError::Invalid {
            failed: invalid,
            total: summary.total,
        });
    }
    Ok(())
}

/// Reads and validates one file.
///
/// # Errors
///
/// Returns a [`StorageError`] if the file cannot be read. Validation
/// failures are part of the returned report.
pub async fn check_file(
    validator: &Validator,
    path: &Path,
    limits: DocumentLimits,
) -> Result<FileReport, StorageError> {
    let document = read_document(path, limits).await?;

    let report = match validator.validate_document(&document) {
        Ok(level) => FileReport {
            file: path.to_path_buf(),
            valid: true,
            level: Some(LevelSummary::from(&level)),
            errors: Vec::new(),
        },
        Err(err) => FileReport {
            file: path.to_path_buf(),
            valid: false,
            level: None,
            errors: issues_of(&err),
        },
    };
    Ok(report)
}

/// Flattens any validation failure into path/message issues.
fn issues_of(err: &ValidationError) -> Vec<ValidationIssue> {
    match err {
        ValidationError::Structural { issues } => issues.clone(),
        ValidationError::Referential(violation) => {
            vec![ValidationIssue::new(violation.path(), violation.to_string())]
        }
        ValidationError::Syntax { .. } => vec![ValidationIssue::new("", err.to_string())],
    }
}

fn print_human(reports: &[FileReport], summary: &Summary) {
    for report in reports {
        if let Some(level) = &report.level {
            println!(
                "ok      {} (level {} \"{}\": {} enemy types, {} tower types, {} waves)",
                report.file.display(),
                level.id,
                level.name,
                level.enemy_types,
                level.tower_types,
                level.waves
            );
        } else {
            println!("invalid {}", report.file.display());
            for issue in &report.errors {
                println!("        - {issue}");
            }
        }
    }
    println!(
        "\n{} file(s) checked: {} valid, {} invalid",
        summary.total, summary.valid, summary.invalid
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use leveldeck_core::ReferentialViolation;
    use tempfile::TempDir;

    const LEVEL: &str = r#"{
        "id": 1, "name": "Test Level", "start_gold": 100, "lives": 10,
        "map": {"width": 800, "height": 600, "path": [{"x": 0, "y": 0}]},
        "enemy_types": [{"id": "e1", "name": "Grunt", "hp": 10, "speed": 1.0, "reward": 5, "slow_resistance": 0}],
        "tower_types": [],
        "waves": [{"number": 1, "spawns": [{"enemy_type": "e1", "count": 3, "spawn_interval": 1.0}]}]
    }"#;

    #[tokio::test]
    async fn test_check_file_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.json");
        std::fs::write(&path, LEVEL).unwrap();

        let report = check_file(&Validator::default(), &path, DocumentLimits::default())
            .await
            .unwrap();
        assert!(report.valid);
        assert_eq!(report.level.unwrap().waves, 1);
    }

    #[tokio::test]
    async fn test_check_file_invalid_collects_issues() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("1.json");
        std::fs::write(
            &path,
            LEVEL
                .replace("\"lives\": 10", "\"lives\": 0")
                .replace("\"hp\": 10", "\"hp\": -1"),
        )
        .unwrap();

        let report = check_file(&Validator::default(), &path, DocumentLimits::default())
            .await
            .unwrap();
        assert!(!report.valid);
        let paths: Vec<_> = report.errors.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["lives", "enemy_types[0].hp"]);
    }

    #[test]
    fn test_referential_issue_carries_path() {
        let err = ValidationError::Referential(ReferentialViolation::UnknownEnemyType {
            wave_index: 0,
            wave_number: 1,
            spawn_index: 2,
            enemy_type: "ghost".to_string(),
            suggestion: None,
        });
        let issues = issues_of(&err);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "waves[0].spawns[2].enemy_type");
    }

    #[test]
    fn test_report_json_shape() {
        let report = FileReport {
            file: PathBuf::from("bad.json"),
            valid: false,
            level: None,
            errors: vec![ValidationIssue::new("lives", "must be > 0")],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["errors"][0]["path"], "lives");
        assert!(value.get("level").is_none());
    }
}
