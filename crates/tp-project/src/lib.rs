//! tp-project: setup file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_setup};

use std::path::Path;

pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported setup file format: {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> ProjectResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(ProjectError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    fn parse(self, content: &str) -> ProjectResult<Setup> {
        Ok(match self {
            Format::Yaml => serde_yaml::from_str(content)?,
            Format::Json => serde_json::from_str(content)?,
        })
    }

    fn render(self, setup: &Setup) -> ProjectResult<String> {
        Ok(match self {
            Format::Yaml => serde_yaml::to_string(setup)?,
            Format::Json => serde_json::to_string_pretty(setup)?,
        })
    }
}

/// Load and validate a setup, picking the format from the file extension.
pub fn load(path: &Path) -> ProjectResult<Setup> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let setup = format.parse(&content)?;
    validate_setup(&setup)?;
    Ok(setup)
}

/// Validate and write a setup; nothing is written if validation fails.
pub fn save(path: &Path, setup: &Setup) -> ProjectResult<()> {
    let format = Format::from_path(path)?;
    validate_setup(setup)?;
    std::fs::write(path, format.render(setup)?)?;
    Ok(())
}
