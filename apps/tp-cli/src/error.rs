//! Error type of the command-line front end.

/// Unified error for every command.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Setup error: {0}")]
    Project(#[from] tp_project::ProjectError),

    #[error("Flow model error: {0}")]
    Flow(#[from] tp_flow::FlowError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
