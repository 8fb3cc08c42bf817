use thiserror::Error;

/// Errors that can occur while synchronizing recipes with the meal API
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport-level failure talking to the meal API
    #[error("Failed to fetch from meal API: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The meal API answered with a non-success status
    #[error("Meal API returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body was not the JSON shape we expect
    #[error("Failed to decode meal API response: {0}")]
    DecodeError(#[from] serde_json::Error),

    /// A locally composed recipe is missing required fields
    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
