pub mod file;
pub mod http;

pub use file::{FileSource, LoadedPlan, load_plan, parse_plan};
pub use http::HttpSource;

use async_trait::async_trait;
use fitplan_common::profile::ValidationError;
use fitplan_common::protocol::{
    PlanKind, ProfileUpdate, Suggestion, SuggestionsHistory, UserProfile,
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Session expired or missing, log in again")]
    Unauthorized,
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid profile: {0}")]
    Validation(#[from] ValidationError),
    #[error("Suggestion not found: {0}")]
    NotFound(String),
    #[error("Operation not supported by this source: {0}")]
    NotSupported(String),
}

/// Where generated plans come from.
///
/// Methods take `&mut self` so an implementation can drop its credentials
/// when the service rejects them.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Ask for a freshly generated plan of the given kind.
    async fn generate(&mut self, _kind: PlanKind) -> Result<Suggestion, SourceError> {
        Err(SourceError::NotSupported("generate".into()))
    }

    /// All saved plans, split by kind.
    async fn history(&mut self) -> Result<SuggestionsHistory, SourceError>;

    async fn delete(&mut self, _id: &str) -> Result<(), SourceError> {
        Err(SourceError::NotSupported("delete".into()))
    }

    async fn profile(&mut self) -> Result<UserProfile, SourceError> {
        Err(SourceError::NotSupported("profile".into()))
    }

    /// Apply a partial profile update. Values are range-checked before anything is sent.
    async fn update_profile(
        &mut self,
        _update: &ProfileUpdate,
    ) -> Result<UserProfile, SourceError> {
        Err(SourceError::NotSupported("update_profile".into()))
    }

    /// Look a single plan up by id.
    async fn fetch(&mut self, id: &str) -> Result<Suggestion, SourceError> {
        let history = self.history().await?;
        history
            .find(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}
