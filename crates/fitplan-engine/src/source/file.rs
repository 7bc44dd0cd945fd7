use super::{SourceError, SuggestionSource};
use async_trait::async_trait;
use fitplan_common::protocol::{PlanKind, Suggestion, SuggestionsHistory};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only source backed by a saved history export.
///
/// Accepts either the service's history document (`workouts` and `nutrition`
/// arrays) or a flat array of suggestions.
pub struct FileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HistoryDocument {
    List(Vec<Suggestion>),
    History(SuggestionsHistory),
}

impl From<HistoryDocument> for SuggestionsHistory {
    fn from(doc: HistoryDocument) -> Self {
        match doc {
            HistoryDocument::History(history) => history,
            HistoryDocument::List(items) => {
                let (workouts, nutrition) = items
                    .into_iter()
                    .partition(|s| s.kind == PlanKind::Workout);
                SuggestionsHistory {
                    workouts,
                    nutrition,
                }
            }
        }
    }
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SuggestionSource for FileSource {
    async fn history(&mut self) -> Result<SuggestionsHistory, SourceError> {
        let content = read(&self.path).await?;
        let doc: HistoryDocument = serde_json::from_str(&content)?;
        let history = SuggestionsHistory::from(doc);
        debug!(
            "Loaded {} suggestions from {}",
            history.len(),
            self.path.display()
        );
        Ok(history)
    }
}

/// Plan text read from disk, with whatever metadata came along with it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlan {
    pub id: Option<String>,
    pub kind: Option<PlanKind>,
    pub content: String,
}

impl LoadedPlan {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: None,
            content: content.into(),
        }
    }
}

impl From<Suggestion> for LoadedPlan {
    fn from(s: Suggestion) -> Self {
        Self {
            id: Some(s.id),
            kind: Some(s.kind),
            content: s.content,
        }
    }
}

/// Reads a plan file holding either a saved suggestion (JSON) or raw plan text.
pub async fn load_plan(path: &Path) -> Result<LoadedPlan, SourceError> {
    let content = read(path).await?;
    Ok(parse_plan(content))
}

/// Same as [`load_plan`] for content already in memory.
pub fn parse_plan(content: String) -> LoadedPlan {
    if content.trim_start().starts_with('{') {
        if let Ok(suggestion) = serde_json::from_str::<Suggestion>(&content) {
            return suggestion.into();
        }
        debug!("Content looks like JSON but is not a suggestion, using it as text");
    }
    LoadedPlan::from_text(content)
}

async fn read(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}
