//! GET /api/paper-info?doi=<doi>

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::PaperError;
use crate::paper::openalex::PaperInfo;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaperQuery {
    pub doi: Option<String>,
}

pub async fn paper_info(
    State(state): State<AppState>,
    Query(query): Query<PaperQuery>,
) -> Result<Json<PaperInfo>, PaperError> {
    let doi = query
        .doi
        .filter(|d| !d.is_empty())
        .ok_or(PaperError::MissingDoi)?;

    state.openalex.lookup(&doi).await.map(Json)
}

/// Fallback for any method other than GET on the lookup route.
pub async fn method_not_allowed() -> PaperError {
    PaperError::MethodNotAllowed
}
