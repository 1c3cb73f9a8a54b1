//! Ask handler - the citation agent endpoint
//!
//! Validation happens entirely here, before the engine is invoked: the
//! question length is bounded, unknown tradition/domain values are dropped
//! silently, and maxSources is clamped into its fixed range.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use masdar_common::{
    engine::{AgentResponse, AskRequest, Domain, Lang, Tradition},
    errors::{AppError, Result},
};

/// Question length bounds (trimmed, in characters)
const MIN_QUESTION_CHARS: usize = 5;
const MAX_QUESTION_CHARS: usize = 500;

/// Source count bounds
const MIN_SOURCES: usize = 3;
const MAX_SOURCES: usize = 10;
const DEFAULT_SOURCES: usize = 6;

/// Ask request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AskBody {
    /// Coarse guard; the precise trimmed bounds are checked below
    #[validate(length(max = 2000))]
    pub question: String,

    pub tradition: Option<String>,

    pub domain: Option<String>,

    pub language: Option<String>,

    pub max_sources: Option<usize>,
}

/// Answer a question with grounded citations
pub async fn ask(
    State(state): State<AppState>,
    Json(body): Json<AskBody>,
) -> Result<Json<AgentResponse>> {
    body.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("question".to_string()),
    })?;

    let question = validate_question(&body.question)?;

    let request = AskRequest {
        question: question.to_string(),
        tradition: body.tradition.as_deref().and_then(Tradition::parse),
        domain: body.domain.as_deref().and_then(Domain::parse),
        language: body.language.as_deref().and_then(Lang::parse),
        max_sources: clamp_max_sources(body.max_sources),
    };

    let response = state.agent.ask(request).await;

    tracing::info!(
        no_results = response.no_results_found,
        citations = response.citations_count,
        latency_ms = response.processing_time_ms,
        "Ask request completed"
    );

    Ok(Json(response))
}

/// Check the trimmed question length against the fixed bounds
fn validate_question(raw: &str) -> Result<&str> {
    let question = raw.trim();
    let chars = question.chars().count();

    if chars < MIN_QUESTION_CHARS {
        return Err(AppError::Validation {
            message: format!("Question trop courte (minimum {} caractères)", MIN_QUESTION_CHARS),
            field: Some("question".to_string()),
        });
    }

    if chars > MAX_QUESTION_CHARS {
        return Err(AppError::Validation {
            message: format!("Question trop longue (maximum {} caractères)", MAX_QUESTION_CHARS),
            field: Some("question".to_string()),
        });
    }

    Ok(question)
}

/// Clamp the requested source count into [MIN_SOURCES, MAX_SOURCES]
fn clamp_max_sources(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_SOURCES)
        .clamp(MIN_SOURCES, MAX_SOURCES)
}
