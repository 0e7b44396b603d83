use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Form};
use serde::Deserialize;

use super::AppState;
use crate::plugin::SurveyCompleted;

#[derive(Deserialize, Debug)]
pub struct SurveyCompleteRequest {
    survey_id: String,
    response_id: Option<String>,
}

/// Hands the completion to the plugins and waits for them to finish.
///
/// Always succeeds, a failing webhook must not fail the survey completion.
pub async fn survey_complete(
    State(state): State<AppState>,
    Form(request): Form<SurveyCompleteRequest>,
) -> StatusCode {
    tracing::debug!("Survey complete event: {:?}", request);

    let event = SurveyCompleted {
        survey_id: Arc::from(request.survey_id),
        response_id: request
            .response_id
            .filter(|response_id| !response_id.is_empty())
            .map(Arc::from),
    };

    state.registry.publish(&event).await;

    StatusCode::NO_CONTENT
}
