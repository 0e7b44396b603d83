use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};

use super::AppState;
use crate::{
    settings::{save_survey_settings, survey_settings, SurveySettings},
    store::StoreError,
};

#[derive(thiserror::Error, Debug)]
#[error("Error accessing survey settings: {0}")]
pub struct SettingsError(#[from] StoreError);

impl IntoResponse for SettingsError {
    fn into_response(self) -> Response {
        tracing::error!("Error handling settings request: {}", self);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// The plugin's settings fields for the survey settings page
pub async fn get_settings(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> Result<Json<SurveySettings>, SettingsError> {
    let settings = survey_settings(&*state.settings, &survey_id).await?;
    Ok(Json(settings))
}

pub async fn save_settings(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
    Form(submitted): Form<HashMap<String, String>>,
) -> Result<StatusCode, SettingsError> {
    save_survey_settings(&*state.settings, &survey_id, &submitted).await?;
    Ok(StatusCode::NO_CONTENT)
}
