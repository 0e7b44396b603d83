use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{registry::PluginRegistry, store::ConfigStore};

pub mod events;
pub mod settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<dyn ConfigStore>,
    pub registry: Arc<PluginRegistry>,
}

/// Endpoints the survey platform calls to deliver events and manage the plugin settings
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/events/survey-complete", post(events::survey_complete))
        .route(
            "/surveys/:survey_id/settings",
            get(settings::get_settings).post(settings::save_settings),
        )
        .with_state(state)
}
