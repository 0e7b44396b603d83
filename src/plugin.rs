use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    dispatch::{is_delivered, Dispatch},
    records::SurveyRecords,
    store::{setting_or_default, ConfigStore, WEBHOOK_URL_SETTING},
    template::build_url,
};

/// A survey response was submitted
#[derive(Debug, Clone)]
pub struct SurveyCompleted {
    pub survey_id: Arc<str>,
    pub response_id: Option<Arc<str>>,
}

/// Something the host calls when a survey response is completed.
///
/// Implementations must not fail the completion, errors are handled inside.
#[async_trait]
pub trait CompletionHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    async fn on_complete(&self, event: &SurveyCompleted);
}

/// What happened when handling a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The event had no response id, nothing to report
    MissingResponse,
    /// No webhook URL is set for the survey and there is no default
    NotConfigured,
    /// The webhook URL could not be read from the settings
    SettingsUnavailable,
    /// The webhook URL is not an absolute URL with a host
    InvalidTemplate,
    /// The webhook answered with `200 OK`
    Delivered,
    /// The webhook answered with anything other than `200 OK`
    Rejected(StatusCode),
    /// The webhook could not be reached
    Unreachable,
}

/// Calls the survey's webhook URL when a response is completed
pub struct WebHook {
    settings: Arc<dyn ConfigStore>,
    records: Arc<dyn SurveyRecords>,
    dispatcher: Arc<dyn Dispatch>,
}

impl WebHook {
    pub const NAME: &'static str = "WebHook";
    pub const DESCRIPTION: &'static str = "Call a URL on completion of a survey";

    pub fn new(
        settings: Arc<dyn ConfigStore>,
        records: Arc<dyn SurveyRecords>,
        dispatcher: Arc<dyn Dispatch>,
    ) -> Self {
        Self {
            settings,
            records,
            dispatcher,
        }
    }

    /// Builds the survey's webhook URL and calls it once
    pub async fn handle(&self, event: &SurveyCompleted) -> Outcome {
        let survey_id = &*event.survey_id;
        let Some(response_id) = event.response_id.as_deref() else {
            return Outcome::MissingResponse;
        };

        let template =
            match setting_or_default(&*self.settings, survey_id, WEBHOOK_URL_SETTING).await {
                Ok(Some(template)) => template,
                Ok(None) => return Outcome::NotConfigured,
                Err(error) => {
                    tracing::error!("Error reading webhook URL of survey {survey_id}: {error}");
                    return Outcome::SettingsUnavailable;
                }
            };

        let url = match build_url(&template, survey_id, Some(response_id), &*self.records).await {
            Ok(url) => url,
            Err(error) => {
                tracing::warn!("Invalid webhook URL for survey {survey_id}: {error}");
                return Outcome::InvalidTemplate;
            }
        };

        match self.dispatcher.dispatch(&url).await {
            Ok(status) if is_delivered(status) => {
                tracing::debug!("Webhook for response {response_id} of survey {survey_id} delivered");
                Outcome::Delivered
            }
            Ok(status) => {
                tracing::warn!("Webhook for survey {survey_id} answered with status {status}");
                Outcome::Rejected(status)
            }
            Err(error) => {
                tracing::warn!("Webhook for survey {survey_id} failed: {error}");
                Outcome::Unreachable
            }
        }
    }
}

#[async_trait]
impl CompletionHook for WebHook {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    async fn on_complete(&self, event: &SurveyCompleted) {
        self.handle(event).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        dispatch::DispatchError, records::MemorySurveyRecords, store::MemoryConfigStore,
    };

    /// Records the URLs it was asked to call and answers with a fixed status
    struct RecordingDispatcher {
        status: StatusCode,
        urls: Mutex<Vec<String>>,
    }

    impl RecordingDispatcher {
        fn new(status: StatusCode) -> Arc<Self> {
            Arc::new(Self {
                status,
                urls: Mutex::default(),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Dispatch for RecordingDispatcher {
        async fn dispatch(&self, url: &str) -> Result<StatusCode, DispatchError> {
            self.urls.lock().unwrap().push(url.to_owned());
            Ok(self.status)
        }
    }

    async fn plugin_with(
        template: Option<&str>,
        dispatcher: Arc<RecordingDispatcher>,
    ) -> WebHook {
        let settings = MemoryConfigStore::default();
        if let Some(template) = template {
            settings
                .set_survey_setting("42", WEBHOOK_URL_SETTING, template)
                .await
                .unwrap();
        }

        let records = MemorySurveyRecords::default();
        records.insert_response("42", "1", Some("abc123"));
        records.insert_participant("42", "abc123", "7");

        WebHook::new(Arc::new(settings), Arc::new(records), dispatcher)
    }

    fn completed(response_id: Option<&str>) -> SurveyCompleted {
        SurveyCompleted {
            survey_id: "42".into(),
            response_id: response_id.map(Arc::from),
        }
    }

    #[tokio::test]
    async fn calls_webhook_with_substituted_url() {
        let dispatcher = RecordingDispatcher::new(StatusCode::OK);
        let plugin = plugin_with(
            Some("https://example.com/hook?sid={SURVEYID}&token={TOKEN}&tid={TID}"),
            dispatcher.clone(),
        )
        .await;

        let outcome = plugin.handle(&completed(Some("1"))).await;

        assert_eq!(outcome, Outcome::Delivered);
        assert_eq!(
            dispatcher.urls(),
            ["https://example.com/hook?sid=42&token=abc123&tid=7"]
        );
    }

    #[tokio::test]
    async fn missing_response_id_skips_dispatch() {
        let dispatcher = RecordingDispatcher::new(StatusCode::OK);
        let plugin = plugin_with(Some("https://example.com/hook"), dispatcher.clone()).await;

        let outcome = plugin.handle(&completed(None)).await;

        assert_eq!(outcome, Outcome::MissingResponse);
        assert!(dispatcher.urls().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_survey_skips_dispatch() {
        let dispatcher = RecordingDispatcher::new(StatusCode::OK);
        let plugin = plugin_with(None, dispatcher.clone()).await;

        let outcome = plugin.handle(&completed(Some("1"))).await;

        assert_eq!(outcome, Outcome::NotConfigured);
        assert!(dispatcher.urls().is_empty());
    }

    #[tokio::test]
    async fn invalid_template_skips_dispatch() {
        let dispatcher = RecordingDispatcher::new(StatusCode::OK);
        let plugin = plugin_with(Some("example.com/hook"), dispatcher.clone()).await;

        let outcome = plugin.handle(&completed(Some("1"))).await;

        assert_eq!(outcome, Outcome::InvalidTemplate);
        assert!(dispatcher.urls().is_empty());
    }

    #[tokio::test]
    async fn non_ok_status_is_rejected() {
        let dispatcher = RecordingDispatcher::new(StatusCode::NO_CONTENT);
        let plugin = plugin_with(Some("https://example.com/hook"), dispatcher.clone()).await;

        let outcome = plugin.handle(&completed(Some("1"))).await;

        assert_eq!(outcome, Outcome::Rejected(StatusCode::NO_CONTENT));
        assert_eq!(dispatcher.urls().len(), 1);
    }

    #[tokio::test]
    async fn calls_once_per_event() {
        let dispatcher = RecordingDispatcher::new(StatusCode::OK);
        let plugin = plugin_with(Some("https://example.com/hook"), dispatcher.clone()).await;

        plugin.on_complete(&completed(Some("1"))).await;
        plugin.on_complete(&completed(Some("1"))).await;

        assert_eq!(dispatcher.urls().len(), 2);
    }
}
