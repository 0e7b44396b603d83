use std::{collections::HashMap, error::Error, sync::RwLock};

use async_trait::async_trait;

/// Name of the setting that holds the webhook URL template
pub const WEBHOOK_URL_SETTING: &str = "webhookurl";

#[derive(thiserror::Error, Debug)]
#[error("Error accessing plugin settings: {0}")]
pub struct StoreError(#[source] Box<dyn Error + Send + Sync>);

impl StoreError {
    pub fn new(error: impl Error + Send + Sync + 'static) -> Self {
        Self(Box::new(error))
    }
}

/// Plugin settings kept by the host, per survey and globally
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn survey_setting(&self, survey_id: &str, name: &str)
        -> Result<Option<String>, StoreError>;

    async fn global_setting(&self, name: &str) -> Result<Option<String>, StoreError>;

    async fn set_survey_setting(
        &self,
        survey_id: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    async fn set_global_setting(&self, name: &str, value: &str) -> Result<(), StoreError>;
}

/// The survey's own value of a setting or the global default if the survey has none.
///
/// Empty values count as unset.
pub async fn setting_or_default(
    store: &dyn ConfigStore,
    survey_id: &str,
    name: &str,
) -> Result<Option<String>, StoreError> {
    if let Some(value) = store.survey_setting(survey_id, name).await? {
        if !value.is_empty() {
            return Ok(Some(value));
        }
    }

    Ok(store
        .global_setting(name)
        .await?
        .filter(|value| !value.is_empty()))
}

#[derive(Default)]
pub struct MemoryConfigStore {
    survey_settings: RwLock<HashMap<(String, String), String>>,
    global_settings: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn survey_setting(
        &self,
        survey_id: &str,
        name: &str,
    ) -> Result<Option<String>, StoreError> {
        let settings = self
            .survey_settings
            .read()
            .unwrap_or_else(|error| error.into_inner());
        Ok(settings
            .get(&(survey_id.to_owned(), name.to_owned()))
            .cloned())
    }

    async fn global_setting(&self, name: &str) -> Result<Option<String>, StoreError> {
        let settings = self
            .global_settings
            .read()
            .unwrap_or_else(|error| error.into_inner());
        Ok(settings.get(name).cloned())
    }

    async fn set_survey_setting(
        &self,
        survey_id: &str,
        name: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut settings = self
            .survey_settings
            .write()
            .unwrap_or_else(|error| error.into_inner());
        settings.insert((survey_id.to_owned(), name.to_owned()), value.to_owned());
        Ok(())
    }

    async fn set_global_setting(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut settings = self
            .global_settings
            .write()
            .unwrap_or_else(|error| error.into_inner());
        settings.insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}
