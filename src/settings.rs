//! The settings the plugin registers with the host's survey settings page.
//!
//! The host renders the fields, the plugin only describes them and stores what is submitted.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    plugin::WebHook,
    store::{setting_or_default, ConfigStore, StoreError, WEBHOOK_URL_SETTING},
};

const WEBHOOK_URL_INFO: &str = "<p>Set the webhook URL to be called on completion of the survey.</p>\
<p>You must set a url scheme (http or https).</p>\
<p>You can use any of the following tags in the URL as parameter values:<ul>\
<li><strong>{TID}</strong> Participant ID</li>\
<li><strong>{TOKEN}</strong> Participant Token</li>\
<li><strong>{SURVEYID}</strong> Survey ID</li>\
</ul></p>";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SettingField {
    /// Static help text
    Info { content: &'static str },
    String {
        label: &'static str,
        help: &'static str,
        current: Option<String>,
    },
}

#[derive(Serialize, Debug)]
pub struct Setting {
    pub name: &'static str,
    #[serde(flatten)]
    pub field: SettingField,
}

/// The settings block for one survey
#[derive(Serialize, Debug)]
pub struct SurveySettings {
    pub name: &'static str,
    pub settings: Vec<Setting>,
}

/// Describes the plugin settings with the values currently in effect for the survey
pub async fn survey_settings(
    store: &dyn ConfigStore,
    survey_id: &str,
) -> Result<SurveySettings, StoreError> {
    let current = setting_or_default(store, survey_id, WEBHOOK_URL_SETTING).await?;

    Ok(SurveySettings {
        name: WebHook::NAME,
        settings: vec![
            Setting {
                name: "webhookurlinfo",
                field: SettingField::Info {
                    content: WEBHOOK_URL_INFO,
                },
            },
            Setting {
                name: WEBHOOK_URL_SETTING,
                field: SettingField::String {
                    label: "Webhook URL",
                    help: "",
                    current,
                },
            },
        ],
    })
}

/// Stores the submitted settings for the survey
pub async fn save_survey_settings(
    store: &dyn ConfigStore,
    survey_id: &str,
    submitted: &HashMap<String, String>,
) -> Result<(), StoreError> {
    for (name, value) in submitted {
        store.set_survey_setting(survey_id, name, value).await?;
        tracing::debug!("Saved setting {name} for survey {survey_id}");
    }

    Ok(())
}
