use url::Url;

use crate::records::{resolve_participant, Participant, SurveyRecords};

pub const SURVEY_ID_PLACEHOLDER: &str = "{SURVEYID}";
pub const TOKEN_PLACEHOLDER: &str = "{TOKEN}";
pub const PARTICIPANT_ID_PLACEHOLDER: &str = "{TID}";

#[derive(thiserror::Error, Debug)]
pub enum InvalidTemplateError {
    #[error("Webhook URL is not an absolute URL: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Webhook URL has no host")]
    MissingHost,
}

/// A validated webhook URL template
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    // Substitution works on the text as the user entered it, not on the normalized URL
    raw: String,
    has_query: bool,
}

impl UrlTemplate {
    /// Checks that `template` is an absolute URL with a scheme and a host
    pub fn parse(template: &str) -> Result<Self, InvalidTemplateError> {
        let url = Url::parse(template)?;

        if !url.host_str().is_some_and(|host| !host.is_empty()) {
            return Err(InvalidTemplateError::MissingHost);
        }

        Ok(Self {
            raw: template.to_owned(),
            has_query: url.query().is_some_and(|query| !query.is_empty()),
        })
    }

    /// Placeholders are only replaced in templates with a query
    pub fn has_query(&self) -> bool {
        self.has_query
    }

    /// Replaces the placeholders. `{TOKEN}` and `{TID}` stay as they are without a participant.
    pub fn render(&self, survey_id: &str, participant: Option<&Participant>) -> String {
        if !self.has_query {
            return self.raw.clone();
        }

        let url = self.raw.replace(SURVEY_ID_PLACEHOLDER, survey_id);

        match participant {
            Some(participant) => url
                .replace(TOKEN_PLACEHOLDER, &participant.token)
                .replace(PARTICIPANT_ID_PLACEHOLDER, &participant.participant_id),
            None => url,
        }
    }
}

/// Builds the URL to call for a completed response.
///
/// The participant is only looked up if the template has a query and a response id is given.
/// A failed lookup is logged and leaves the participant placeholders in place.
pub async fn build_url(
    template: &str,
    survey_id: &str,
    response_id: Option<&str>,
    records: &dyn SurveyRecords,
) -> Result<String, InvalidTemplateError> {
    let template = UrlTemplate::parse(template)?;

    if !template.has_query() {
        return Ok(template.raw);
    }

    let participant = match response_id {
        Some(response_id) => resolve_participant(records, survey_id, response_id)
            .await
            .inspect_err(|error| {
                tracing::warn!("Error resolving participant for response {response_id}: {error}")
            })
            .ok()
            .flatten(),
        None => None,
    };

    Ok(template.render(survey_id, participant.as_ref()))
}
