use std::{collections::HashMap, error::Error, sync::RwLock};

use async_trait::async_trait;

/// Error from the host while reading response or participant records
#[derive(thiserror::Error, Debug)]
#[error("Error reading survey records: {0}")]
pub struct LookupError(#[source] Box<dyn Error + Send + Sync>);

impl LookupError {
    pub fn new(error: impl Error + Send + Sync + 'static) -> Self {
        Self(Box::new(error))
    }
}

/// Read-only access to the host's survey responses and participants
#[async_trait]
pub trait SurveyRecords: Send + Sync {
    /// The participant token a response was submitted with. `None` if the response doesn't exist
    /// or was anonymous.
    async fn response_token(
        &self,
        survey_id: &str,
        response_id: &str,
    ) -> Result<Option<String>, LookupError>;

    /// The id of the participant that owns `token` in the survey
    async fn participant_id(
        &self,
        survey_id: &str,
        token: &str,
    ) -> Result<Option<String>, LookupError>;
}

/// The participant a response belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub token: String,
    pub participant_id: String,
}

/// Looks up the participant that submitted a response.
///
/// Returns `Ok(None)` if the response has no token or the token has no participant entry.
pub async fn resolve_participant(
    records: &dyn SurveyRecords,
    survey_id: &str,
    response_id: &str,
) -> Result<Option<Participant>, LookupError> {
    let Some(token) = records.response_token(survey_id, response_id).await? else {
        tracing::debug!("Response {response_id} of survey {survey_id} has no participant token");
        return Ok(None);
    };

    let Some(participant_id) = records.participant_id(survey_id, &token).await? else {
        tracing::debug!("No participant found for token of response {response_id}");
        return Ok(None);
    };

    Ok(Some(Participant {
        token,
        participant_id,
    }))
}

/// Keeps records in memory. Useful when embedding the plugin in a host that pushes its records
/// and for tests.
#[derive(Default)]
pub struct MemorySurveyRecords {
    // (survey id, response id) -> token
    tokens: RwLock<HashMap<(String, String), Option<String>>>,
    // (survey id, token) -> participant id
    participants: RwLock<HashMap<(String, String), String>>,
}

impl MemorySurveyRecords {
    pub fn insert_response(&self, survey_id: &str, response_id: &str, token: Option<&str>) {
        let mut tokens = self.tokens.write().unwrap_or_else(|error| error.into_inner());
        tokens.insert(
            (survey_id.to_owned(), response_id.to_owned()),
            token.map(str::to_owned),
        );
    }

    pub fn insert_participant(&self, survey_id: &str, token: &str, participant_id: &str) {
        let mut participants = self
            .participants
            .write()
            .unwrap_or_else(|error| error.into_inner());
        participants.insert(
            (survey_id.to_owned(), token.to_owned()),
            participant_id.to_owned(),
        );
    }
}

#[async_trait]
impl SurveyRecords for MemorySurveyRecords {
    async fn response_token(
        &self,
        survey_id: &str,
        response_id: &str,
    ) -> Result<Option<String>, LookupError> {
        let tokens = self.tokens.read().unwrap_or_else(|error| error.into_inner());
        Ok(tokens
            .get(&(survey_id.to_owned(), response_id.to_owned()))
            .cloned()
            .flatten())
    }

    async fn participant_id(
        &self,
        survey_id: &str,
        token: &str,
    ) -> Result<Option<String>, LookupError> {
        let participants = self
            .participants
            .read()
            .unwrap_or_else(|error| error.into_inner());
        Ok(participants
            .get(&(survey_id.to_owned(), token.to_owned()))
            .cloned())
    }
}
