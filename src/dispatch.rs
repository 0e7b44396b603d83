use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};

#[derive(thiserror::Error, Debug)]
#[error("Error building HTTP client: {0}")]
pub struct BuildClientError(#[from] reqwest::Error);

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("Failed to send webhook request: {0}")]
    RequestError(#[source] reqwest::Error),
}

/// Sends the webhook request and reports the status the receiver answered with
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, url: &str) -> Result<StatusCode, DispatchError>;
}

/// Only an exact `200 OK` counts as a delivered webhook
pub fn is_delivered(status: StatusCode) -> bool {
    status == StatusCode::OK
}

/// Calls webhooks with a plain GET request
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    /// Without a timeout the request waits as long as the receiver takes to answer
    pub fn new(timeout: Option<Duration>) -> Result<Self, BuildClientError> {
        let mut builder = Client::builder()
            // A redirect is reported as its own status instead of being followed
            .redirect(redirect::Policy::none());

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Dispatch for HttpDispatcher {
    async fn dispatch(&self, url: &str) -> Result<StatusCode, DispatchError> {
        tracing::debug!("Calling webhook {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DispatchError::RequestError)?;

        let status = response.status();

        // Read the body so the connection can be reused, the content itself is not used
        if let Err(error) = response.bytes().await {
            tracing::debug!("Error reading webhook response body from {url}: {error}");
        }

        Ok(status)
    }
}
