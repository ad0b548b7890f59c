//! REST client for the note store service.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::api::ApiResponse;
use crate::config::ClientConfig;
use crate::entity::{FieldErrors, Note, NoteDraft};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
    #[error("Serialization error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the server could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// How the server answered a request that did reach it.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success { data: T, message: Option<String> },
    NotFound { message: String },
    Invalid { message: String, errors: FieldErrors },
    Rejected { status: u16, message: String },
}

impl<T> ApiOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success { .. })
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ApiOutcome::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApiOutcome::Success { message, .. } => message.as_deref(),
            ApiOutcome::NotFound { message }
            | ApiOutcome::Invalid { message, .. }
            | ApiOutcome::Rejected { message, .. } => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Success { data, message } => ApiOutcome::Success {
                data: f(data),
                message,
            },
            ApiOutcome::NotFound { message } => ApiOutcome::NotFound { message },
            ApiOutcome::Invalid { message, errors } => ApiOutcome::Invalid { message, errors },
            ApiOutcome::Rejected { status, message } => ApiOutcome::Rejected { status, message },
        }
    }
}

#[derive(Clone)]
pub struct NotesClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotesClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn notes_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }

    fn note_url(&self, id: &Uuid) -> String {
        format!("{}/notes/{}", self.base_url, id)
    }

    pub async fn list(&self) -> Result<ApiOutcome<Vec<Note>>, ClientError> {
        let request = self.client.get(self.notes_url());
        self.send_for_data(request).await
    }

    pub async fn get(&self, id: &Uuid) -> Result<ApiOutcome<Note>, ClientError> {
        let request = self.client.get(self.note_url(id));
        self.send_for_data(request).await
    }

    pub async fn create(&self, draft: &NoteDraft) -> Result<ApiOutcome<Note>, ClientError> {
        let request = self.client.post(self.notes_url()).json(draft);
        self.send_for_data(request).await
    }

    pub async fn update(&self, id: &Uuid, draft: &NoteDraft) -> Result<ApiOutcome<Note>, ClientError> {
        let request = self.client.put(self.note_url(id)).json(draft);
        self.send_for_data(request).await
    }

    pub async fn delete(&self, id: &Uuid) -> Result<ApiOutcome<()>, ClientError> {
        let request = self.client.delete(self.note_url(id));
        let (status, envelope) = self.send::<Value>(request).await?;
        classify(status, envelope, |_| Some(()))
    }

    async fn send_for_data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiOutcome<T>, ClientError> {
        let (status, envelope) = self.send::<T>(request).await?;
        classify(status, envelope, |data| data)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(StatusCode, ApiResponse<T>), ClientError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope = serde_json::from_slice::<ApiResponse<T>>(&bytes).map_err(|_| {
            ClientError::UnexpectedResponse {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).chars().take(200).collect(),
            }
        })?;
        Ok((status, envelope))
    }
}

fn classify<D, T>(
    status: StatusCode,
    envelope: ApiResponse<D>,
    data: impl FnOnce(Option<D>) -> Option<T>,
) -> Result<ApiOutcome<T>, ClientError> {
    let message = envelope.message.unwrap_or_default();

    if envelope.success {
        return match data(envelope.data) {
            Some(data) => Ok(ApiOutcome::Success {
                data,
                message: (!message.is_empty()).then_some(message),
            }),
            None => Err(ClientError::UnexpectedResponse {
                status: status.as_u16(),
                body: "success response without data".to_string(),
            }),
        };
    }

    Ok(match status {
        StatusCode::NOT_FOUND => ApiOutcome::NotFound { message },
        StatusCode::UNPROCESSABLE_ENTITY => ApiOutcome::Invalid {
            message,
            errors: envelope.errors.unwrap_or_default(),
        },
        other => ApiOutcome::Rejected {
            status: other.as_u16(),
            message,
        },
    })
}
