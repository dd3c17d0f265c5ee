//! HTTP client for the notes endpoint.
//!
//! Wraps `GET/POST {base}` and `DELETE {base}/{id}` using [`reqwest`].
//! Every request carries the configured bearer token, if any. There are
//! no retries; callers decide what to do with a failure.

use async_trait::async_trait;
use notehub_core::{CreateNote, Note, NoteId, NotePage};

use crate::config::ClientConfig;

/// Page size used when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Errors from the notes API layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotesApiError {
    /// No response reached the client (connect, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The API returned a non-2xx status code.
    #[error("Notes API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body was not the expected JSON.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for NotesApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NotesApiError::Decode(err.to_string())
        } else {
            NotesApiError::Network(err.to_string())
        }
    }
}

/// Operations the controllers need from the remote notes service.
///
/// Implemented by [`NotesClient`] for the real API and by in-memory fakes
/// in tests.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Fetch one page of notes, filtered by `search` when it is not blank.
    async fn list(&self, search: &str, page: u32, per_page: u32)
        -> Result<NotePage, NotesApiError>;

    /// Create a note and return the server's representation of it.
    async fn create(&self, note: &CreateNote) -> Result<Note, NotesApiError>;

    /// Delete a note and return its last known representation.
    async fn delete(&self, id: &NoteId) -> Result<Note, NotesApiError>;
}

/// HTTP client for the notes endpoint.
pub struct NotesClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl NotesClient {
    /// Build a client from configuration, applying the request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, NotesApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.token.clone(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    ///
    /// * `api_url` - notes endpoint, e.g. `https://host/api/notes`.
    /// * `token`   - bearer credential; `None` sends no `Authorization`.
    pub fn with_client(client: reqwest::Client, api_url: String, token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Notes endpoint this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`NotesApiError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, NotesApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Notes API returned an error status");
            return Err(NotesApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, NotesApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Query parameters for a list request. `search` is included only when it
/// has non-whitespace content, and is then sent untrimmed.
pub(crate) fn list_params(search: &str, page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![("page", page.to_string()), ("perPage", per_page.to_string())];
    if !search.trim().is_empty() {
        params.push(("search", search.to_string()));
    }
    params
}

#[async_trait]
impl NotesApi for NotesClient {
    async fn list(
        &self,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<NotePage, NotesApiError> {
        tracing::debug!(page, per_page, search = %search, "GET notes");

        let response = self
            .authorize(self.client.get(&self.api_url))
            .query(&list_params(search, page, per_page))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn create(&self, note: &CreateNote) -> Result<Note, NotesApiError> {
        tracing::debug!(tag = %note.tag, "POST note");

        let response = self
            .authorize(self.client.post(&self.api_url))
            .json(note)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn delete(&self, id: &NoteId) -> Result<Note, NotesApiError> {
        tracing::debug!(note_id = %id, "DELETE note");

        let url = note_url(&self.api_url, id)?;
        let response = self.authorize(self.client.delete(url)).send().await?;

        Self::parse_response(response).await
    }
}

/// `{api_url}/{id}` with the id percent-encoded as a single path segment.
pub(crate) fn note_url(api_url: &str, id: &NoteId) -> Result<reqwest::Url, NotesApiError> {
    let mut url = reqwest::Url::parse(api_url)
        .map_err(|e| NotesApiError::Network(format!("Invalid API URL '{api_url}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| NotesApiError::Network(format!("API URL '{api_url}' cannot carry a path")))?
        .pop_if_empty()
        .push(id.as_str());
    Ok(url)
}
