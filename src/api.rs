//! HTTP client for the podcast backend.
//!
//! The backend plays two roles: it resolves playlist metadata
//! (`/api/playlist/`) and it creates episodes inside a podcast
//! (`/podcasts/{id}/episodes/`). Both are exposed through traits so the
//! fetcher and the batch creator can be driven by in-memory fakes in tests.

use crate::config::Config;
use crate::error::{CreationError, FetchError, FormError, ValidationError};
use crate::types::Playlist;
use async_trait::async_trait;
use log::debug;
use reqwest::header::COOKIE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const PLAYLIST_PATH: &str = "/api/playlist/";

/// Source of playlist metadata.
#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    /// Resolve a playlist URL into its entries. Sends exactly one request.
    async fn fetch_playlist(&self, playlist_url: &str) -> Result<Playlist, FetchError>;
}

/// Backend that turns a video URL into an episode of a podcast.
#[async_trait]
pub trait EpisodeBackend: Send + Sync {
    async fn create_episode(&self, podcast_id: u64, source_url: &str) -> Result<(), CreationError>;
}

/// Result of a successful form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The server asked the client to navigate to this URL.
    Redirect(String),
    /// The server accepted the form; `final_url` is where the HTTP client
    /// ended up after following redirects.
    Accepted { final_url: String },
}

/// Error body shape used by the backend for every failed API call.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RedirectBody {
    redirect_url: String,
}

/// reqwest-backed client for the podcast backend.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl ApiClient {
    /// Build a client from the user's configuration.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    /// Resolve a path against the server URL. Absolute URLs are kept as is.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(url);
        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie.as_str()),
            None => request,
        }
    }

    /// POST urlencoded fields to a form action and interpret the answer.
    pub async fn submit_form(
        &self,
        action: &str,
        fields: &[(&str, &str)],
    ) -> Result<FormOutcome, FormError> {
        let url = self.endpoint(action);
        debug!("Submitting form to {}", url);

        let resp = self
            .post(&url)
            .form(fields)
            .send()
            .await
            .map_err(|e| FormError::Network(e.to_string()))?;

        let status = resp.status();
        let final_url = resp.url().to_string();
        let body = resp
            .text()
            .await
            .map_err(|e| FormError::Network(e.to_string()))?;

        parse_form_response(status.as_u16(), &final_url, &body)
    }
}

/// Path of the episode collection of a podcast.
pub fn episodes_path(podcast_id: u64) -> String {
    format!("/podcasts/{}/episodes/", podcast_id)
}

#[async_trait]
impl PlaylistProvider for ApiClient {
    async fn fetch_playlist(&self, playlist_url: &str) -> Result<Playlist, FetchError> {
        let url = self.endpoint(PLAYLIST_PATH);
        debug!("Fetching playlist {} via {}", playlist_url, url);

        let resp = self
            .post(&url)
            .form(&[("playlist_url", playlist_url)])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        parse_playlist_response(status, &body)
    }
}

#[async_trait]
impl EpisodeBackend for ApiClient {
    async fn create_episode(&self, podcast_id: u64, source_url: &str) -> Result<(), CreationError> {
        let url = self.endpoint(&episodes_path(podcast_id));
        debug!("Creating episode from {} via {}", source_url, url);

        let resp = self
            .post(&url)
            .form(&[("youtube_link", source_url)])
            .send()
            .await
            .map_err(|e| CreationError::Network(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        // The body is diagnostic only; a failure to read it must not hide the status.
        let payload = resp.text().await.unwrap_or_default();
        Err(CreationError::Status {
            status: status.as_u16(),
            payload: describe_payload(&payload),
        })
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Interpret the provider's answer to a playlist request.
///
/// Any non-success status, and any success body that is not a playlist
/// object, is a [`FetchError`] carrying the raw body.
pub fn parse_playlist_response(status: u16, body: &str) -> Result<Playlist, FetchError> {
    if !is_success(status) {
        return Err(FetchError::Status {
            status,
            payload: body.to_string(),
        });
    }

    serde_json::from_str::<Playlist>(body).map_err(|e| {
        debug!("Playlist body rejected: {}", e);
        FetchError::Malformed {
            payload: body.to_string(),
        }
    })
}

/// Interpret the answer to a form submission.
pub fn parse_form_response(
    status: u16,
    final_url: &str,
    body: &str,
) -> Result<FormOutcome, FormError> {
    if is_success(status) {
        if let Ok(redirect) = serde_json::from_str::<RedirectBody>(body) {
            return Ok(FormOutcome::Redirect(redirect.redirect_url));
        }
        return Ok(FormOutcome::Accepted {
            final_url: final_url.to_string(),
        });
    }

    let Ok(error) = serde_json::from_str::<ErrorBody>(body) else {
        let text = body.trim();
        let message = if text.is_empty() {
            format!("request failed with status {}", status)
        } else {
            text.to_string()
        };
        return Err(ValidationError::Page(message).into());
    };

    let validation = match error.details {
        Some(serde_json::Value::Object(map)) => ValidationError::Fields(
            map.into_iter()
                .map(|(field, value)| (field, value_to_message(&value)))
                .collect::<BTreeMap<_, _>>(),
        ),
        Some(serde_json::Value::String(details)) => ValidationError::Page(details),
        _ => ValidationError::Page(
            error
                .message
                .unwrap_or_else(|| format!("request failed with status {}", status)),
        ),
    };

    Err(validation.into())
}

fn value_to_message(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(value_to_message)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Render a raw error body for humans.
///
/// Backend error bodies look like `{"message": ..., "details": ...}`; those
/// are flattened to `message: details`. Anything else is returned trimmed.
///
/// # Examples
///
/// ```
/// use playlist_import::api::describe_payload;
///
/// let body = r#"{"message": "Input data is invalid", "details": "It seems like incorrect playlist"}"#;
/// assert_eq!(describe_payload(body), "Input data is invalid: It seems like incorrect playlist");
/// assert_eq!(describe_payload("  Bad Gateway \n"), "Bad Gateway");
/// assert_eq!(describe_payload(""), "<empty body>");
/// ```
pub fn describe_payload(body: &str) -> String {
    if let Ok(error) = serde_json::from_str::<ErrorBody>(body) {
        let details = error.details.as_ref().map(value_to_message);
        match (error.message, details) {
            (Some(message), Some(details)) => return format!("{}: {}", message, details),
            (Some(message), None) => return message,
            (None, Some(details)) => return details,
            (None, None) => {}
        }
    }

    let text = body.trim();
    if text.is_empty() {
        "<empty body>".to_string()
    } else {
        text.to_string()
    }
}
