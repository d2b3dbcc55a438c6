//! Sentence provider: the backend that serves sentences and accepts approved text.
//!
//! The review session never talks to the network itself. Front ends hold an
//! `Arc<dyn SentenceProvider>` and run its calls as background tasks.
//!
//! # Endpoints
//!
//! - `GET  {base}/next-sentence/{reviewer_id}`: next sentence without a final version
//! - `PATCH {base}/sentence/{id}` with `{"final_sentence": ...}`: store the approved text
//! - `GET  {base}/sentences`: every sentence, used for progress reporting

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{Acknowledgement, RecordId, SentenceRecord};

/// Default provider address, matching the sentence service's development port.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Backend contract consumed by the review front end.
#[async_trait]
pub trait SentenceProvider: Send + Sync {
    /// Fetches the next sentence awaiting review.
    ///
    /// Fails with [`Error::FetchFailed`] when none is available.
    async fn fetch_next(&self, reviewer_id: u32) -> Result<SentenceRecord>;

    /// Stores `final_sentence` as the approved text of sentence `id`.
    ///
    /// Fails with [`Error::SubmitFailed`] when the id is unknown or the update
    /// is rejected.
    async fn submit_final(&self, id: &RecordId, final_sentence: &str) -> Result<Acknowledgement>;

    /// Lists every sentence the provider holds.
    async fn list_sentences(&self) -> Result<Vec<SentenceRecord>>;
}

/// Connection settings for [`HttpSentenceProvider`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: 30,
            user_agent: concat!("redline/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Sentence provider backed by the sentence service's JSON API.
pub struct HttpSentenceProvider {
    base_url: String,
    base: Url,
    client: reqwest::Client,
}

/// Request body for the partial update endpoint.
#[derive(Serialize)]
struct FinalSentenceUpdate<'a> {
    final_sentence: &'a str,
}

/// Error body the service returns alongside non-success statuses.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpSentenceProvider {
    /// Builds a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the base URL is empty, is not an
    /// absolute http(s) URL, or the HTTP client cannot be constructed.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(Error::InvalidConfig("provider base URL is empty".to_owned()));
        }
        let base = Url::parse(&base_url)
            .map_err(|e| Error::InvalidConfig(format!("invalid provider base URL {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!(
                "provider base URL {} cannot carry a path",
                base_url
            )));
        }
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent);
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { base_url, base, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base path, percent-encoding each one, so an
    /// id containing `/`, `?` or `#` stays a single path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Reads the `{"error": ...}` message from a failed response, falling back to
/// the raw body, then to the status line.
async fn failure_reason(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => format!("{} ({})", parsed.error, status),
        Err(_) if !body.trim().is_empty() => format!("{}: {}", status, body.trim()),
        Err(_) => status.to_string(),
    }
}

#[async_trait]
impl SentenceProvider for HttpSentenceProvider {
    async fn fetch_next(&self, reviewer_id: u32) -> Result<SentenceRecord> {
        let url = self.url(&["next-sentence", &reviewer_id.to_string()]);
        debug!(%url, "fetching next sentence");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::FetchFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::FetchFailed(failure_reason(response).await));
        }

        let record: SentenceRecord = response
            .json()
            .await
            .map_err(|e| Error::FetchFailed(format!("invalid sentence payload: {}", e)))?;
        info!(id = %record.id, note_id = %record.note_id, "fetched sentence");
        Ok(record)
    }

    async fn submit_final(&self, id: &RecordId, final_sentence: &str) -> Result<Acknowledgement> {
        let url = self.url(&["sentence", &id.to_string()]);
        debug!(%url, "submitting final sentence");

        let response = self
            .client
            .patch(url)
            .json(&FinalSentenceUpdate { final_sentence })
            .send()
            .await
            .map_err(|e| Error::SubmitFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::SubmitFailed(failure_reason(response).await));
        }

        // The acknowledgement body is informational; an unparseable one is not a failure.
        let body = response.text().await.unwrap_or_default();
        let ack = serde_json::from_str::<Acknowledgement>(&body).unwrap_or_default();
        info!(%id, "final sentence accepted");
        Ok(ack)
    }

    async fn list_sentences(&self) -> Result<Vec<SentenceRecord>> {
        let url = self.url(&["sentences"]);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::FetchFailed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::FetchFailed(failure_reason(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| Error::FetchFailed(format!("invalid sentence listing: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_dropped_from_base_url() {
        let provider = HttpSentenceProvider::new(ProviderConfig {
            base_url: "http://review.local:8000//".to_owned(),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert_eq!(provider.base_url(), "http://review.local:8000");
        assert_eq!(provider.url(&["sentences"]).as_str(), "http://review.local:8000/sentences");
    }

    #[test]
    fn base_path_is_kept_and_segments_are_encoded() {
        let provider = HttpSentenceProvider::new(ProviderConfig {
            base_url: "http://review.local/api/".to_owned(),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert_eq!(
            provider.url(&["sentence", "a/b?c#d"]).as_str(),
            "http://review.local/api/sentence/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let result = HttpSentenceProvider::new(ProviderConfig {
            base_url: "localhost:8000".to_owned(),
            ..ProviderConfig::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let result = HttpSentenceProvider::new(ProviderConfig {
            base_url: "  ".to_owned(),
            ..ProviderConfig::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn update_body_has_only_final_sentence() {
        let body = serde_json::to_value(FinalSentenceUpdate { final_sentence: "A dog ran" }).unwrap();
        assert_eq!(body, serde_json::json!({ "final_sentence": "A dog ran" }));
    }
}
