//! `TextAnalyser` backed by an `analyzeEntities` HTTP endpoint.

use std::io;
use std::time::Duration;

use log::debug;
use newsdesk_core::{AnalysisError, Entity, TextAnalyser};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::api::{AnalyzeEntitiesRequest, AnalyzeEntitiesResponse};

/// Default service base URL.
pub const DEFAULT_ANALYSER_ENDPOINT: &str = "https://language.googleapis.com";

/// Default user agent for analysis requests.
pub const DEFAULT_USER_AGENT: &str = "newsdesk-analyser/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Failure to construct an [`HttpTextAnalyser`].
#[derive(Debug, Error)]
pub enum AnalyserBuildError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// The Tokio runtime could not be built.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] io::Error),
}

/// Configuration for [`HttpTextAnalyser`].
#[derive(Debug, Clone)]
pub struct HttpTextAnalyserConfig {
    /// Service base URL, without the `/v1/...` path.
    pub endpoint: String,
    /// API key sent in the `x-goog-api-key` header, when set.
    pub api_key: Option<String>,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpTextAnalyserConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ANALYSER_ENDPOINT.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpTextAnalyserConfig {
    /// Configuration for `endpoint` with default settings.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Entity extraction over HTTP.
///
/// Owns a current-thread Tokio runtime reused across calls. Inside an
/// existing multi-threaded runtime the caller's handle is used through
/// [`tokio::task::block_in_place`]; inside a current-thread runtime the
/// owned runtime is used instead.
///
/// # Examples
/// ```no_run
/// use newsdesk_core::analyse_query;
/// use newsdesk_data::{HttpTextAnalyser, HttpTextAnalyserConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let analyser = HttpTextAnalyser::with_config(
///     HttpTextAnalyserConfig::default().with_api_key("secret"),
/// )?;
/// let analysis = analyse_query(&analyser, "technology news from Reuters");
/// println!("{:?} {:?}", analysis.intent, analysis.entities);
/// # Ok(())
/// # }
/// ```
pub struct HttpTextAnalyser {
    client: Client,
    config: HttpTextAnalyserConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpTextAnalyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTextAnalyser")
            .field("endpoint", &self.config.endpoint)
            .field("timeout", &self.config.timeout)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpTextAnalyser {
    /// Analyser for `endpoint` with default settings.
    ///
    /// # Errors
    /// Returns [`AnalyserBuildError`] when the client or runtime cannot be
    /// built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AnalyserBuildError> {
        Self::with_config(HttpTextAnalyserConfig::new(endpoint))
    }

    /// Analyser with explicit configuration.
    ///
    /// # Errors
    /// Returns [`AnalyserBuildError`] when the client or runtime cannot be
    /// built.
    pub fn with_config(config: HttpTextAnalyserConfig) -> Result<Self, AnalyserBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(AnalyserBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(AnalyserBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &HttpTextAnalyserConfig {
        &self.config
    }

    fn entities_url(&self) -> String {
        format!(
            "{}/v1/documents:analyzeEntities",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    async fn fetch_entities(&self, text: &str) -> Result<Vec<Entity>, AnalysisError> {
        let url = self.entities_url();
        let mut request = self
            .client
            .post(&url)
            .json(&AnalyzeEntitiesRequest::plain_text(text));
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AnalysisError::Request {
                source: Box::new(err),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status {
                status: status.as_u16(),
            });
        }
        let body: AnalyzeEntitiesResponse =
            response
                .json()
                .await
                .map_err(|err| AnalysisError::Malformed {
                    source: Box::new(err),
                })?;
        debug!("{url} returned {} entities", body.entities.len());
        Ok(body.into())
    }
}

impl TextAnalyser for HttpTextAnalyser {
    fn extract_entities(&self, text: &str) -> Result<Vec<Entity>, AnalysisError> {
        let future = self.fetch_entities(text);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
