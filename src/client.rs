use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client as ReqwestClient;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::client_logger::CompletionLogger;
use crate::error::{Error, FailureReason, Result};
use crate::observability::{
    CLIENT_COMPLETIONS, CLIENT_CONFIGURATION_FAILURES, CLIENT_MALFORMED_RESPONSES,
    CLIENT_REQUEST_DURATION, CLIENT_REQUESTS, CLIENT_SERVICE_FAILURES, CLIENT_UNKNOWN_FAILURES,
};
use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The model every request is sent to unless the client is built with another.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variables consulted, in order, when no API key is supplied.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

const CONFIGURATION_MARKERS: &[&str] = &["API_KEY_INVALID", "API_KEY_MISSING"];

/// Turns one prompt into one completion.
///
/// Implementations issue exactly one request per call, never retry, and
/// report every failure as a [`FailureReason`] value.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// The model prompts are sent to.
    fn model(&self) -> &str;

    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, FailureReason>;
}

/// Client for the Gemini `generateContent` API.
///
/// Requests carry only the prompt they are given and always disable extended
/// deliberation.
#[derive(Clone)]
pub struct Gemini {
    api_key: Option<String>,
    client: ReqwestClient,
    base_url: String,
    model: String,
    logger: Option<Arc<dyn CompletionLogger>>,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the `GEMINI_API_KEY`
    /// or `API_KEY` environment variables.  A missing key is not an error
    /// here: every completion will fail with [`FailureReason::Configuration`].
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with a custom endpoint or model.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key);
        if api_key.is_none() {
            tracing::warn!(
                "no API key provided and none of {:?} is set; completions will fail",
                API_KEY_ENV_VARS
            );
        }

        let base_url = match base_url {
            Some(url) => normalize_base_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            model,
            logger: None,
        })
    }

    /// Attach a logger that observes every request and outcome.
    pub fn with_logger(mut self, logger: Arc<dyn CompletionLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn headers(&self, api_key: &str) -> std::result::Result<HeaderMap, FailureReason> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(api_key).map_err(|_| FailureReason::Configuration)?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    async fn request(&self, prompt: &str) -> std::result::Result<String, FailureReason> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(FailureReason::Configuration);
        };
        let headers = self.headers(api_key)?;

        let request = GenerateContentRequest::single_turn(prompt);
        if let Some(logger) = &self.logger {
            logger.log_request(&self.model, &request);
        }

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&request)
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
                tracing::debug!(error = %e, "completion request failed in transport");
                return Err(FailureReason::service(e.to_string()));
            }
        };

        let status = response.status();
        let body = response.text().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let body = body.map_err(|e| FailureReason::service(e.to_string()))?;

        if status.is_success() {
            parse_completion(&body)
        } else {
            tracing::debug!(status = status.as_u16(), "completion request rejected");
            Err(classify_error_response(&body))
        }
    }
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl CompletionClient for Gemini {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> std::result::Result<String, FailureReason> {
        let outcome = self.request(prompt).await;
        match &outcome {
            Ok(text) => {
                CLIENT_COMPLETIONS.click();
                if let Some(logger) = &self.logger {
                    logger.log_completion(&self.model, text);
                }
            }
            Err(reason) => {
                match reason {
                    FailureReason::Configuration => CLIENT_CONFIGURATION_FAILURES.click(),
                    FailureReason::Service { .. } => CLIENT_SERVICE_FAILURES.click(),
                    FailureReason::Unknown => CLIENT_UNKNOWN_FAILURES.click(),
                    FailureReason::MalformedResponse => CLIENT_MALFORMED_RESPONSES.click(),
                }
                tracing::warn!(kind = reason.kind(), model = %self.model, "completion failed: {reason:?}");
                if let Some(logger) = &self.logger {
                    logger.log_failure(&self.model, reason);
                }
            }
        }
        outcome
    }
}

fn resolve_api_key(explicit: Option<String>) -> Option<String> {
    explicit
        .into_iter()
        .chain(API_KEY_ENV_VARS.iter().filter_map(|var| env::var(var).ok()))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

fn normalize_base_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url.trim())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.as_str().trim_end_matches('/').to_string()),
        scheme => Err(Error::validation(
            format!("unsupported URL scheme: {scheme}"),
            Some("base_url".to_string()),
        )),
    }
}

/// Extract the completion text from a successful response body.
///
/// A body that is not a `generateContent` response, or that carries no text,
/// is a [`FailureReason::MalformedResponse`].  The text is returned verbatim.
pub fn parse_completion(body: &str) -> std::result::Result<String, FailureReason> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        tracing::debug!(error = %e, "completion response is not valid JSON");
        FailureReason::MalformedResponse
    })?;
    response.text().ok_or(FailureReason::MalformedResponse)
}

/// Classify the body of a non-success response.
pub fn classify_error_response(body: &str) -> FailureReason {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).ok();

    let mentions_configuration = |text: &str| {
        CONFIGURATION_MARKERS
            .iter()
            .any(|marker| text.contains(marker))
    };
    if mentions_configuration(body)
        || parsed
            .as_ref()
            .is_some_and(|p| p.reasons().any(mentions_configuration))
    {
        return FailureReason::Configuration;
    }

    let message = parsed
        .and_then(|p| p.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    FailureReason::service(message)
}
