//! Oracle transport implementations
//!
//! This module handles the wire side of the oracle, including:
//! - The `OracleTransport` trait used by the client and report generator
//! - An HTTP+JSON transport speaking a `generateContent` style API
//! - Decoding of error bodies into `OracleFault`s

use crate::oracle::fault::OracleFault;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Default oracle endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model used for link discovery and reports
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// A single request to the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OraclePrompt {
    /// Prompt text
    pub text: String,

    /// Whether the reply must be a JSON document
    pub expects_json: bool,
}

impl OraclePrompt {
    pub fn json(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expects_json: true,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expects_json: false,
        }
    }
}

/// Transport used to reach the oracle
///
/// One call is one attempt: implementations must not retry on their own, the
/// oracle client owns the retry and rotation policy.
pub trait OracleTransport: Send + Sync {
    /// Sends `prompt` authenticated with `credential` and returns the reply text
    fn generate(
        &self,
        credential: &str,
        prompt: &OraclePrompt,
    ) -> impl Future<Output = Result<String, OracleFault>> + Send;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

/// HTTP transport for a `generateContent` style oracle API
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpTransport {
    /// Builds a transport against `endpoint` using `model`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use link_cartographer::oracle::HttpTransport;
    /// use std::time::Duration;
    ///
    /// let transport = HttpTransport::new(
    ///     "https://generativelanguage.googleapis.com",
    ///     "gemini-2.0-flash",
    ///     Duration::from_secs(60),
    /// )
    /// .unwrap();
    /// ```
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("link-cartographer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

impl OracleTransport for HttpTransport {
    async fn generate(&self, credential: &str, prompt: &OraclePrompt) -> Result<String, OracleFault> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: &prompt.text }],
            }],
            generation_config: prompt.expects_json.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        tracing::trace!("POST {}", self.generate_url());

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_send_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleFault::network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(decode_error_body(status.as_u16(), &text));
        }

        match serde_json::from_str::<GenerateResponse>(&text) {
            Ok(parsed) => Ok(extract_text(parsed)),
            Err(e) => {
                // Treated as an empty reply; the caller decides what that means
                tracing::warn!("Unexpected oracle response envelope: {}", e);
                Ok(String::new())
            }
        }
    }
}

fn classify_send_error(e: &reqwest::Error) -> OracleFault {
    if e.is_timeout() {
        OracleFault::network("Request timeout")
    } else if e.is_connect() {
        OracleFault::network("Connection refused")
    } else {
        OracleFault::new(e.status().map(|s| s.as_u16()), None, e.to_string())
    }
}

/// Decodes a non-2xx reply into a fault, keeping the HTTP status as fallback
fn decode_error_body(http_status: u16, body: &str) -> OracleFault {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => OracleFault::new(
            Some(envelope.error.code.unwrap_or(http_status)),
            envelope.error.status,
            envelope.error.message,
        ),
        Err(_) => OracleFault::with_code(http_status, body.trim().to_string()),
    }
}

fn extract_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}
