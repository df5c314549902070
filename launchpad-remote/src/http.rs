//! Shared blocking HTTP plumbing: authorized agent, error decoding, retries.

use std::io::Read;
use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ureq::{Agent, AgentBuilder, Request, Response};

use launchpad_core::error::remote_io_err;
use launchpad_core::{RemoteError, UploadSource};

/// Connect, read and write timeout for every request.
pub const TIMEOUT: Duration = Duration::from_secs(100);

/// Total attempts for a file upload.
pub const UPLOAD_ATTEMPTS: u32 = 3;

const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Error reason the console reports for an already-used version code.
pub const VERSION_CONFLICT_REASON: &str = "apkUpgradeVersionConflict";

/// A ureq agent that sends a bearer token with every request.
#[derive(Clone)]
pub struct HttpClient {
    agent: Agent,
    token: String,
}

impl HttpClient {
    pub fn new(token: impl Into<String>) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(TIMEOUT)
            .timeout_read(TIMEOUT)
            .timeout_write(TIMEOUT)
            .user_agent(concat!("launchpad/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            token: token.into(),
        }
    }

    /// An authorized request expecting a JSON response.
    pub fn request(&self, method: &str, url: &str) -> Request {
        tracing::debug!(method, url, "request");
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/json")
    }

    /// Plain GET without credentials, for public asset URLs.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        tracing::debug!(url, "download");
        let response = self.agent.get(url).call().map_err(classify)?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(bytes)
    }

    /// Stream `source` as the request body, retrying transient failures.
    ///
    /// Every attempt reopens the file and recomputes its length.
    pub fn upload<T: DeserializeOwned>(
        &self,
        url: &str,
        source: &UploadSource,
    ) -> Result<T, RemoteError> {
        with_retries(UPLOAD_ATTEMPTS, BACKOFF_BASE, |attempt| {
            let length = source
                .content_length()
                .map_err(|e| remote_io_err(&source.path, e))?;
            let file = source.open().map_err(|e| remote_io_err(&source.path, e))?;
            tracing::debug!(attempt, bytes = length, file = %source.path.display(), "uploading");
            let response = self
                .request("POST", url)
                .query("uploadType", "media")
                .set("Content-Type", source.mime)
                .set("Content-Length", &length.to_string())
                .send(file)
                .map_err(classify)?;
            read_json(response)
        })
    }
}

/// Send a bodiless request and decode its JSON response.
pub fn call_json<T: DeserializeOwned>(request: Request) -> Result<T, RemoteError> {
    let response = request.call().map_err(classify)?;
    read_json(response)
}

/// Send `body` as JSON and decode the JSON response.
pub fn send_json<T: DeserializeOwned, B: Serialize>(
    request: Request,
    body: &B,
) -> Result<T, RemoteError> {
    let response = request.send_json(body).map_err(classify)?;
    read_json(response)
}

/// Send a bodiless request whose response body is ignored.
pub fn call_empty(request: Request) -> Result<(), RemoteError> {
    request.call().map_err(classify)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    response
        .into_json::<T>()
        .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Map a ureq failure onto [`RemoteError`], decoding any error payload.
pub fn classify(err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            decode_error(status, &body)
        }
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    reason: Option<String>,
}

/// Decode an error response.
///
/// Understands the Google envelope (`{"error":{"message","errors":[{"reason"}]}}`)
/// and the GitHub one (`{"message"}`); anything else keeps the raw body.
pub fn decode_error(status: u16, body: &str) -> RemoteError {
    let (message, reason) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: Some(error), ..
        }) => (
            error.message,
            error.errors.into_iter().find_map(|item| item.reason),
        ),
        Ok(ErrorEnvelope { message, .. }) => (message, None),
        Err(_) => (None, None),
    };
    let message = message.unwrap_or_else(|| match body.trim() {
        "" => format!("HTTP {status}"),
        raw => raw.to_string(),
    });
    match reason {
        Some(reason) if reason == VERSION_CONFLICT_REASON => {
            RemoteError::Conflict { reason, message }
        }
        reason => RemoteError::Status {
            status,
            message,
            reason,
        },
    }
}

/// Run `op` up to `attempts` times, backing off exponentially between
/// retryable failures. `op` receives the 1-based attempt number.
pub fn with_retries<T, F>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T, RemoteError>
where
    F: FnMut(u32) -> Result<T, RemoteError>,
{
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Err(err) if err.is_retryable() && attempt < attempts => {
                let delay = base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(attempt, error = %err, ?delay, "transient failure; retrying");
                thread::sleep(delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}
