use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;

use crate::lookup::domain::lookup_service::{
    AttendeeRecord, LookupError, LookupResult, LookupService,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Looks attendees up against a remote roster over HTTP.
///
/// `GET {base}/attendees/{payload}` answers 200 with an [`AttendeeRecord`]
/// body, or 404 when the payload is not registered.
pub struct HttpLookupService {
    client: Client,
    base: Url,
}

impl HttpLookupService {
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let base = Url::parse(base_url)
            .map_err(|e| LookupError::NotConfigured(format!("invalid base URL {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(LookupError::NotConfigured(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::NotConfigured(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// URL queried for `payload`, with the payload percent-encoded as a
    /// single path segment.
    pub fn url_for(&self, payload: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("attendees").push(payload);
        }
        url
    }
}

fn interpret_response(payload: &str, status: u16, body: &str) -> Result<LookupResult, LookupError> {
    match status {
        200 => {
            let record: AttendeeRecord =
                serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
            Ok(LookupResult::found(record))
        }
        404 => Ok(LookupResult::not_found(format!(
            "ID {payload} is not registered"
        ))),
        status => Err(LookupError::Status {
            payload: payload.to_string(),
            status,
        }),
    }
}

impl LookupService for HttpLookupService {
    fn lookup(&self, payload: &str) -> Result<LookupResult, LookupError> {
        let url = self.url_for(payload);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        interpret_response(payload, status, &body)
    }
}
