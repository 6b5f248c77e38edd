//! Shared response handling for upstream calls.

use dkgpedia_core::{DkgError, DkgResult};
use serde_json::Value;

/// A fully read upstream response, kept verbatim for relaying.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    /// Read status, headers and body of a `reqwest` response.
    pub async fn read(service: &'static str, response: reqwest::Response) -> DkgResult<Self> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| send_error(service, e))?
            .to_vec();
        Ok(Self { status, headers, body })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with this name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> DkgResult<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parsed JSON body of a 2xx response; anything else is an upstream error.
    pub fn into_json(self, service: &'static str) -> DkgResult<Value> {
        if !self.is_success() {
            return Err(DkgError::Upstream {
                service,
                status: self.status,
                body: self.text(),
            });
        }
        self.json()
    }
}

/// Map a transport error, keeping timeouts distinct.
pub fn send_error(service: &'static str, error: reqwest::Error) -> DkgError {
    if error.is_timeout() {
        DkgError::Timeout(service)
    } else {
        DkgError::unreachable(service, error.to_string())
    }
}

pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
