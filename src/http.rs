use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::PlacesError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub trait Transport: Send + Sync {
    fn download(&self, url: &str, destination: &Path) -> Result<u64, PlacesError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, PlacesError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent())
                .map_err(|err| PlacesError::DownloadHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| PlacesError::DownloadHttp(err.to_string()))?;
        Ok(Self { client })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, PlacesError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .map(|body| truncate(&body, 200))
            .unwrap_or_else(|_| "download request failed".to_string());
        Err(PlacesError::DownloadStatus { status, message })
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &str, destination: &Path) -> Result<u64, PlacesError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| PlacesError::DownloadHttp(err.to_string()))?;
        let mut response = Self::handle_status(response)?;
        let mut file = File::create(destination).map_err(|err| {
            PlacesError::Filesystem(format!("create {}: {err}", destination.display()))
        })?;
        let bytes = std::io::copy(&mut response, &mut file).map_err(stream_error)?;
        file.flush()
            .and_then(|_| file.sync_all())
            .map_err(|err| PlacesError::Filesystem(err.to_string()))?;
        Ok(bytes)
    }
}

pub fn user_agent() -> String {
    format!("cdc-places/{}", env!("CARGO_PKG_VERSION"))
}

// `io::copy` reports both sides; local write failures are not network errors.
fn stream_error(err: io::Error) -> PlacesError {
    match err.kind() {
        io::ErrorKind::StorageFull
        | io::ErrorKind::WriteZero
        | io::ErrorKind::PermissionDenied
        | io::ErrorKind::ReadOnlyFilesystem => {
            PlacesError::Filesystem(format!("write interrupted: {err}"))
        }
        _ => PlacesError::DownloadHttp(format!("stream interrupted: {err}")),
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_long_error_bodies() {
        let body = "x".repeat(500);
        let truncated = truncate(&body, 200);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate("  short  ", 200), "short");
    }

    #[test]
    fn disk_full_is_a_filesystem_error() {
        let err = stream_error(io::Error::new(
            io::ErrorKind::StorageFull,
            "No space left on device",
        ));
        assert!(matches!(err, PlacesError::Filesystem(_)));
        assert!(!err.is_network());

        let err = stream_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(matches!(err, PlacesError::DownloadHttp(_)));
    }

    #[test]
    fn user_agent_carries_version() {
        assert!(user_agent().starts_with("cdc-places/"));
    }
}
