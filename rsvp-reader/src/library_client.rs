//! HTTP client for the library service

use crate::error::{Error, Result};
use reqwest::StatusCode;
use rsvp_common::TextRecord;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-request timeout for library calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only client for `GET /library` and `GET /library/{id}`
#[derive(Debug, Clone)]
pub struct LibraryClient {
    http: reqwest::Client,
    base_url: String,
}

impl LibraryClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Library(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every stored text
    pub async fn list(&self) -> Result<Vec<TextRecord>> {
        let url = format!("{}/library", self.base_url);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!("Library request failed: {}", e);
            Error::Library(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(Error::Library(format!(
                "GET /library returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<TextRecord>>()
            .await
            .map_err(|e| Error::Library(format!("Invalid library listing: {}", e)))
    }

    /// Fetch one text by id
    pub async fn get(&self, id: i64) -> Result<TextRecord> {
        let url = format!("{}/library/{}", self.base_url, id);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!("Library request failed: {}", e);
            Error::Library(e.to_string())
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::TextNotFound(id)),
            status if !status.is_success() => Err(Error::Library(format!(
                "GET /library/{} returned {}",
                id, status
            ))),
            _ => response
                .json::<TextRecord>()
                .await
                .map_err(|e| Error::Library(format!("Invalid library record: {}", e))),
        }
    }
}
