//! HTTP page fetcher for the public artworks API.
//!
//! # Responsibility
//! - Issue one `GET {base}/artworks?page=N&limit=M&fields=...` per page.
//! - Decode the `{ pagination: { total }, data: [...] }` envelope.
//!
//! # Invariants
//! - Non-2xx responses are reported as `FetchError::Status`, never decoded.
//! - Bodies without `data` or `pagination.total` are `FetchError::Malformed`.
//! - Every returned record has passed `Artwork::validate()`.

use crate::fetch::{FetchError, FetchResult, PageFetcher};
use crate::model::artwork::{Artwork, ArtworkPage};
use log::{debug, error, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Columns requested from upstream; matches the table's displayed fields.
pub const ARTWORK_FIELDS: &str =
    "id,title,place_of_origin,artist_display,inscriptions,date_start,date_end";

#[derive(Debug, Deserialize)]
struct ArtworksEnvelope {
    pagination: Option<PaginationBlock>,
    data: Option<Vec<Artwork>>,
}

#[derive(Debug, Deserialize)]
struct PaginationBlock {
    total: Option<u64>,
}

/// Blocking reqwest-backed fetcher.
pub struct HttpPageFetcher {
    client: Client,
    artworks_url: String,
    page_size: u32,
}

impl HttpPageFetcher {
    /// Builds a fetcher against `base_url` (for example `https://api.artic.edu/api/v1`).
    ///
    /// # Errors
    /// - Returns the reqwest builder error when the TLS backend cannot start.
    pub fn new(base_url: &str, page_size: u32, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("artgrid/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            artworks_url: format!("{}/artworks", base_url.trim_end_matches('/')),
            page_size,
        })
    }

    pub fn artworks_url(&self) -> &str {
        self.artworks_url.as_str()
    }

    fn request_page(&self, page: u64) -> FetchResult<ArtworkPage> {
        let response = self
            .client
            .get(self.artworks_url.as_str())
            .query(&[("page", page.to_string()), ("limit", self.page_size.to_string())])
            .query(&[("fields", ARTWORK_FIELDS)])
            .send()
            .map_err(|err| FetchError::transport(page, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|err| FetchError::transport(page, err))?;
        parse_page_body(page, body.as_str())
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch_page(&self, page: u64) -> FetchResult<ArtworkPage> {
        if page == 0 {
            return Err(FetchError::InvalidPage(page));
        }

        let started_at = Instant::now();
        debug!(
            "event=page_fetch module=fetch status=start page={} limit={}",
            page, self.page_size
        );

        match self.request_page(page) {
            Ok(fetched) => {
                info!(
                    "event=page_fetch module=fetch status=ok page={} records={} total={} duration_ms={}",
                    page,
                    fetched.records.len(),
                    fetched.total_records,
                    started_at.elapsed().as_millis()
                );
                Ok(fetched)
            }
            Err(err) => {
                error!(
                    "event=page_fetch module=fetch status=error page={} duration_ms={} error_code={} error={}",
                    page,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Decodes one upstream response body into a validated page.
pub fn parse_page_body(page: u64, body: &str) -> FetchResult<ArtworkPage> {
    let envelope: ArtworksEnvelope = serde_json::from_str(body)
        .map_err(|err| FetchError::malformed(page, format!("invalid JSON: {err}")))?;

    let records = envelope
        .data
        .ok_or_else(|| FetchError::malformed(page, "missing `data`"))?;
    let total_records = envelope
        .pagination
        .and_then(|pagination| pagination.total)
        .ok_or_else(|| FetchError::malformed(page, "missing `pagination.total`"))?;

    for record in &records {
        record
            .validate()
            .map_err(|err| FetchError::malformed(page, err.to_string()))?;
    }

    Ok(ArtworkPage::new(records, total_records))
}
