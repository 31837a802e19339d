//! Artwork record and page model.
//!
//! # Responsibility
//! - Define the canonical record shape for one table row.
//! - Define the page unit returned by every `PageFetcher`.
//! - Provide page arithmetic shared by the walker and the session.
//!
//! # Invariants
//! - `id` is stable across fetches and unique within the collection.
//! - `date_end` is not earlier than `date_start` when both are set.
//! - Page numbers are 1-based and contiguous.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for one artwork record.
///
/// Matches the integer ids used by the upstream collection API.
pub type ArtworkId = u64;

/// One artwork row.
///
/// Only `id` is interpreted by selection logic; the remaining fields are
/// display attributes and may be missing upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_of_origin: Option<String>,
    #[serde(default)]
    pub artist_display: Option<String>,
    #[serde(default)]
    pub inscriptions: Option<String>,
    /// Year the work was started. Negative values are BCE.
    #[serde(default)]
    pub date_start: Option<i32>,
    /// Year the work was completed. Should be >= `date_start` when set.
    #[serde(default)]
    pub date_end: Option<i32>,
}

/// Validation errors for artwork display attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkValidationError {
    InvalidDateRange {
        id: ArtworkId,
        date_start: i32,
        date_end: i32,
    },
}

impl Display for ArtworkValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateRange {
                id,
                date_start,
                date_end,
            } => write!(
                f,
                "artwork {id} has date_end {date_end} earlier than date_start {date_start}"
            ),
        }
    }
}

impl Error for ArtworkValidationError {}

impl Artwork {
    /// Creates a record with only an id and a title.
    pub fn new(id: ArtworkId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            place_of_origin: None,
            artist_display: None,
            inscriptions: None,
            date_start: None,
            date_end: None,
        }
    }

    /// Checks display attribute invariants.
    pub fn validate(&self) -> Result<(), ArtworkValidationError> {
        if let (Some(date_start), Some(date_end)) = (self.date_start, self.date_end) {
            if date_end < date_start {
                return Err(ArtworkValidationError::InvalidDateRange {
                    id: self.id,
                    date_start,
                    date_end,
                });
            }
        }
        Ok(())
    }
}

/// One fetch unit: ordered records plus the collection-wide total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtworkPage {
    pub records: Vec<Artwork>,
    /// Total record count across all pages, as reported with this page.
    pub total_records: u64,
}

impl ArtworkPage {
    pub fn new(records: Vec<Artwork>, total_records: u64) -> Self {
        Self {
            records,
            total_records,
        }
    }
}

/// Returns `ceil(total_records / page_size)`.
///
/// A zero page size yields zero pages; callers validate page size first.
pub fn page_count(total_records: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(u64::from(page_size))
}

/// Maps a zero-based row offset to its 1-based page number.
pub fn page_for_offset(first: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 1;
    }
    first / u64::from(page_size) + 1
}

#[cfg(test)]
mod tests {
    use super::{page_count, page_for_offset, Artwork, ArtworkValidationError};

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(25, 10), 3);
    }

    #[test]
    fn page_count_is_zero_for_zero_page_size() {
        assert_eq!(page_count(25, 0), 0);
    }

    #[test]
    fn page_for_offset_is_one_based() {
        assert_eq!(page_for_offset(0, 10), 1);
        assert_eq!(page_for_offset(9, 10), 1);
        assert_eq!(page_for_offset(10, 10), 2);
        assert_eq!(page_for_offset(20, 10), 3);
    }

    #[test]
    fn validate_rejects_inverted_date_range() {
        let mut artwork = Artwork::new(7, "Untitled");
        artwork.date_start = Some(1890);
        artwork.date_end = Some(1889);

        let err = artwork.validate().expect_err("inverted range must fail");
        assert!(matches!(
            err,
            ArtworkValidationError::InvalidDateRange { id: 7, .. }
        ));
    }

    #[test]
    fn validate_accepts_open_and_equal_ranges() {
        let mut artwork = Artwork::new(8, "Study");
        artwork.date_start = Some(1890);
        artwork.validate().expect("open range is valid");

        artwork.date_end = Some(1890);
        artwork.validate().expect("equal range is valid");
    }

    #[test]
    fn deserializes_upstream_row_with_nulls() {
        let artwork: Artwork = serde_json::from_str(
            r#"{
                "id": 27992,
                "title": "A Sunday on La Grande Jatte, 1884",
                "place_of_origin": "France",
                "artist_display": "Georges Seurat\nFrench, 1859-1891",
                "inscriptions": null,
                "date_start": 1884,
                "date_end": 1886
            }"#,
        )
        .expect("upstream row should decode");

        assert_eq!(artwork.id, 27992);
        assert_eq!(artwork.place_of_origin.as_deref(), Some("France"));
        assert_eq!(artwork.inscriptions, None);
        assert_eq!(artwork.date_end, Some(1886));
    }
}
