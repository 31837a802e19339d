//! Core use-case services.
//!
//! # Responsibility
//! - Run cross-page selection walks over a `PageFetcher`.
//! - Own table session state (visible page, total, selection) for hosts.
//! - Keep hosts decoupled from transport details.

pub mod selection_service;
pub mod table_service;
