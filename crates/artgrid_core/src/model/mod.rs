//! Domain model for the artwork table.
//!
//! # Responsibility
//! - Define the record and page shapes returned by page fetchers.
//! - Define the selection set shared by manual toggles and bulk walks.
//!
//! # Invariants
//! - Every record is identified by a stable `ArtworkId`.
//! - Absence from a selection set means "not selected".

pub mod artwork;
pub mod selection;
