//! Paper metadata lookup backed by OpenAlex.
//!
//! GET /api/paper-info?doi=<doi> resolves one DOI to a flat record the
//! search and citation UI can render directly. No caching, no retries.

pub mod abstract_index;
pub mod doi;
pub mod openalex;
pub mod routes;

pub use openalex::{OpenAlexClient, PaperInfo};
