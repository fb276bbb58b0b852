//! Pagination-driven discovery of a document's chapters.
//!
//! This module turns an arbitrary number of listing pages into an ordered,
//! deduplicated chapter sequence:
//!
//! - [`Discoverer`] - sequential pagination walk with link classification
//! - [`PageExtractor`] - externally supplied page-parsing seam
//! - [`SpringerExtractor`] - default extractor for the supported markup
//! - [`Document`] / [`Chapter`] / [`CoverResource`] - the discovered model

mod discoverer;
mod document;
mod error;
mod extractor;

pub use discoverer::Discoverer;
pub use document::{Chapter, ChapterStatus, CoverResource, Document};
pub use error::DiscoveryError;
pub use extractor::{PageExtractor, PageMetadata, SpringerExtractor};
