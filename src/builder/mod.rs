//! Request builders for WCS 1.0 and 2.0.0.
//!
//! Key/value operations produce ordered query parameters ([`KvpParams`]);
//! the WCS 2.0.0 DescribeCoverage and GetCoverage operations produce XML
//! request bodies.

pub mod dimension;
pub mod request;
pub mod wcs1;
pub mod wcs2;
pub mod writer;

/// Ordered query parameters of a key/value request.
pub type KvpParams = Vec<(&'static str, String)>;
