//! A Rust client for OGC Web Coverage Service (WCS) endpoints.
//!
//! The crate covers WCS 1.0 and WCS 2.0.0 with the MetOcean application
//! profile: build requests, send them, and read the XML answers into
//! [`Coverage`] holders.
//!
//! ## Quick start
//! - Configure the endpoint via environment variables (`WCS_URL`, optional
//!   `WCS_KEY`) or a `.wcsrc` file (current directory or home directory).
//! - List coverages, describe one, then download it with
//!   [`Wcs2Client::download_coverage`].
//!
//! ```no_run
//! use anyhow::Result;
//! use webcoverageservice::{GetCoverageParams, Wcs2Client};
//!
//! fn main() -> Result<()> {
//!     let client = Wcs2Client::from_env()?;
//!     let params = GetCoverageParams::new()
//!         .with_format("NetCDF3")
//!         .with_bbox([-10.0, 48.0, 4.0, 62.0])
//!         .with_time(["2016-01-01T00:00:00Z", "2016-01-02T00:00:00Z"]);
//!     client.download_coverage(
//!         "temperature_2016-01-01T00.00.00Z",
//!         ["temperature"],
//!         &params,
//!         std::path::Path::new("temperature.nc"),
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! The GetCoverage document can also be assembled directly:
//!
//! ```
//! use webcoverageservice::{Axis, CrsSlot, Dimension, GetCoverageRequest};
//!
//! let xml = GetCoverageRequest::new("temperature")
//!     .with_components(["air_temperature"])
//!     .with_dimension(Axis::Level, Dimension::slice(850).with_unit("hPa"))
//!     .with_crs(CrsSlot::Crs3, "http://www.opengis.net/def/crs/EPSG/0/4979")
//!     .to_xml()
//!     .unwrap();
//! assert!(xml.contains(r#"<metocean:SlicePoint uomLabels="hPa">850</metocean:SlicePoint>"#));
//! ```

#![forbid(unsafe_code)]

pub mod builder;
mod client;
mod config;
pub mod coverage;
mod error;
pub mod params;
pub mod reader;
mod sender;
mod util;

pub use builder::dimension::{Axis, Dimension};
pub use builder::request::{CrsSlot, GetCoverageRequest, Interpolation};
pub use builder::wcs1::Wcs1GetCoverageParams;
pub use builder::wcs2::{Components, GetCoverageParams, build_get_coverage_req};
pub use builder::writer::{CrsDefaults, GetCoverageWriter, Namespaces};
pub use client::{ClientConfig, Wcs1Client, Wcs2Client, WcsVersion};
pub use coverage::{Coverage, CoverageCollection, CoverageList};
pub use error::{WcsError, WcsResult};
pub use params::{Scalar, Selection};
pub use reader::wcs2::Capabilities;
