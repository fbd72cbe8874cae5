//! Request builders for WCS 2.0.0.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::builder::KvpParams;
use crate::builder::dimension::{Axis, Dimension};
use crate::builder::request::GetCoverageRequest;
use crate::error::{WcsError, WcsResult};
use crate::params::{Scalar, Selection, check_bbox, sort_grid_num, sort_time};

const WCS2_SCHEMA_LOCATION: &str =
    "http://www.opengis.net/wcs/2.0 http://schemas.opengis.net/wcs/2.0/wcsAll.xsd";

/// Range components to select. A single name converts to a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Components(Vec<String>);

impl Components {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Components {
    fn from(v: &str) -> Self {
        Components(vec![v.to_string()])
    }
}

impl From<String> for Components {
    fn from(v: String) -> Self {
        Components(vec![v])
    }
}

impl From<Vec<String>> for Components {
    fn from(v: Vec<String>) -> Self {
        Components(v)
    }
}

impl From<Vec<&str>> for Components {
    fn from(v: Vec<&str>) -> Self {
        Components(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Components {
    fn from(v: &[&str]) -> Self {
        Components(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Components {
    fn from(v: [&str; N]) -> Self {
        Components(v.iter().map(|s| s.to_string()).collect())
    }
}

/// Optional arguments of [`build_get_coverage_req`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetCoverageParams {
    /// Output format, e.g. `NetCDF3`. The document default is `KML`.
    pub format: Option<String>,
    /// A level, or two values bounding a level range.
    pub elevation: Option<Selection>,
    /// `[x-min, y-min, x-max, y-max]`.
    pub bbox: Option<Vec<Scalar>>,
    /// A time, or two values bounding a time window.
    pub time: Option<Selection>,
    /// Grid points along the longitude axis.
    pub width: Option<Scalar>,
    /// Grid points along the latitude axis.
    pub height: Option<Scalar>,
    /// Interpolation method used for width/height, `linear` when unset.
    pub interpolation: Option<String>,
}

impl GetCoverageParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_elevation(mut self, elevation: impl Into<Selection>) -> Self {
        self.elevation = Some(elevation.into());
        self
    }

    pub fn with_bbox<I, T>(mut self, bbox: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.bbox = Some(bbox.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_time(mut self, time: impl Into<Selection>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_width(mut self, width: impl Into<Scalar>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn with_height(mut self, height: impl Into<Scalar>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn with_interpolation(mut self, method: impl Into<String>) -> Self {
        self.interpolation = Some(method.into());
        self
    }
}

pub fn build_get_capabilities_req() -> KvpParams {
    vec![("REQUEST", "GetCapabilities".to_string())]
}

pub fn build_describe_coverage_collection_req(collection_id: &str, ref_time: &str) -> KvpParams {
    vec![
        ("REQUEST", "DescribeCoverageCollection".to_string()),
        ("CoverageCollectionId", collection_id.to_string()),
        ("ReferenceTime", ref_time.to_string()),
    ]
}

/// XML body of a DescribeCoverage request.
pub fn build_describe_coverage_req(coverage_id: &str) -> WcsResult<String> {
    let mut w = Writer::new(Cursor::new(Vec::new()));
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("DescribeCoverage");
    root.push_attribute(("xmlns", "http://www.opengis.net/wcs/2.0"));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    root.push_attribute(("xsi:schemaLocation", WCS2_SCHEMA_LOCATION));
    root.push_attribute(("service", "WCS"));
    root.push_attribute(("version", "2.0.0"));
    w.write_event(Event::Start(root))?;

    w.write_event(Event::Start(BytesStart::new("CoverageId")))?;
    w.write_event(Event::Text(BytesText::new(coverage_id)))?;
    w.write_event(Event::End(BytesEnd::new("CoverageId")))?;

    w.write_event(Event::End(BytesEnd::new("DescribeCoverage")))?;
    Ok(String::from_utf8(w.into_inner().into_inner())?)
}

/// Builds the XML body of a GetCoverage request.
///
/// This only checks argument formats, not whether the server offers them.
/// A two-value `elevation` or `time` is sent as a trim (in the order
/// given), a single value as a slice. `bbox` becomes a longitude trim from
/// `bbox[0]..bbox[2]` and a latitude trim from `bbox[1]..bbox[3]`. `width`
/// and `height` become interpolation sample sizes on `Long` and `Lat`.
///
/// ```
/// use webcoverageservice::{GetCoverageParams, build_get_coverage_req};
///
/// let params = GetCoverageParams::new()
///     .with_bbox([-10.0, 40.0, 10.0, 60.0])
///     .with_time("21st April 2015")
///     .with_width(100);
/// let xml = build_get_coverage_req("temperature", "air_temperature", &params).unwrap();
/// assert!(xml.contains("2015-04-21T00:00:00Z"));
/// ```
pub fn build_get_coverage_req(
    coverage_id: &str,
    components: impl Into<Components>,
    params: &GetCoverageParams,
) -> WcsResult<String> {
    let components = components.into();
    if coverage_id.trim().is_empty() {
        return Err(WcsError::MissingParameter("coverage_id"));
    }
    if components.is_empty() {
        return Err(WcsError::MissingParameter("components"));
    }

    let mut req = GetCoverageRequest::new(coverage_id).with_components(components.0);

    if let Some(format) = &params.format {
        req = req.with_format(format.as_str());
    }

    if let Some(elevation) = &params.elevation {
        let dim = match elevation {
            Selection::Point(v) => Dimension::slice(v.clone()),
            Selection::Range(values) => {
                let [low, high] = two_values("elevation", values)?;
                Dimension::trim(low.clone(), high.clone())
            }
        };
        req = req.with_dimension(Axis::Level, dim);
    }

    if let Some(bbox) = &params.bbox {
        check_bbox(bbox)?;
        req = req
            .with_dimension(Axis::Long, Dimension::trim(bbox[0].clone(), bbox[2].clone()))
            .with_dimension(Axis::Lat, Dimension::trim(bbox[1].clone(), bbox[3].clone()));
    }

    if let Some(time) = &params.time {
        let dim = match time {
            Selection::Point(v) => Dimension::slice(sort_time(&v.to_string())?),
            Selection::Range(values) => {
                let [low, high] = two_values("time", values)?;
                Dimension::trim(sort_time(&low.to_string())?, sort_time(&high.to_string())?)
            }
        };
        req = req.with_dimension(Axis::Time, dim);
    }

    let method = params.interpolation.as_deref().unwrap_or("linear");

    // A zero grid count means "server default" and adds no axis entry.
    if let Some(width) = &params.width {
        let width = sort_grid_num(width)?;
        if width != 0 {
            req = req.with_interpolation("Long", Some(method), Some(width));
        }
    }

    if let Some(height) = &params.height {
        let height = sort_grid_num(height)?;
        if height != 0 {
            req = req.with_interpolation("Lat", Some(method), Some(height));
        }
    }

    tracing::debug!(coverage_id, "built WCS2 GetCoverage request");
    req.to_xml()
}

fn two_values<'a>(name: &str, values: &'a [Scalar]) -> WcsResult<[&'a Scalar; 2]> {
    match values {
        [low, high] => Ok([low, high]),
        _ => Err(WcsError::invalid(format!(
            "Provide a list of 2 values if specifying {} bounds, {} found.",
            name,
            values.len()
        ))),
    }
}
