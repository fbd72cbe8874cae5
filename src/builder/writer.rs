//! XML rendering of [`GetCoverageRequest`] documents.
//!
//! Node order inside `wcs:GetCoverage` is fixed: `Extension`, `CoverageId`,
//! the lat/long/level/time dimensions that are set, `format`, `mediaType`.
//! Output is compact (no indentation).

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::builder::dimension::{Axis, Dimension};
use crate::builder::request::{CrsSlot, GetCoverageRequest, Interpolation};
use crate::error::WcsResult;
use crate::params::Scalar;

/// Namespace URIs declared on the `GetCoverage` root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespaces {
    pub xlink: &'static str,
    pub wcs: &'static str,
    pub wcs_crs: &'static str,
    pub interpolation: &'static str,
    pub range_subsetting: &'static str,
    pub xsi: &'static str,
    pub metocean: &'static str,
}

pub const WCS2_NAMESPACES: Namespaces = Namespaces {
    xlink: "http://www.w3.org/1999/xlink",
    wcs: "http://www.opengis.net/wcs/2.0",
    wcs_crs: "http://www.opengis.net/wcs_service-extension_crs/1.0",
    interpolation: "http://www.opengis.net/WCS_service-extension_interpolation/1.0",
    range_subsetting: "http://www.opengis.net/wcs/range-subsetting/1.0",
    xsi: "http://www.w3.org/2001/XMLSchema-instance",
    metocean: "http://def.wmo.int/metce/2013/metocean",
};

/// Values used for CRS slots the request leaves unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrsDefaults(pub [&'static str; 4]);

// The `&amp;` is part of the value and is escaped again on output.
pub const DEFAULT_CRS: CrsDefaults = CrsDefaults([
    "http://www.opengis.net/def/crs-combine?",
    "http://www.opengis.net/def/crs/EPSG/0/4326&amp;",
    "http://www.codes.wmo.int/GRIB2/table4.5/IsobaricSurface&amp;",
    "http://www.opengis.net/def/temporal/ISO8601",
]);

impl CrsDefaults {
    pub fn get(&self, slot: CrsSlot) -> &'static str {
        self.0[slot.index()]
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serializer for GetCoverage request documents.
#[derive(Debug, Clone, Copy)]
pub struct GetCoverageWriter {
    namespaces: Namespaces,
    crs_defaults: CrsDefaults,
}

impl Default for GetCoverageWriter {
    fn default() -> Self {
        Self::new(WCS2_NAMESPACES, DEFAULT_CRS)
    }
}

impl GetCoverageWriter {
    pub fn new(namespaces: Namespaces, crs_defaults: CrsDefaults) -> Self {
        Self {
            namespaces,
            crs_defaults,
        }
    }

    /// Text of `wcsCRS:subsettingCrs`: the four slots joined by `\n1=`,
    /// `\n2=` and `\n3=`.
    pub fn subsetting_crs(&self, request: &GetCoverageRequest) -> String {
        let slot = |s: CrsSlot| {
            request
                .crs(s)
                .unwrap_or_else(|| self.crs_defaults.get(s))
                .to_string()
        };
        format!(
            "{}\n1={}\n2={}\n3={}",
            slot(CrsSlot::Crs0),
            slot(CrsSlot::Crs1),
            slot(CrsSlot::Crs2),
            slot(CrsSlot::Crs3)
        )
    }

    /// Renders the document. Callers are expected to have checked the
    /// coverage id; see [`GetCoverageRequest::to_xml`].
    pub fn write(&self, request: &GetCoverageRequest) -> WcsResult<String> {
        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

        let ns = &self.namespaces;
        let mut root = BytesStart::new("wcs:GetCoverage");
        root.push_attribute(("xmlns:xlink", ns.xlink));
        root.push_attribute(("xmlns:wcs", ns.wcs));
        root.push_attribute(("xmlns:wcsCRS", ns.wcs_crs));
        root.push_attribute(("xmlns:int", ns.interpolation));
        root.push_attribute(("xmlns:rsub", ns.range_subsetting));
        root.push_attribute(("xmlns:xsi", ns.xsi));
        root.push_attribute(("xmlns:metocean", ns.metocean));
        root.push_attribute(("service", "WCS"));
        root.push_attribute(("version", "2.0.0"));
        w.write_event(Event::Start(root))?;

        self.write_extension(&mut w, request)?;
        write_text_element(&mut w, "wcs:CoverageId", request.coverage_id())?;
        for axis in Axis::ALL {
            if let Some(dim) = request.dimension(axis) {
                write_dimension(&mut w, axis, dim)?;
            }
        }
        write_text_element(&mut w, "wcs:format", request.format())?;
        write_text_element(&mut w, "wcs:mediaType", request.media_type())?;

        w.write_event(Event::End(BytesEnd::new("wcs:GetCoverage")))?;
        Ok(String::from_utf8(w.into_inner().into_inner())?)
    }

    fn write_extension(&self, w: &mut XmlWriter, request: &GetCoverageRequest) -> WcsResult<()> {
        w.write_event(Event::Start(BytesStart::new("wcs:Extension")))?;

        if request.components().is_empty() {
            w.write_event(Event::Empty(BytesStart::new("rsub:rangeSubset")))?;
        } else {
            w.write_event(Event::Start(BytesStart::new("rsub:rangeSubset")))?;
            for component in request.components() {
                write_text_element(w, "rsub:rangeComponent", component)?;
            }
            w.write_event(Event::End(BytesEnd::new("rsub:rangeSubset")))?;
        }

        w.write_event(Event::Start(BytesStart::new("wcsCRS:GetCoverageCrs")))?;
        write_text_element(w, "wcsCRS:subsettingCrs", &self.subsetting_crs(request))?;
        w.write_event(Event::End(BytesEnd::new("wcsCRS:GetCoverageCrs")))?;

        w.write_event(Event::Start(BytesStart::new("int:Interpolation")))?;
        let axes: Vec<&Interpolation> = request
            .interpolation()
            .iter()
            .filter(|i| i.method.is_some())
            .collect();
        if axes.is_empty() {
            w.write_event(Event::Empty(BytesStart::new("int:InterpolationAxes")))?;
        } else {
            w.write_event(Event::Start(BytesStart::new("int:InterpolationAxes")))?;
            for entry in axes {
                let Some(method) = entry.method.as_deref() else {
                    continue;
                };
                let mut node = BytesStart::new("int:InterpolationAxis");
                node.push_attribute(("axis", entry.axis.as_str()));
                node.push_attribute((
                    "interpolationMethod",
                    interpolation_method(method, entry.sample_size).as_str(),
                ));
                w.write_event(Event::Empty(node))?;
            }
            w.write_event(Event::End(BytesEnd::new("int:InterpolationAxes")))?;
        }
        w.write_event(Event::End(BytesEnd::new("int:Interpolation")))?;

        w.write_event(Event::End(BytesEnd::new("wcs:Extension")))?;
        Ok(())
    }
}

/// `interpolationMethod` attribute value, e.g. `linear/samplesize=100`.
pub fn interpolation_method(method: &str, sample_size: Option<i64>) -> String {
    match sample_size {
        Some(n) => format!("{}/samplesize={}", method, n),
        None => method.to_string(),
    }
}

fn write_text_element(w: &mut XmlWriter, name: &str, text: &str) -> WcsResult<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_value(w: &mut XmlWriter, name: &str, value: &Scalar, unit: Option<&str>) -> WcsResult<()> {
    let mut node = BytesStart::new(name);
    if let Some(unit) = unit {
        node.push_attribute(("uomLabels", unit));
    }
    w.write_event(Event::Start(node))?;
    w.write_event(Event::Text(BytesText::new(&value.to_string())))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_dimension(w: &mut XmlWriter, axis: Axis, dim: &Dimension) -> WcsResult<()> {
    match dim {
        Dimension::Trim { low, high, unit } => {
            w.write_event(Event::Start(BytesStart::new("metocean:DimensionTrim")))?;
            write_text_element(w, "wcs:Dimension", axis.dimension_name())?;
            write_value(w, "metocean:TrimLow", low, unit.as_deref())?;
            write_value(w, "metocean:TrimHigh", high, unit.as_deref())?;
            w.write_event(Event::End(BytesEnd::new("metocean:DimensionTrim")))?;
        }
        Dimension::Slice { value, unit } => {
            w.write_event(Event::Start(BytesStart::new("metocean:DimensionSlice")))?;
            write_text_element(w, "wcs:Dimension", axis.dimension_name())?;
            write_value(w, "metocean:SlicePoint", value, unit.as_deref())?;
            w.write_event(Event::End(BytesEnd::new("metocean:DimensionSlice")))?;
        }
    }
    Ok(())
}
