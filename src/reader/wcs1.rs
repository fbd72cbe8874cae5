//! WCS 1.0 response readers.

use crate::coverage::{Coverage, CoverageList};
use crate::error::{WcsError, WcsResult};
use crate::reader::parse_position;
use crate::reader::xml::{Element, read_xml};

pub const WCS_NS: &str = "http://www.opengis.net/wcs";
const NS: Option<&str> = Some(WCS_NS);

const AXIS_DESCRIPTION: &str = "rangeSet/RangeSet/axisDescription/AxisDescription";

/// The envelope holds two positions: longitude min/max first, then latitude
/// min/max.
fn lon_lat_bbox(offering: &Element) -> WcsResult<[f64; 4]> {
    let envelope = offering.find_one("lonLatEnvelope", NS)?;
    let (lon, lat) = match envelope.children() {
        [lon, lat, ..] => (parse_position(lon.text())?, parse_position(lat.text())?),
        _ => {
            return Err(WcsError::malformed(
                "lonLatEnvelope must contain two positions",
            ));
        }
    };
    match (lon.as_slice(), lat.as_slice()) {
        ([lon_min, lon_max, ..], [lat_min, lat_max, ..]) => {
            Ok([*lon_min, *lat_min, *lon_max, *lat_max])
        }
        _ => Err(WcsError::malformed(
            "lonLatEnvelope positions need two values each",
        )),
    }
}

/// Values of the `AxisDescription` called `name`; empty if there is none.
fn axis_values(offering: &Element, name: &str) -> WcsResult<Vec<String>> {
    for axis in offering.find_all(AXIS_DESCRIPTION, NS) {
        if axis.text_of("name", NS)? == name {
            return axis.texts("values/singleValue", NS);
        }
    }
    Ok(Vec::new())
}

/// Every coverage offered, with name, label and bounding box.
pub fn read_get_capabilities_res(xml: &str) -> WcsResult<CoverageList> {
    let root = read_xml(xml)?;
    root.find_all("ContentMetadata/CoverageOffering", NS)
        .into_iter()
        .map(|offering| -> WcsResult<Coverage> {
            Ok(Coverage {
                name: Some(offering.text_of("name", NS)?),
                label: Some(offering.text_of("label", NS)?),
                bbox: Some(lon_lat_bbox(offering)?),
                ..Coverage::default()
            })
        })
        .collect()
}

/// The single coverage a DescribeCoverage response describes.
pub fn read_describe_coverage_res(xml: &str) -> WcsResult<Coverage> {
    let root = read_xml(xml)?;
    let offering = root.find_one("CoverageOffering", NS)?;

    Ok(Coverage {
        name: Some(offering.text_of("name", NS)?),
        label: Some(offering.text_of("label", NS)?),
        bbox: Some(lon_lat_bbox(offering)?),
        dim_runs: Some(axis_values(offering, "DIM_RUN")?),
        dim_forecasts: Some(axis_values(offering, "DIM_FORECAST")?),
        times: Some(axis_values(offering, "TIME")?),
        elevations: Some(axis_values(offering, "ELEVATION")?),
        crss: Some(offering.texts("supportedCRSs/requestCRSs", NS)?),
        formats: Some(offering.texts("supportedFormats/formats", NS)?),
        interpolations: Some(
            offering.texts("supportedInterpolations/interpolationMethod", NS)?,
        ),
        ..Coverage::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WCS_Capabilities xmlns="http://www.opengis.net/wcs" xmlns:gml="http://www.opengis.net/gml" version="1.0.0">
  <Service><name>WCS</name></Service>
  <ContentMetadata>
    <CoverageOffering>
      <name>UKPPBEST_High_cloud_cover</name>
      <label>High cloud cover</label>
      <lonLatEnvelope srsName="WGS84(DD)">
        <gml:pos>-12.0 5.0</gml:pos>
        <gml:pos>48.0 62.0</gml:pos>
      </lonLatEnvelope>
    </CoverageOffering>
    <CoverageOffering>
      <name>UKPPBEST_Low_cloud_cover</name>
      <label>Low cloud cover</label>
      <lonLatEnvelope srsName="WGS84(DD)">
        <gml:pos>-12.0 5.0</gml:pos>
        <gml:pos>48.0 62.0</gml:pos>
      </lonLatEnvelope>
    </CoverageOffering>
  </ContentMetadata>
</WCS_Capabilities>"#;

    const DESCRIBE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CoverageDescription xmlns="http://www.opengis.net/wcs" xmlns:gml="http://www.opengis.net/gml" version="1.0.0">
  <CoverageOffering>
    <name>UKPPBEST_High_cloud_cover</name>
    <label>High cloud cover</label>
    <lonLatEnvelope srsName="WGS84(DD)">
      <gml:pos>-12.0 5.0</gml:pos>
      <gml:pos>48.0 62.0</gml:pos>
    </lonLatEnvelope>
    <rangeSet>
      <RangeSet>
        <name>High cloud cover</name>
        <axisDescription>
          <AxisDescription>
            <name>DIM_RUN</name>
            <values>
              <singleValue>2015-04-21T03:00:00Z</singleValue>
              <singleValue>2015-04-21T04:00:00Z</singleValue>
            </values>
          </AxisDescription>
        </axisDescription>
        <axisDescription>
          <AxisDescription>
            <name>DIM_FORECAST</name>
            <values><singleValue>PT0H</singleValue><singleValue>PT1H</singleValue></values>
          </AxisDescription>
        </axisDescription>
      </RangeSet>
    </rangeSet>
    <supportedCRSs><requestCRSs>EPSG:4326</requestCRSs><requestCRSs>EPSG:27700</requestCRSs></supportedCRSs>
    <supportedFormats><formats>GRIB2</formats><formats>NetCDF3</formats></supportedFormats>
    <supportedInterpolations><interpolationMethod>nearest neighbor</interpolationMethod></supportedInterpolations>
  </CoverageOffering>
</CoverageDescription>"#;

    #[test]
    fn test_read_get_capabilities() {
        let coverages = read_get_capabilities_res(CAPABILITIES).unwrap();
        assert_eq!(
            coverages.names(),
            ["UKPPBEST_High_cloud_cover", "UKPPBEST_Low_cloud_cover"]
        );
        assert_eq!(coverages[0].label.as_deref(), Some("High cloud cover"));
        assert_eq!(coverages[1].bbox, Some([-12.0, 48.0, 5.0, 62.0]));
    }

    #[test]
    fn test_read_describe_coverage() {
        let coverage = read_describe_coverage_res(DESCRIBE).unwrap();
        assert_eq!(coverage.name.as_deref(), Some("UKPPBEST_High_cloud_cover"));
        assert_eq!(
            coverage.dim_runs.unwrap(),
            ["2015-04-21T03:00:00Z", "2015-04-21T04:00:00Z"]
        );
        assert_eq!(coverage.dim_forecasts.unwrap(), ["PT0H", "PT1H"]);
        assert!(coverage.times.unwrap().is_empty());
        assert!(coverage.elevations.unwrap().is_empty());
        assert_eq!(coverage.crss.unwrap(), ["EPSG:4326", "EPSG:27700"]);
        assert_eq!(coverage.formats.unwrap(), ["GRIB2", "NetCDF3"]);
        assert_eq!(coverage.interpolations.unwrap(), ["nearest neighbor"]);
    }

    #[test]
    fn test_describe_requires_an_offering() {
        let xml = r#"<CoverageDescription xmlns="http://www.opengis.net/wcs"/>"#;
        assert!(matches!(
            read_describe_coverage_res(xml),
            Err(WcsError::MalformedResponse(_))
        ));
    }
}
