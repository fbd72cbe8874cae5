//! Request builders for WCS 1.0 (key/value query parameters).

use crate::builder::KvpParams;
use crate::error::{WcsError, WcsResult};
use crate::params::{
    Scalar, check_bbox, check_dim_forecast, format_float, sort_bbox, sort_grid_num,
    sort_grid_size, sort_time,
};

/// Optional arguments of a WCS 1.0 GetCoverage request.
///
/// At most two of `dim_run`, `time` and `dim_forecast` may be given.
/// `width`/`height` set the number of grid points and `resx`/`resy` the size
/// of a grid box; each pair implies the other, so they are exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wcs1GetCoverageParams {
    pub format: Option<String>,
    pub crs: Option<String>,
    pub elevation: Option<String>,
    pub bbox: Option<Vec<Scalar>>,
    /// Model run time, any notation [`sort_time`] accepts.
    pub dim_run: Option<String>,
    pub time: Option<String>,
    /// Offset from the run time, e.g. `PT36H`.
    pub dim_forecast: Option<Scalar>,
    pub width: Option<Scalar>,
    pub height: Option<Scalar>,
    pub resx: Option<Scalar>,
    pub resy: Option<Scalar>,
    pub interpolation: Option<String>,
}

impl Wcs1GetCoverageParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn with_elevation(mut self, elevation: impl Into<String>) -> Self {
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

    pub fn with_dim_run(mut self, dim_run: impl Into<String>) -> Self {
        self.dim_run = Some(dim_run.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_dim_forecast(mut self, dim_forecast: impl Into<Scalar>) -> Self {
        self.dim_forecast = Some(dim_forecast.into());
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

    pub fn with_resx(mut self, resx: impl Into<Scalar>) -> Self {
        self.resx = Some(resx.into());
        self
    }

    pub fn with_resy(mut self, resy: impl Into<Scalar>) -> Self {
        self.resy = Some(resy.into());
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

pub fn build_describe_coverage_req(coverage_id: &str) -> KvpParams {
    vec![
        ("REQUEST", "DescribeCoverage".to_string()),
        ("COVERAGE", coverage_id.to_string()),
    ]
}

/// Query parameters for a GetCoverage request.
///
/// Only formats are checked, not whether the server offers the values.
pub fn build_get_coverage_req(
    coverage_id: &str,
    params: &Wcs1GetCoverageParams,
) -> WcsResult<KvpParams> {
    if coverage_id.trim().is_empty() {
        return Err(WcsError::MissingParameter("coverage_id"));
    }

    let mut out: KvpParams = vec![
        ("REQUEST", "GetCoverage".to_string()),
        ("COVERAGE", coverage_id.to_string()),
    ];

    if let Some(format) = &params.format {
        out.push(("FORMAT", format.clone()));
    }
    if let Some(crs) = &params.crs {
        out.push(("CRS", crs.clone()));
    }
    if let Some(elevation) = &params.elevation {
        out.push(("ELEVATION", elevation.clone()));
    }
    if let Some(bbox) = &params.bbox {
        check_bbox(bbox)?;
        out.push(("BBOX", sort_bbox(bbox)));
    }

    if params.dim_run.is_some() && params.time.is_some() && params.dim_forecast.is_some() {
        return Err(WcsError::invalid(
            "Cannot use more than 2 of dim_run, dim_forecast or time parameters together.",
        ));
    }
    if let Some(dim_run) = &params.dim_run {
        out.push(("DIM_RUN", sort_time(dim_run)?));
    }
    if let Some(time) = &params.time {
        out.push(("TIME", sort_time(time)?));
    }
    if let Some(dim_forecast) = &params.dim_forecast {
        check_dim_forecast(dim_forecast)?;
        out.push(("DIM_FORECAST", dim_forecast.to_string()));
    }

    if params.width.is_some() && params.resx.is_some() {
        return Err(WcsError::invalid(
            "Cannot specify width and resx together; one implies the other.",
        ));
    }
    if let Some(width) = &params.width {
        out.push(("WIDTH", sort_grid_num(width)?.to_string()));
    }
    if let Some(resx) = &params.resx {
        out.push(("RESX", format_float(sort_grid_size(resx)?)));
    }

    if params.height.is_some() && params.resy.is_some() {
        return Err(WcsError::invalid(
            "Cannot specify height and resy together; one implies the other.",
        ));
    }
    if let Some(height) = &params.height {
        out.push(("HEIGHT", sort_grid_num(height)?.to_string()));
    }
    if let Some(resy) = &params.resy {
        out.push(("RESY", format_float(sort_grid_size(resy)?)));
    }

    if let Some(interpolation) = &params.interpolation {
        out.push(("INTERPOLATION", interpolation.clone()));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(params: &'a KvpParams, key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_capabilities_and_describe() {
        assert_eq!(value(&build_get_capabilities_req(), "REQUEST"), Some("GetCapabilities"));

        let params = build_describe_coverage_req("test_id");
        assert_eq!(value(&params, "REQUEST"), Some("DescribeCoverage"));
        assert_eq!(value(&params, "COVERAGE"), Some("test_id"));
    }

    #[test]
    fn test_minimal_get_coverage() {
        let params = build_get_coverage_req("test_id", &Wcs1GetCoverageParams::new()).unwrap();
        assert_eq!(
            params,
            vec![
                ("REQUEST", "GetCoverage".to_string()),
                ("COVERAGE", "test_id".to_string()),
            ]
        );
    }

    #[test]
    fn test_full_get_coverage() {
        let request = Wcs1GetCoverageParams::new()
            .with_format("NetCDF3")
            .with_crs("EPSG:4326")
            .with_elevation("850")
            .with_bbox(vec![Scalar::from("1"), 2.2.into(), 3.into(), "4.4".into()])
            .with_dim_run("21st April 2015")
            .with_dim_forecast("PT36H")
            .with_width(10.0)
            .with_resy("0.5")
            .with_interpolation("nearest");
        let params = build_get_coverage_req("test_id", &request).unwrap();

        assert_eq!(value(&params, "FORMAT"), Some("NetCDF3"));
        assert_eq!(value(&params, "CRS"), Some("EPSG:4326"));
        assert_eq!(value(&params, "ELEVATION"), Some("850"));
        assert_eq!(value(&params, "BBOX"), Some("1,2.2,3,4.4"));
        assert_eq!(value(&params, "DIM_RUN"), Some("2015-04-21T00:00:00Z"));
        assert_eq!(value(&params, "DIM_FORECAST"), Some("PT36H"));
        assert_eq!(value(&params, "WIDTH"), Some("10"));
        assert_eq!(value(&params, "RESY"), Some("0.5"));
        assert_eq!(value(&params, "INTERPOLATION"), Some("nearest"));
        assert_eq!(value(&params, "TIME"), None);
    }

    #[test]
    fn test_three_time_parameters_rejected() {
        let request = Wcs1GetCoverageParams::new()
            .with_dim_run("2015-04-21")
            .with_time("2015-04-22")
            .with_dim_forecast("PT24H");
        assert!(matches!(
            build_get_coverage_req("test_id", &request),
            Err(WcsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_resolution_pairs_are_exclusive() {
        let request = Wcs1GetCoverageParams::new().with_width(10).with_resx(0.5);
        assert!(build_get_coverage_req("test_id", &request).is_err());

        let request = Wcs1GetCoverageParams::new().with_height(10).with_resy(0.5);
        assert!(build_get_coverage_req("test_id", &request).is_err());
    }

    #[test]
    fn test_dim_forecast_must_be_text() {
        let request = Wcs1GetCoverageParams::new().with_dim_forecast(36);
        assert!(matches!(
            build_get_coverage_req("test_id", &request),
            Err(WcsError::InvalidArgument(_))
        ));
    }
}
