use std::path::Path;

use crate::builder::dimension::{Axis, Dimension};
use crate::builder::writer::GetCoverageWriter;
use crate::error::{WcsError, WcsResult};

/// The four slots of the combined subsetting CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsSlot {
    /// Prefix of the combined CRS URI.
    Crs0,
    /// Horizontal CRS.
    Crs1,
    /// Vertical CRS.
    Crs2,
    /// Temporal CRS.
    Crs3,
}

impl CrsSlot {
    pub(crate) fn index(self) -> usize {
        match self {
            CrsSlot::Crs0 => 0,
            CrsSlot::Crs1 => 1,
            CrsSlot::Crs2 => 2,
            CrsSlot::Crs3 => 3,
        }
    }
}

/// Interpolation directive for one named axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    pub axis: String,
    /// Entries without a method are not serialized.
    pub method: Option<String>,
    pub sample_size: Option<i64>,
}

/// A WCS 2.0.0 GetCoverage request document.
///
/// Built by chaining the value-returning `with_*` methods and rendered once
/// with [`GetCoverageRequest::to_xml`]:
///
/// ```
/// use webcoverageservice::{Axis, Dimension, GetCoverageRequest};
///
/// let xml = GetCoverageRequest::new("temperature")
///     .with_components(["air_temperature"])
///     .with_dimension(Axis::Level, Dimension::slice("850"))
///     .with_format("NetCDF3")
///     .to_xml()
///     .unwrap();
/// assert!(xml.contains("<wcs:CoverageId>temperature</wcs:CoverageId>"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GetCoverageRequest {
    coverage_id: String,
    components: Vec<String>,
    crs: [Option<String>; 4],
    interpolation: Vec<Interpolation>,
    lat: Option<Dimension>,
    long: Option<Dimension>,
    level: Option<Dimension>,
    time: Option<Dimension>,
    format: String,
    media_type: String,
}

impl Default for GetCoverageRequest {
    fn default() -> Self {
        Self {
            coverage_id: String::new(),
            components: Vec::new(),
            crs: [None, None, None, None],
            interpolation: Vec::new(),
            lat: None,
            long: None,
            level: None,
            time: None,
            format: "KML".to_string(),
            media_type: String::new(),
        }
    }
}

impl GetCoverageRequest {
    pub fn new(coverage_id: impl Into<String>) -> Self {
        Self {
            coverage_id: coverage_id.into(),
            ..Self::default()
        }
    }

    /// Replaces the selected range components.
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    /// Union of the current and the given components, without duplicates.
    pub fn add_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merged: Vec<String> = Vec::new();
        let current = std::mem::take(&mut self.components);
        for c in current.into_iter().chain(components.into_iter().map(Into::into)) {
            if !merged.contains(&c) {
                merged.push(c);
            }
        }
        self.components = merged;
        self
    }

    pub fn remove_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removed: Vec<S> = components.into_iter().collect();
        self.components
            .retain(|c| !removed.iter().any(|r| r.as_ref() == c.as_str()));
        self
    }

    pub fn with_crs(mut self, slot: CrsSlot, value: impl Into<String>) -> Self {
        self.crs[slot.index()] = Some(value.into());
        self
    }

    /// Sets the interpolation for `axis`. Re-setting an axis keeps its place.
    pub fn with_interpolation(
        mut self,
        axis: impl Into<String>,
        method: Option<&str>,
        sample_size: Option<i64>,
    ) -> Self {
        let entry = Interpolation {
            axis: axis.into(),
            method: method.map(str::to_string),
            sample_size,
        };
        match self.interpolation.iter_mut().find(|i| i.axis == entry.axis) {
            Some(existing) => *existing = entry,
            None => self.interpolation.push(entry),
        }
        self
    }

    pub fn with_dimension(mut self, axis: Axis, dimension: Dimension) -> Self {
        *self.slot_mut(axis) = Some(dimension);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn coverage_id(&self) -> &str {
        &self.coverage_id
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn crs(&self, slot: CrsSlot) -> Option<&str> {
        self.crs[slot.index()].as_deref()
    }

    pub fn interpolation(&self) -> &[Interpolation] {
        &self.interpolation
    }

    pub fn dimension(&self, axis: Axis) -> Option<&Dimension> {
        match axis {
            Axis::Lat => self.lat.as_ref(),
            Axis::Long => self.long.as_ref(),
            Axis::Level => self.level.as_ref(),
            Axis::Time => self.time.as_ref(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut Option<Dimension> {
        match axis {
            Axis::Lat => &mut self.lat,
            Axis::Long => &mut self.long,
            Axis::Level => &mut self.level,
            Axis::Time => &mut self.time,
        }
    }

    /// Renders the request with the standard WCS 2.0.0 namespaces and CRSs.
    pub fn to_xml(&self) -> WcsResult<String> {
        if self.coverage_id.trim().is_empty() {
            return Err(WcsError::MissingParameter("coverage_id"));
        }
        GetCoverageWriter::default().write(self)
    }

    /// Writes exactly the output of [`GetCoverageRequest::to_xml`] to `path`.
    pub fn save_xml(&self, path: &Path) -> WcsResult<()> {
        let xml = self.to_xml()?;
        std::fs::write(path, xml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = GetCoverageRequest::new("cov");
        assert_eq!(req.coverage_id(), "cov");
        assert_eq!(req.format(), "KML");
        assert_eq!(req.media_type(), "");
        assert!(req.components().is_empty());
        assert!(Axis::ALL.iter().all(|a| req.dimension(*a).is_none()));
        assert_eq!(req.crs(CrsSlot::Crs2), None);
    }

    #[test]
    fn test_add_and_remove_components() {
        let req = GetCoverageRequest::new("cov")
            .with_components(["a", "b", "a"])
            .add_components(["b", "c"]);
        assert_eq!(req.components(), ["a", "b", "c"]);

        let req = req.remove_components(["a", "z"]);
        assert_eq!(req.components(), ["b", "c"]);
    }

    #[test]
    fn test_with_components_keeps_duplicates() {
        let req = GetCoverageRequest::new("cov").with_components(vec!["a", "a"]);
        assert_eq!(req.components(), ["a", "a"]);
    }

    #[test]
    fn test_interpolation_reset_keeps_position() {
        let req = GetCoverageRequest::new("cov")
            .with_interpolation("Long", Some("linear"), Some(10))
            .with_interpolation("Lat", Some("linear"), Some(20))
            .with_interpolation("Long", Some("nearest"), None);

        let axes: Vec<_> = req.interpolation().iter().map(|i| i.axis.as_str()).collect();
        assert_eq!(axes, ["Long", "Lat"]);
        assert_eq!(req.interpolation()[0].method.as_deref(), Some("nearest"));
        assert_eq!(req.interpolation()[0].sample_size, None);
    }

    #[test]
    fn test_one_dimension_per_axis() {
        let req = GetCoverageRequest::new("cov")
            .with_dimension(Axis::Level, Dimension::slice("100m"))
            .with_dimension(Axis::Level, Dimension::trim("100m", "200m"));
        assert_eq!(
            req.dimension(Axis::Level),
            Some(&Dimension::trim("100m", "200m"))
        );
    }

    #[test]
    fn test_missing_coverage_id_is_rejected() {
        let err = GetCoverageRequest::default().to_xml().unwrap_err();
        assert!(matches!(err, WcsError::MissingParameter("coverage_id")));
    }

    #[test]
    fn test_save_xml_writes_rendered_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.xml");
        let req = GetCoverageRequest::new("cov").with_components(["a"]);

        req.save_xml(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), req.to_xml().unwrap());
    }
}
