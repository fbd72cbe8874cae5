use crate::params::Scalar;

/// The axes a WCS 2.0.0 GetCoverage request can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Lat,
    Long,
    /// Vertical level, sent as `IsobaricSurface`.
    Level,
    /// Validity time, sent as `ValidityTime`.
    Time,
}

impl Axis {
    /// Serialization order inside `GetCoverage`.
    pub const ALL: [Axis; 4] = [Axis::Lat, Axis::Long, Axis::Level, Axis::Time];

    /// Name carried by the `wcs:Dimension` node for this axis.
    pub fn dimension_name(self) -> &'static str {
        match self {
            Axis::Lat => "lat",
            Axis::Long => "long",
            Axis::Level => "IsobaricSurface",
            Axis::Time => "ValidityTime",
        }
    }
}

/// One axis constraint: a single slice point or a low/high trim.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    Slice {
        value: Scalar,
        unit: Option<String>,
    },
    Trim {
        low: Scalar,
        high: Scalar,
        unit: Option<String>,
    },
}

impl Dimension {
    pub fn slice(value: impl Into<Scalar>) -> Self {
        Dimension::Slice {
            value: value.into(),
            unit: None,
        }
    }

    /// Range from `low` to `high`, kept in the order given.
    pub fn trim(low: impl Into<Scalar>, high: impl Into<Scalar>) -> Self {
        Dimension::Trim {
            low: low.into(),
            high: high.into(),
            unit: None,
        }
    }

    pub fn with_unit(self, unit: impl Into<String>) -> Self {
        let unit = Some(unit.into());
        match self {
            Dimension::Slice { value, .. } => Dimension::Slice { value, unit },
            Dimension::Trim { low, high, .. } => Dimension::Trim { low, high, unit },
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Dimension::Slice { unit, .. } | Dimension::Trim { unit, .. } => unit.as_deref(),
        }
    }

    pub fn is_trim(&self) -> bool {
        matches!(self, Dimension::Trim { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_names() {
        let names: Vec<_> = Axis::ALL.iter().map(|a| a.dimension_name()).collect();
        assert_eq!(names, ["lat", "long", "IsobaricSurface", "ValidityTime"]);
    }

    #[test]
    fn test_with_unit_keeps_values() {
        let dim = Dimension::trim("100", "200").with_unit("hPa");
        assert!(dim.is_trim());
        assert_eq!(dim.unit(), Some("hPa"));
        assert_eq!(
            dim,
            Dimension::Trim {
                low: "100".into(),
                high: "200".into(),
                unit: Some("hPa".to_string()),
            }
        );

        let slice = Dimension::slice(850).with_unit("hPa");
        assert!(!slice.is_trim());
        assert_eq!(slice.unit(), Some("hPa"));
    }
}
