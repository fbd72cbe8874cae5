//! Validation and normalisation of user supplied request parameters.
//!
//! WCS request arguments arrive in loose forms: grid sizes as integers,
//! floats or strings, dates in whatever notation the caller prefers. The
//! helpers here accept those forms and either normalise them into the text
//! a WCS server expects or fail with [`WcsError::InvalidArgument`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;

use crate::error::{WcsError, WcsResult};

/// A single loosely-typed parameter value.
///
/// The text form (see the `Display` impl) is what ends up in requests:
/// integers in decimal, text verbatim, and floats with the shortest digits
/// that round-trip, keeping a trailing `.0` on integral values (`10.0`).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value, if this scalar is a number or numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Scalar::Text(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => f.write_str(&format_float(*v)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(v.into())
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<&String> for Scalar {
    fn from(v: &String) -> Self {
        Scalar::Text(v.clone())
    }
}

/// Either a single point or a range of values for one request axis.
///
/// Used for elevation and time arguments, where a point becomes a slice and
/// a two-value range becomes a trim.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Point(Scalar),
    Range(Vec<Scalar>),
}

impl From<Scalar> for Selection {
    fn from(v: Scalar) -> Self {
        Selection::Point(v)
    }
}

impl From<&str> for Selection {
    fn from(v: &str) -> Self {
        Selection::Point(v.into())
    }
}

impl From<String> for Selection {
    fn from(v: String) -> Self {
        Selection::Point(v.into())
    }
}

impl From<i64> for Selection {
    fn from(v: i64) -> Self {
        Selection::Point(v.into())
    }
}

impl From<i32> for Selection {
    fn from(v: i32) -> Self {
        Selection::Point(v.into())
    }
}

impl From<f64> for Selection {
    fn from(v: f64) -> Self {
        Selection::Point(v.into())
    }
}

impl<T: Into<Scalar>> From<[T; 2]> for Selection {
    fn from(v: [T; 2]) -> Self {
        Selection::Range(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Selection {
    fn from(v: Vec<T>) -> Self {
        Selection::Range(v.into_iter().map(Into::into).collect())
    }
}

/// Check a forecast offset (e.g. `PT36H`) is given as text.
///
/// The ISO-8601 duration grammar itself is not checked.
pub fn check_dim_forecast(dim_forecast: &Scalar) -> WcsResult<()> {
    if !dim_forecast.is_text() {
        return Err(WcsError::invalid("dim_forecast must be given as a string."));
    }
    Ok(())
}

/// Number of grid points, from an integer, integral float or integer text.
pub fn sort_grid_num(grid_num: &Scalar) -> WcsResult<i64> {
    let err = || WcsError::invalid("width/height values must be integer like.");
    match grid_num {
        Scalar::Int(v) => Ok(*v),
        Scalar::Float(v) => {
            // 2^63 itself is out of range, hence the half-open interval.
            if v.fract() != 0.0 || !(i64::MIN as f64..i64::MAX as f64).contains(v) {
                return Err(err());
            }
            Ok(*v as i64)
        }
        Scalar::Text(s) => s.trim().parse::<i64>().map_err(|_| err()),
    }
}

/// Size of a grid box, from anything convertible to a float.
pub fn sort_grid_size(grid_size: &Scalar) -> WcsResult<f64> {
    grid_size
        .as_f64()
        .ok_or_else(|| WcsError::invalid("resx/resy values must be float like."))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H%M",
    "%Y%m%dT%H%M%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

// Month-first is tried before day-first, so `1/2/2015` is 2 January.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%Y-%b-%d",
    "%d %B %Y",
    "%B %d %Y",
    "%Y %B %d",
];

// Two-digit years, tried only once every four-digit layout has failed.
const SHORT_YEAR_DATE_FORMATS: &[&str] = &[
    "%m/%d/%y", "%d/%m/%y", "%m-%d-%y", "%d-%m-%y", "%d.%m.%y", "%d-%b-%y", "%d %B %y",
    "%B %d %y",
];

const NUMERIC_FIELDS: &[&str] = &["%Y", "%y", "%m", "%d", "%H", "%M", "%S"];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "mon", "tue",
    "wed", "thu", "fri", "sat", "sun",
];

/// Normalise a loosely formatted date/time into `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Accepts ISO forms (`2015-04-21T`, `2015-04-21T06:00:00+01:00`), slash
/// forms (`21/4/2015`, `1/2/15`) and written forms (`21st April 2015`,
/// `21-Apr-2015`). Two-digit years map to 1969-2068. Any timezone is
/// dropped and the wall-clock time kept.
pub fn sort_time(time: &str) -> WcsResult<String> {
    let parsed = parse_datetime(time)
        .ok_or_else(|| WcsError::invalid(format!("Invalid time argument given: {}", time)))?;
    Ok(parsed.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    let cleaned = clean_time_text(text);

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            if fits_layout(&cleaned, fmt, dt.year()) {
                return Some(dt);
            }
        }
    }

    if let Some(dt) = parse_date_and_hour(&cleaned) {
        return Some(dt);
    }

    for fmt in DATE_FORMATS.iter().chain(SHORT_YEAR_DATE_FORMATS) {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            if fits_layout(&cleaned, fmt, date.year()) {
                return date.and_hms_opt(0, 0, 0);
            }
        }
    }

    None
}

/// `2015-04-21T06`: chrono wants minutes whenever an hour is parsed.
fn parse_date_and_hour(text: &str) -> Option<NaiveDateTime> {
    let (date, rest) = NaiveDate::parse_and_remainder(text, "%Y-%m-%d").ok()?;
    let hour = rest.strip_prefix(['T', ' '])?;
    if hour.is_empty() || hour.len() > 2 || !hour.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if date.year() < 100 {
        return None;
    }
    date.and_hms_opt(hour.parse().ok()?, 0, 0)
}

/// chrono reads every numeric field with as few digits as it finds, so `%Y`
/// takes `15` as year 15 and `%d %Y` splits `2015` into day and year. A
/// match only counts when its digit groups line up with the layout and a
/// `%Y` year is written out in full.
fn fits_layout(text: &str, fmt: &str, year: i32) -> bool {
    if fmt.contains("%Y") && year < 100 {
        return false;
    }
    let shape = NUMERIC_FIELDS
        .iter()
        .fold(fmt.replace("%.f", ""), |shape, field| shape.replace(field, "0"));
    let expected = digit_groups(&shape);
    let found = digit_groups(text);
    found == expected || (fmt.contains("%.f") && found == expected + 1)
}

fn digit_groups(text: &str) -> usize {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|group| !group.is_empty())
        .count()
}

fn clean_time_text(text: &str) -> String {
    let text = text.trim_end_matches(['Z', 'z']).trim_end_matches('T');
    text.replace(',', " ")
        .split_whitespace()
        .filter(|token| !WEEKDAYS.contains(&token.to_ascii_lowercase().as_str()))
        .map(strip_ordinal)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_ordinal(token: &str) -> &str {
    let lower = token.to_ascii_lowercase();
    for suffix in ["st", "nd", "rd", "th"] {
        if lower.ends_with(suffix) {
            let digits = &token[..token.len() - suffix.len()];
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return digits;
            }
        }
    }
    token
}

/// Check a bounding box is `[x-min, y-min, x-max, y-max]` with min <= max.
pub fn check_bbox(bbox: &[Scalar]) -> WcsResult<[f64; 4]> {
    if bbox.len() != 4 {
        return Err(WcsError::invalid(format!(
            "bbox must contain 4 values, {} found.",
            bbox.len()
        )));
    }

    let mut values = [0.0f64; 4];
    for (slot, val) in values.iter_mut().zip(bbox) {
        *slot = val
            .as_f64()
            .ok_or_else(|| WcsError::invalid("All bbox values must be numbers."))?;
    }

    if values[0] > values[2] || values[1] > values[3] {
        return Err(WcsError::invalid(
            "bbox min value larger than max. Format must be [x-min, y-min, x-max, y-max]",
        ));
    }
    Ok(values)
}

/// Comma-joined bbox, each value in its own text form.
pub fn sort_bbox(bbox: &[Scalar]) -> String {
    bbox.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_forecast_must_be_text() {
        assert!(check_dim_forecast(&"PT36H".into()).is_ok());
        assert!(matches!(
            check_dim_forecast(&Scalar::Int(36)),
            Err(WcsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sort_grid_num() {
        assert_eq!(sort_grid_num(&Scalar::Int(10)).unwrap(), 10);
        assert_eq!(sort_grid_num(&Scalar::Float(10.0)).unwrap(), 10);
        assert_eq!(sort_grid_num(&"10".into()).unwrap(), 10);
        assert!(matches!(
            sort_grid_num(&Scalar::Float(10.5)),
            Err(WcsError::InvalidArgument(_))
        ));
        assert!(sort_grid_num(&"ten".into()).is_err());
        assert!(sort_grid_num(&"10.0".into()).is_err());
    }

    #[test]
    fn test_sort_grid_num_rejects_out_of_range_floats() {
        assert!(matches!(
            sort_grid_num(&Scalar::Float(1e20)),
            Err(WcsError::InvalidArgument(_))
        ));
        assert!(sort_grid_num(&Scalar::Float(-1e20)).is_err());
        assert!(sort_grid_num(&Scalar::Float(i64::MAX as f64)).is_err());
        assert!(sort_grid_num(&Scalar::Float(f64::NAN)).is_err());
        assert!(sort_grid_num(&Scalar::Float(f64::INFINITY)).is_err());
        assert_eq!(sort_grid_num(&Scalar::Float(-4.0)).unwrap(), -4);
    }

    #[test]
    fn test_sort_grid_size() {
        assert_eq!(sort_grid_size(&"0.5".into()).unwrap(), 0.5);
        assert_eq!(sort_grid_size(&Scalar::Int(2)).unwrap(), 2.0);
        assert!(sort_grid_size(&"half".into()).is_err());
    }

    #[test]
    fn test_sort_time_formats_agree() {
        let expected = "2015-04-21T00:00:00Z";
        assert_eq!(sort_time("21/4/2015").unwrap(), expected);
        assert_eq!(sort_time("21st April 2015").unwrap(), expected);
        assert_eq!(sort_time("2015-04-21T").unwrap(), expected);
        assert_eq!(sort_time("2015-04-21").unwrap(), expected);
        assert_eq!(sort_time("Tuesday, April 21st 2015").unwrap(), expected);
    }

    #[test]
    fn test_sort_time_keeps_time_and_drops_zone() {
        assert_eq!(
            sort_time("2015-04-21T06:30:00Z").unwrap(),
            "2015-04-21T06:30:00Z"
        );
        assert_eq!(
            sort_time("2015-04-21T06:30:00+01:00").unwrap(),
            "2015-04-21T06:30:00Z"
        );
        assert_eq!(sort_time("2015-04-21 18:00").unwrap(), "2015-04-21T18:00:00Z");
    }

    #[test]
    fn test_sort_time_is_month_first_when_ambiguous() {
        assert_eq!(sort_time("1/2/2015").unwrap(), "2015-01-02T00:00:00Z");
    }

    #[test]
    fn test_sort_time_expands_two_digit_years() {
        assert_eq!(sort_time("1/2/15").unwrap(), "2015-01-02T00:00:00Z");
        assert_eq!(sort_time("21/4/15").unwrap(), "2015-04-21T00:00:00Z");
        assert_eq!(sort_time("21 April 15").unwrap(), "2015-04-21T00:00:00Z");
        assert_eq!(sort_time("21-Apr-99").unwrap(), "1999-04-21T00:00:00Z");
    }

    #[test]
    fn test_sort_time_needs_a_full_date() {
        assert!(matches!(
            sort_time("April 2015"),
            Err(WcsError::InvalidArgument(_))
        ));
        assert!(sort_time("2015").is_err());
    }

    #[test]
    fn test_sort_time_hour_only_and_abbreviated_months() {
        assert_eq!(sort_time("2015-04-21T06").unwrap(), "2015-04-21T06:00:00Z");
        assert_eq!(sort_time("2015-04-21T06Z").unwrap(), "2015-04-21T06:00:00Z");
        assert_eq!(sort_time("2015-04-21T0630").unwrap(), "2015-04-21T06:30:00Z");
        assert_eq!(sort_time("21-Apr-2015").unwrap(), "2015-04-21T00:00:00Z");
        assert_eq!(sort_time("2015-Apr-21").unwrap(), "2015-04-21T00:00:00Z");
        assert!(sort_time("2015-04-21T25").is_err());
    }

    #[test]
    fn test_sort_time_keeps_fractional_layouts() {
        assert_eq!(
            sort_time("2015-04-21 06:30:00.250").unwrap(),
            "2015-04-21T06:30:00Z"
        );
        assert_eq!(sort_time("20150421T063000").unwrap(), "2015-04-21T06:30:00Z");
        assert_eq!(sort_time("20150421").unwrap(), "2015-04-21T00:00:00Z");
    }

    #[test]
    fn test_sort_time_rejects_garbage() {
        assert!(matches!(
            sort_time("bad_date"),
            Err(WcsError::InvalidArgument(_))
        ));
        assert!(sort_time("").is_err());
    }

    #[test]
    fn test_check_bbox() {
        let good: Vec<Scalar> = vec!["1".into(), 2.2.into(), 3.into(), "4.4".into()];
        assert_eq!(check_bbox(&good).unwrap(), [1.0, 2.2, 3.0, 4.4]);

        let flipped: Vec<Scalar> = vec![10.into(), 20.into(), 1.into(), 2.into()];
        assert!(matches!(
            check_bbox(&flipped),
            Err(WcsError::InvalidArgument(_))
        ));

        let short: Vec<Scalar> = vec![1.into(), 2.into(), 3.into()];
        assert!(check_bbox(&short).is_err());

        let not_numbers: Vec<Scalar> = vec!["a".into(), 2.into(), 3.into(), 4.into()];
        assert!(check_bbox(&not_numbers).is_err());
    }

    #[test]
    fn test_sort_bbox_preserves_text_form() {
        let good: Vec<Scalar> = vec!["1".into(), 2.2.into(), 3.into(), "4.4".into()];
        assert_eq!(sort_bbox(&good), "1,2.2,3,4.4");
    }

    #[test]
    fn test_float_text_form() {
        assert_eq!(Scalar::Float(10.0).to_string(), "10.0");
        assert_eq!(Scalar::Float(-2.5).to_string(), "-2.5");
        assert_eq!(Scalar::Float(0.1).to_string(), "0.1");
    }

    #[test]
    fn test_selection_conversions() {
        assert_eq!(Selection::from("100m"), Selection::Point("100m".into()));
        assert_eq!(
            Selection::from(["100m", "200m"]),
            Selection::Range(vec!["100m".into(), "200m".into()])
        );
    }
}
