//! Readers turning WCS XML responses into [`crate::coverage`] holders.

pub mod wcs1;
pub mod wcs2;
pub mod xml;

use crate::error::{WcsError, WcsResult};

/// Parses whitespace separated numbers, e.g. `"-10.5 50"`.
pub(crate) fn parse_position(text: &str) -> WcsResult<Vec<f64>> {
    text.split_whitespace()
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| WcsError::malformed(format!("{:?} is not a number", v)))
        })
        .collect()
}

/// Builds `[x-min, y-min, x-max, y-max]` from two corner positions.
pub(crate) fn bbox_from_corners(lower: &str, upper: &str) -> WcsResult<[f64; 4]> {
    let lower = parse_position(lower)?;
    let upper = parse_position(upper)?;
    match (lower.as_slice(), upper.as_slice()) {
        ([x0, y0, ..], [x1, y1, ..]) => Ok([*x0, *y0, *x1, *y1]),
        _ => Err(WcsError::malformed(
            "bounding box corners need two values each",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_corners() {
        assert_eq!(
            bbox_from_corners("-10.5 50", " 2 60.25 ").unwrap(),
            [-10.5, 50.0, 2.0, 60.25]
        );
        assert!(bbox_from_corners("-10.5", "2 60").is_err());
        assert!(bbox_from_corners("a b", "2 60").is_err());
    }
}
