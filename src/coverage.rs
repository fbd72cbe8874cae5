//! Holders for what a server says about its coverages.

use std::fmt;
use std::ops::{Add, Index, IndexMut};

use serde::Serialize;

use crate::params::format_float;

/// Appends a `*** TITLE ***` block; nothing when the value is unset.
fn push_block(out: &mut String, title: &str, value: Option<String>) {
    if let Some(value) = value {
        out.push_str(&format!("*** {} ***\n{}\n\n", title, value));
    }
}

fn lines(values: &Option<Vec<String>>) -> Option<String> {
    values.as_ref().map(|v| v.join("\n"))
}

fn one_line(bbox: &Option<[f64; 4]>) -> Option<String> {
    bbox.map(|b| {
        b.iter()
            .map(|v| format_float(*v))
            .collect::<Vec<_>>()
            .join(", ")
    })
}

/// Available data for one model variable, e.g. `UKPPBEST_High_cloud_cover`.
///
/// Which fields are filled depends on the response it was read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coverage {
    pub name: Option<String>,
    pub label: Option<String>,
    pub components: Option<Vec<String>>,
    /// `[x-min, y-min, x-max, y-max]`
    pub bbox: Option<[f64; 4]>,
    pub dim_runs: Option<Vec<String>>,
    pub dim_forecasts: Option<Vec<String>>,
    pub times: Option<Vec<String>>,
    pub elevations: Option<Vec<String>>,
    pub crss: Option<Vec<String>>,
    pub formats: Option<Vec<String>>,
    pub interpolations: Option<Vec<String>>,
}

impl Coverage {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Every set field as a `*** FIELD ***` block.
    pub fn info(&self) -> String {
        let mut out = String::new();
        push_block(&mut out, "NAME", self.name.clone());
        push_block(&mut out, "LABEL", self.label.clone());
        push_block(&mut out, "COMPONENTS", lines(&self.components));
        push_block(&mut out, "BBOX", one_line(&self.bbox));
        push_block(&mut out, "DIM_RUNS", lines(&self.dim_runs));
        push_block(&mut out, "DIM_FORECASTS", lines(&self.dim_forecasts));
        push_block(&mut out, "TIMES", lines(&self.times));
        push_block(&mut out, "ELEVATIONS", lines(&self.elevations));
        push_block(&mut out, "CRSS", lines(&self.crss));
        push_block(&mut out, "FORMATS", lines(&self.formats));
        push_block(&mut out, "INTERPOLATIONS", lines(&self.interpolations));
        out
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CoverageList(Vec<Coverage>);

impl CoverageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coverage> {
        self.0.iter()
    }

    pub fn push(&mut self, coverage: Coverage) {
        self.0.push(coverage);
    }

    pub fn remove(&mut self, index: usize) -> Coverage {
        self.0.remove(index)
    }

    /// Coverage names in list order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().filter_map(|c| c.name.as_deref()).collect()
    }
}

impl From<Vec<Coverage>> for CoverageList {
    fn from(coverages: Vec<Coverage>) -> Self {
        Self(coverages)
    }
}

impl From<Coverage> for CoverageList {
    fn from(coverage: Coverage) -> Self {
        Self(vec![coverage])
    }
}

impl FromIterator<Coverage> for CoverageList {
    fn from_iter<I: IntoIterator<Item = Coverage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Coverage> for CoverageList {
    fn extend<I: IntoIterator<Item = Coverage>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl Add for CoverageList {
    type Output = CoverageList;

    fn add(mut self, other: CoverageList) -> CoverageList {
        self.0.extend(other.0);
        self
    }
}

impl Index<usize> for CoverageList {
    type Output = Coverage;

    fn index(&self, index: usize) -> &Coverage {
        &self.0[index]
    }
}

impl IndexMut<usize> for CoverageList {
    fn index_mut(&mut self, index: usize) -> &mut Coverage {
        &mut self.0[index]
    }
}

impl IntoIterator for CoverageList {
    type Item = Coverage;
    type IntoIter = std::vec::IntoIter<Coverage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CoverageList {
    type Item = &'a Coverage;
    type IntoIter = std::slice::Iter<'a, Coverage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for CoverageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coverage) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", i, coverage)?;
        }
        Ok(())
    }
}

/// A set of coverages sharing one model run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageCollection {
    pub id: Option<String>,
    pub bbox: Option<[f64; 4]>,
    pub reference_times: Option<Vec<String>>,
    pub coverages: Option<CoverageList>,
}

impl CoverageCollection {
    pub fn info(&self) -> String {
        let mut out = String::new();
        push_block(&mut out, "ID", self.id.clone());
        push_block(&mut out, "BBOX", one_line(&self.bbox));
        push_block(&mut out, "REFERENCE_TIMES", lines(&self.reference_times));
        push_block(
            &mut out,
            "COVERAGES",
            self.coverages
                .as_ref()
                .map(|c| c.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("\n")),
        );
        out
    }
}

impl fmt::Display for CoverageCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_info_order_and_bbox_line() {
        let coverage = Coverage {
            name: Some("cloud".to_string()),
            bbox: Some([-10.0, 50.5, 2.0, 60.0]),
            times: Some(vec!["t1".to_string(), "t2".to_string()]),
            ..Coverage::default()
        };
        assert_eq!(
            coverage.info(),
            "*** NAME ***\ncloud\n\n*** BBOX ***\n-10.0, 50.5, 2.0, 60.0\n\n*** TIMES ***\nt1\nt2\n\n"
        );
        assert_eq!(coverage.to_string(), "cloud");
    }

    #[test]
    fn test_coverage_list() {
        let mut list: CoverageList = ["a", "b"].into_iter().map(Coverage::named).collect();
        list.extend([Coverage::named("c")]);
        let list = list + CoverageList::from(Coverage::named("d"));

        assert_eq!(list.len(), 4);
        assert_eq!(list[2].name.as_deref(), Some("c"));
        assert_eq!(list.names(), ["a", "b", "c", "d"]);
        assert_eq!(list.to_string(), "0: a\n1: b\n2: c\n3: d");
        assert_eq!(CoverageList::new().to_string(), "");
    }

    #[test]
    fn test_collection_info() {
        let collection = CoverageCollection {
            id: Some("mo-global".to_string()),
            reference_times: Some(vec!["2016-01-01T00:00:00Z".to_string()]),
            coverages: Some(vec![Coverage::named("x"), Coverage::named("y")].into()),
            ..CoverageCollection::default()
        };
        assert_eq!(
            collection.info(),
            "*** ID ***\nmo-global\n\n*** REFERENCE_TIMES ***\n2016-01-01T00:00:00Z\n\n*** COVERAGES ***\nx\ny\n\n"
        );
    }
}
