//! WCS 2.0.0 response readers, including the MetOcean application profile
//! extensions (coverage collections, reference times).

use crate::coverage::{Coverage, CoverageCollection, CoverageList};
use crate::error::{WcsError, WcsResult};
use crate::reader::bbox_from_corners;
use crate::reader::xml::{Element, read_xml};

pub const OWS_NS: &str = "http://www.opengis.net/ows/2.0";
pub const WCS_NS: &str = "http://www.opengis.net/wcs/2.0";
pub const METOCEAN_NS: &str = "http://def.wmo.int/metce/2013/metocean";
pub const GML_NS: &str = "http://www.opengis.net/gml/3.2";
pub const GMLCOV_NS: &str = "http://www.opengis.net/gmlcov/1.0";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const OM_NS: &str = "http://www.opengis.net/om/2.0";

const OWS: Option<&str> = Some(OWS_NS);
const WCS: Option<&str> = Some(WCS_NS);
const METOCEAN: Option<&str> = Some(METOCEAN_NS);
const GML: Option<&str> = Some(GML_NS);
const GMLCOV: Option<&str> = Some(GMLCOV_NS);
const OM: Option<&str> = Some(OM_NS);

const COVERAGE_METADATA: &str = "extensionProperty/MetOceanCoverageMetadata";

/// Everything a GetCapabilities response says.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
    /// GET endpoint of the first listed operation.
    pub address: String,
    pub operations: Vec<String>,
    pub coverages: CoverageList,
    pub collections: Vec<CoverageCollection>,
}

fn envelope_bbox(elem: &Element) -> WcsResult<[f64; 4]> {
    let lower = elem.text_of("boundedBy/Envelope/lowerCorner", GML)?;
    let upper = elem.text_of("boundedBy/Envelope/upperCorner", GML)?;
    bbox_from_corners(&lower, &upper)
}

fn coverage_ids(elem: &Element) -> WcsResult<CoverageList> {
    Ok(elem
        .texts("CoverageSummary/CoverageId", WCS)?
        .into_iter()
        .map(Coverage::named)
        .collect())
}

fn operation_elements(root: &Element) -> WcsResult<Vec<&Element>> {
    Ok(root
        .find_one("OperationsMetadata", OWS)?
        .find_all("Operation", OWS))
}

fn read_address(root: &Element) -> WcsResult<String> {
    let operations = operation_elements(root)?;
    let Some(first) = operations.first() else {
        return Err(WcsError::malformed(
            "OperationsMetadata lists no operations",
        ));
    };
    let get = first.find_one("DCP/HTTP/Get", OWS)?;
    Ok(get.attr("href", Some(XLINK_NS))?.to_string())
}

fn read_operations(root: &Element) -> WcsResult<Vec<String>> {
    operation_elements(root)?
        .into_iter()
        .map(|op| op.attr("name", None).map(str::to_string))
        .collect()
}

fn read_collection_summaries(root: &Element) -> WcsResult<Vec<CoverageCollection>> {
    // Servers without the MetOcean profile have no Contents extension.
    if root.find_all("Contents/Extension", WCS).is_empty() {
        return Ok(Vec::new());
    }
    let extension = root.find_one("Contents/Extension", WCS)?;
    extension
        .find_all("CoverageCollectionSummary", METOCEAN)
        .into_iter()
        .map(|summary| -> WcsResult<CoverageCollection> {
            let reference = summary.find_one("referenceTimeList/ReferenceTime", METOCEAN)?;
            Ok(CoverageCollection {
                id: Some(summary.text_of("coverageCollectionId", METOCEAN)?),
                bbox: Some(envelope_bbox(summary)?),
                reference_times: Some(reference.texts("timePosition", GML)?),
                coverages: None,
            })
        })
        .collect()
}

/// Ids of every coverage offered.
pub fn read_get_capabilities_res(xml: &str) -> WcsResult<CoverageList> {
    let root = read_xml(xml)?;
    coverage_ids(root.find_one("Contents", WCS)?)
}

pub fn read_capabilities(xml: &str) -> WcsResult<Capabilities> {
    let root = read_xml(xml)?;
    Ok(Capabilities {
        address: read_address(&root)?,
        operations: read_operations(&root)?,
        coverages: coverage_ids(root.find_one("Contents", WCS)?)?,
        collections: read_collection_summaries(&root)?,
    })
}

pub fn read_describe_coverage_collection_res(xml: &str) -> WcsResult<CoverageCollection> {
    let root = read_xml(xml)?;
    let description = root.find_one("CoverageCollectionDescription", METOCEAN)?;
    let reference = description.find_one("referenceTime", METOCEAN)?;

    Ok(CoverageCollection {
        id: Some(description.text_of("coverageCollectionId", METOCEAN)?),
        bbox: Some(envelope_bbox(description)?),
        reference_times: Some(reference.texts("TimeInstant/timePosition", GML)?),
        coverages: Some(coverage_ids(
            description.find_one("coverageIdList", METOCEAN)?,
        )?),
    })
}

/// Name, range components, bounding box and model reference time (as
/// `dim_runs`) of the described coverage.
pub fn read_describe_coverage_res(xml: &str) -> WcsResult<Coverage> {
    let root = read_xml(xml)?;
    let description = root.find_one("CoverageDescription", WCS)?;
    let extension = description.find_one("metadata/Extension", GMLCOV)?;

    let components = extension
        .find_all(
            &format!(
                "{}/dataMaskReferenceProperty/DataMaskReferenceMemberList/dataMaskReference",
                COVERAGE_METADATA
            ),
            METOCEAN,
        )
        .into_iter()
        .map(|elem| elem.attr("fieldName", None).map(str::to_string))
        .collect::<WcsResult<Vec<_>>>()?;

    let observation = extension.find_one(
        &format!("{}/sourceObservationProperty/SourceObservation", COVERAGE_METADATA),
        METOCEAN,
    )?;
    let value = observation.find_one("parameter/NamedValue/value", OM)?;
    let reference_time = value.text_of("TimeInstant/timePosition", GML)?;

    Ok(Coverage {
        name: Some(description.text_of("CoverageId", WCS)?),
        components: Some(components),
        bbox: Some(envelope_bbox(description)?),
        dim_runs: Some(vec![reference_time]),
        ..Coverage::default()
    })
}
