use anyhow::{Context, Result};
use reqwest::blocking::Response;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::builder::wcs2::{Components, GetCoverageParams};
use crate::builder::wcs1::Wcs1GetCoverageParams;
use crate::builder::{wcs1 as build1, wcs2 as build2};
use crate::config::load_config;
use crate::coverage::{Coverage, CoverageCollection, CoverageList};
use crate::reader::wcs2::Capabilities;
use crate::reader::{wcs1 as read1, wcs2 as read2};
use crate::sender::{Requester, check_coverage_response};
use crate::util::save_text;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service endpoint, e.g. `https://wcs.example.org/service`.
    pub url: String,
    /// API key, sent as the `key` query parameter. Open services need none.
    pub key: Option<String>,
    /// Whether to verify TLS certificates.
    pub verify: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WcsVersion {
    V1_0,
    V2_0_0,
}

impl WcsVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            WcsVersion::V1_0 => "1.0",
            WcsVersion::V2_0_0 => "2.0.0",
        }
    }
}

fn response_text(resp: Response, save_to: Option<&Path>) -> Result<String> {
    let text = resp.text().context("failed to read response body")?;
    if let Some(path) = save_to {
        save_text(path, &text)?;
    }
    Ok(text)
}

/// Client for WCS 1.0 services. All requests are key/value GETs.
#[derive(Debug, Clone)]
pub struct Wcs1Client {
    requester: Requester,
}

impl Wcs1Client {
    /// Creates a client using environment variables and/or `.wcsrc`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit `url`/`key` arguments
    /// - environment variables `WCS_URL` / `WCS_KEY`
    /// - config file from `WCS_RC` or `.wcsrc`
    pub fn new(url: Option<String>, key: Option<String>, verify: Option<bool>) -> Result<Self> {
        Self::from_config(load_config(url, key, verify)?)
    }

    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        Ok(Self {
            requester: Requester::new(cfg, WcsVersion::V1_0)?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.requester.set_timeout(timeout);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.requester.set_progress(progress);
        self
    }

    pub fn url(&self) -> &str {
        self.requester.url()
    }

    /// Sends a request carrying only the service parameters, failing if the
    /// server rejects the key.
    pub fn validate_key(&self) -> Result<()> {
        self.requester.validate_key()
    }

    /// Lists every coverage offered. The raw XML is written to `save_to`
    /// when given.
    pub fn get_capabilities(&self, save_to: Option<&Path>) -> Result<CoverageList> {
        let resp = self.requester.get(&build1::build_get_capabilities_req())?;
        let xml = response_text(resp, save_to)?;
        let coverages = read1::read_get_capabilities_res(&xml)?;
        tracing::info!(count = coverages.len(), "coverages listed");
        Ok(coverages)
    }

    pub fn describe_coverage(&self, coverage_id: &str, save_to: Option<&Path>) -> Result<Coverage> {
        let resp = self
            .requester
            .get(&build1::build_describe_coverage_req(coverage_id))?;
        let xml = response_text(resp, save_to)?;
        Ok(read1::read_describe_coverage_res(&xml)?)
    }

    /// Requests coverage data. The response is status-checked and an XML
    /// body is reported as an error.
    pub fn get_coverage(
        &self,
        coverage_id: &str,
        params: &Wcs1GetCoverageParams,
    ) -> Result<Response> {
        let query = build1::build_get_coverage_req(coverage_id, params)?;
        let resp = self.requester.get(&query)?;
        check_coverage_response(resp)
    }

    /// Like [`Wcs1Client::get_coverage`], streaming the data into `target`.
    pub fn download_coverage(
        &self,
        coverage_id: &str,
        params: &Wcs1GetCoverageParams,
        target: &Path,
    ) -> Result<PathBuf> {
        let resp = self.get_coverage(coverage_id, params)?;
        self.requester.download(resp, target)
    }
}

/// Client for WCS 2.0.0 services with the MetOcean profile.
///
/// DescribeCoverage and GetCoverage are sent as XML documents by POST; the
/// other operations are key/value GETs.
#[derive(Debug, Clone)]
pub struct Wcs2Client {
    requester: Requester,
}

impl Wcs2Client {
    pub fn from_env() -> Result<Self> {
        Self::new(None, None, None)
    }

    pub fn new(url: Option<String>, key: Option<String>, verify: Option<bool>) -> Result<Self> {
        Self::from_config(load_config(url, key, verify)?)
    }

    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        Ok(Self {
            requester: Requester::new(cfg, WcsVersion::V2_0_0)?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.requester.set_timeout(timeout);
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.requester.set_progress(progress);
        self
    }

    pub fn url(&self) -> &str {
        self.requester.url()
    }

    pub fn validate_key(&self) -> Result<()> {
        self.requester.validate_key()
    }

    fn capabilities_xml(&self, save_to: Option<&Path>) -> Result<String> {
        let resp = self.requester.get(&build2::build_get_capabilities_req())?;
        response_text(resp, save_to)
    }

    /// Ids of every coverage offered.
    pub fn get_capabilities(&self, save_to: Option<&Path>) -> Result<CoverageList> {
        let coverages = read2::read_get_capabilities_res(&self.capabilities_xml(save_to)?)?;
        tracing::info!(count = coverages.len(), "coverages listed");
        Ok(coverages)
    }

    /// Operations, service address, coverages and coverage collections.
    pub fn capabilities(&self, save_to: Option<&Path>) -> Result<Capabilities> {
        Ok(read2::read_capabilities(&self.capabilities_xml(save_to)?)?)
    }

    pub fn describe_coverage_collection(
        &self,
        collection_id: &str,
        ref_time: &str,
        save_to: Option<&Path>,
    ) -> Result<CoverageCollection> {
        let query = build2::build_describe_coverage_collection_req(collection_id, ref_time);
        let resp = self.requester.get(&query)?;
        let xml = response_text(resp, save_to)?;
        Ok(read2::read_describe_coverage_collection_res(&xml)?)
    }

    pub fn describe_coverage(&self, coverage_id: &str, save_to: Option<&Path>) -> Result<Coverage> {
        let payload = build2::build_describe_coverage_req(coverage_id)?;
        let resp = self.requester.post_xml(payload)?;
        let xml = response_text(resp, save_to)?;
        Ok(read2::read_describe_coverage_res(&xml)?)
    }

    /// Requests coverage data. The request document is written verbatim to
    /// `save_request` before sending when given.
    pub fn get_coverage(
        &self,
        coverage_id: &str,
        components: impl Into<Components>,
        params: &GetCoverageParams,
        save_request: Option<&Path>,
    ) -> Result<Response> {
        let payload = build2::build_get_coverage_req(coverage_id, components, params)?;
        if let Some(path) = save_request {
            save_text(path, &payload)?;
        }
        let resp = self.requester.post_xml(payload)?;
        check_coverage_response(resp)
    }

    pub fn download_coverage(
        &self,
        coverage_id: &str,
        components: impl Into<Components>,
        params: &GetCoverageParams,
        target: &Path,
    ) -> Result<PathBuf> {
        let resp = self.get_coverage(coverage_id, components, params, None)?;
        self.requester.download(resp, target)
    }
}
