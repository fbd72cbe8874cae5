use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::builder::KvpParams;
use crate::client::{ClientConfig, WcsVersion};
use crate::error::format_http_error;
use crate::reader::xml::read_xml;
use crate::util::{ensure_parent_dir, is_xml_content_type};

/// Query parameters sent with every request.
#[derive(Debug, Serialize)]
struct BaseParams<'a> {
    #[serde(rename = "SERVICE")]
    service: &'static str,
    #[serde(rename = "VERSION")]
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
}

/// Sends requests to one WCS endpoint and checks the answers.
#[derive(Debug, Clone)]
pub(crate) struct Requester {
    url: String,
    version: WcsVersion,
    key: Option<String>,

    timeout: Duration,
    progress: bool,

    http: HttpClient,
}

impl Requester {
    pub(crate) fn new(cfg: ClientConfig, version: WcsVersion) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("webcoverageservice-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("webcoverageservice-rs")),
        );

        let mut builder = HttpClient::builder().default_headers(default_headers);
        if !cfg.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            url: cfg.url,
            version,
            key: cfg.key,
            timeout: Duration::from_secs(60),
            progress: true,
            http,
        })
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub(crate) fn set_progress(&mut self, progress: bool) {
        self.progress = progress;
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    fn base_params(&self) -> BaseParams<'_> {
        BaseParams {
            service: "WCS",
            version: self.version.as_str(),
            key: self.key.as_deref(),
        }
    }

    fn prepare(&self, req: RequestBuilder, params: &KvpParams) -> RequestBuilder {
        req.query(&self.base_params())
            .query(params)
            .timeout(self.timeout)
    }

    /// GET with `params` merged into the base parameters; the status is
    /// checked.
    pub(crate) fn get(&self, params: &KvpParams) -> Result<Response> {
        let request = params
            .iter()
            .find(|(k, _)| *k == "REQUEST")
            .map(|(_, v)| v.as_str())
            .unwrap_or("");
        tracing::debug!(url = %self.url, request, "sending GET");

        let resp = self
            .prepare(self.http.get(&self.url), params)
            .send()
            .with_context(|| format!("could not connect to {}", self.url))?;
        check_status(resp)
    }

    /// POST an XML document; the status is checked.
    pub(crate) fn post_xml(&self, payload: String) -> Result<Response> {
        tracing::debug!(url = %self.url, bytes = payload.len(), "sending POST");

        let resp = self
            .prepare(self.http.post(&self.url), &KvpParams::new())
            .header(CONTENT_TYPE, "application/xml")
            .body(payload)
            .send()
            .with_context(|| format!("could not connect to {}", self.url))?;
        check_status(resp)
    }

    /// Dummy request carrying only the base parameters, to test the key.
    pub(crate) fn validate_key(&self) -> Result<()> {
        self.get(&KvpParams::new())?;
        tracing::info!(url = %self.url, "API key accepted");
        Ok(())
    }

    pub(crate) fn download(&self, mut resp: Response, target: &Path) -> Result<PathBuf> {
        ensure_parent_dir(target)?;
        let mut out =
            File::create(target).with_context(|| format!("failed to open {}", target.display()))?;

        let pb = if self.progress {
            let pb = match resp.content_length() {
                Some(len) => ProgressBar::new(len),
                None => ProgressBar::new_spinner(),
            };
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bytes}/{total_bytes} ({bytes_per_sec}) {wide_bar} {eta}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            Some(pb)
        } else {
            None
        };

        let mut written: u64 = 0;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = resp.read(&mut buf).context("download interrupted")?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n])?;
            written += n as u64;
            if let Some(pb) = &pb {
                pb.inc(n as u64);
            }
        }
        out.flush()?;

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        if let Some(expected) = resp.content_length() {
            if written < expected {
                bail!(
                    "download failed: downloaded {} byte(s) out of {}",
                    written,
                    expected
                );
            }
        }

        tracing::info!(path = %target.display(), bytes = written, "coverage downloaded");
        Ok(target.to_path_buf())
    }
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    tracing::debug!(status = status.as_u16(), "response received");
    if !status.is_success() {
        return Err(format_http_error(status, resp.url().as_str()));
    }
    Ok(resp)
}

/// A coverage answer should be data. An XML body means the server sent an
/// exception report instead, or something unrecognised.
pub(crate) fn check_coverage_response(resp: Response) -> Result<Response> {
    if !is_xml_content_type(resp.headers()) {
        return Ok(resp);
    }

    let text = resp.text().context("failed to read response body")?;
    read_xml(&text)?;
    bail!(
        "GetCoverage returned an XML document instead of data, and it is not a recognised exception report. Here it is to look at:\n{}",
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester(key: Option<&str>) -> Requester {
        let cfg = ClientConfig {
            url: "https://wcs.example.org/service".to_string(),
            key: key.map(str::to_string),
            verify: true,
        };
        Requester::new(cfg, WcsVersion::V2_0_0).unwrap()
    }

    fn query_of(req: &Requester, params: &KvpParams) -> String {
        let built = req
            .prepare(req.http.get(req.url()), params)
            .build()
            .unwrap();
        built.url().query().unwrap_or("").to_string()
    }

    #[test]
    fn test_base_params_merge() {
        let req = requester(Some("secret"));
        let query = query_of(&req, &vec![("REQUEST", "GetCapabilities".to_string())]);
        assert_eq!(
            query,
            "SERVICE=WCS&VERSION=2.0.0&key=secret&REQUEST=GetCapabilities"
        );
    }

    #[test]
    fn test_key_is_omitted_when_unset() {
        let req = requester(None);
        assert_eq!(query_of(&req, &KvpParams::new()), "SERVICE=WCS&VERSION=2.0.0");
    }

    #[test]
    fn test_query_values_are_encoded() {
        let req = requester(None);
        let query = query_of(
            &req,
            &vec![("ReferenceTime", "2016-01-01T00:00:00Z".to_string())],
        );
        assert!(query.ends_with("ReferenceTime=2016-01-01T00%3A00%3A00Z"));
    }
}
