use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use std::path::Path;

/// True for `text/xml` or `application/xml`, ignoring any parameters.
pub(crate) fn is_xml_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let mime = v.split(';').next().unwrap_or(v).trim();
            mime.eq_ignore_ascii_case("text/xml") || mime.eq_ignore_ascii_case("application/xml")
        })
        .unwrap_or(false)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

pub(crate) fn save_text(path: &Path, text: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        h
    }

    #[test]
    fn test_is_xml_content_type() {
        assert!(is_xml_content_type(&headers("text/xml")));
        assert!(is_xml_content_type(&headers("text/xml; charset=UTF-8")));
        assert!(is_xml_content_type(&headers("application/xml")));
        assert!(!is_xml_content_type(&headers("application/x-netcdf")));
        assert!(!is_xml_content_type(&HeaderMap::new()));
    }

    #[test]
    fn test_save_text_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.xml");
        save_text(&path, "<a/>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<a/>");
    }
}
