use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::client::ClientConfig;

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    url: Option<String>,
    key: Option<String>,
    verify: Option<bool>,
}

pub(crate) fn load_config(
    url: Option<String>,
    key: Option<String>,
    verify: Option<bool>,
) -> Result<ClientConfig> {
    let url = url.or_else(|| std::env::var("WCS_URL").ok());
    let key = key.or_else(|| std::env::var("WCS_KEY").ok());
    resolve_config(url, key, verify, &rc_candidates())
}

/// Fills whatever the caller left unset from the first rc file that exists.
fn resolve_config(
    mut url: Option<String>,
    mut key: Option<String>,
    verify: Option<bool>,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig> {
    let mut file_verify: Option<bool> = None;

    if url.is_none() || key.is_none() || verify.is_none() {
        if let Some(rc_path) = rc_candidates.iter().find(|p| p.exists()) {
            let cfg = read_rc(rc_path).with_context(|| {
                format!("failed to read configuration file {}", rc_path.display())
            })?;
            tracing::debug!(path = %rc_path.display(), "loaded rc file");

            if url.is_none() {
                url = cfg.url;
            }
            if key.is_none() {
                key = cfg.key;
            }
            file_verify = cfg.verify;
        }
    }

    let Some(url) = url else {
        if rc_candidates.is_empty() {
            bail!("Missing configuration: url (set WCS_URL or create .wcsrc)");
        }
        bail!(
            "Missing configuration: url (set WCS_URL or put `url:` in one of: {})",
            rc_candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    };

    // Many coverage services are open, so a missing key is fine.
    let key = key.filter(|k| !k.trim().is_empty());
    let verify = verify.or(file_verify).unwrap_or(true);

    Ok(ClientConfig { url, key, verify })
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // `key:` may be alone on its line with the value on the next one.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            if !line.contains(':') {
                let v = strip_quotes(line).to_string();
                match pk {
                    "url" => cfg.url = Some(v),
                    "key" => cfg.key = Some(v),
                    _ => {}
                }
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let v = strip_quotes(v.trim());
            match k.trim() {
                "url" if v.is_empty() => pending_key = Some("url"),
                "url" => cfg.url = Some(v.to_string()),
                "key" if v.is_empty() => pending_key = Some("key"),
                "key" => cfg.key = Some(v.to_string()),
                "verify" if !v.is_empty() => cfg.verify = Some(v != "0"),
                _ => {}
            }
        }
    }

    cfg
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) WCS_RC (explicit)
    // 2) ./.wcsrc
    // 3) ~/.wcsrc
    if let Ok(p) = std::env::var("WCS_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".wcsrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".wcsrc"));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_rc() {
        let cfg = parse_rc(
            "# service\nurl: https://wcs.example.org/wcs\nkey:\n  \"abc123\"\nverify: 0\nother: x\n",
        );
        assert_eq!(
            cfg,
            RcConfig {
                url: Some("https://wcs.example.org/wcs".to_string()),
                key: Some("abc123".to_string()),
                verify: Some(false),
            }
        );
    }

    #[test]
    fn test_pending_value_abandoned_by_next_key() {
        let cfg = parse_rc("key:\nurl: 'https://a.example.org'\n");
        assert_eq!(cfg.key, None);
        assert_eq!(cfg.url.as_deref(), Some("https://a.example.org"));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("\"x\""), "x");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes(" x "), "x");
    }

    #[test]
    fn test_resolve_prefers_explicit_values() {
        let mut rc = tempfile::NamedTempFile::new().unwrap();
        writeln!(rc, "url: https://file.example.org\nkey: filekey\nverify: 0").unwrap();
        let candidates = vec![PathBuf::from("/nonexistent/.wcsrc"), rc.path().to_path_buf()];

        let cfg = resolve_config(Some("https://arg.example.org".into()), None, None, &candidates)
            .unwrap();
        assert_eq!(cfg.url, "https://arg.example.org");
        assert_eq!(cfg.key.as_deref(), Some("filekey"));
        assert!(!cfg.verify);

        let cfg = resolve_config(None, Some("argkey".into()), Some(true), &candidates).unwrap();
        assert_eq!(cfg.url, "https://file.example.org");
        assert_eq!(cfg.key.as_deref(), Some("argkey"));
        assert!(cfg.verify);
    }

    #[test]
    fn test_key_is_optional_but_url_is_not() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".wcsrc");
        std::fs::write(&rc, "url: https://open.example.org\n").unwrap();

        let cfg = resolve_config(None, None, None, &[rc]).unwrap();
        assert_eq!(cfg.key, None);
        assert!(cfg.verify);

        let err = resolve_config(None, None, None, &[dir.path().join("missing")]).unwrap_err();
        assert!(err.to_string().contains("Missing configuration: url"));
        assert!(resolve_config(None, None, None, &[]).is_err());
    }
}
