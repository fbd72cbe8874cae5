use anyhow::anyhow;
use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias using [`WcsError`].
pub type WcsResult<T> = Result<T, WcsError>;

/// Errors raised while building requests or reading responses.
///
/// Transport failures are reported by the clients as `anyhow::Error`; a
/// `WcsError` raised underneath them can be recovered with `downcast_ref`.
#[derive(Debug, Error)]
pub enum WcsError {
    /// The caller supplied a malformed or contradictory value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required request field was left empty.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The server answered with an OWS exception report.
    #[error("WCS server returned an exception: {0}")]
    ExceptionReport(String),

    /// The response did not have the expected structure.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8 in generated XML: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl WcsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        WcsError::InvalidArgument(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        WcsError::MalformedResponse(message.into())
    }
}

pub(crate) fn format_http_error(status: StatusCode, url: &str) -> anyhow::Error {
    let url_message = format!("Here's the url that was sent:\n{}", url);

    if status == StatusCode::FORBIDDEN {
        // Usually a bad key, but the service also answers 403 while it is down.
        return anyhow!(
            "403 Error, request forbidden. This is likely due to an incorrect API key, but sometimes the service is temporarily down. If you know your key is fine, try again.\n{}",
            url_message
        );
    }

    if status == StatusCode::NOT_FOUND {
        return anyhow!("404 Error, server not found.\n{}", url_message);
    }

    anyhow!("HTTP {} Error\n{}", status.as_u16(), url_message)
}
