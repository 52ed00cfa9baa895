use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

fn parse_web_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}

/// Validate and normalise a Miniflux instance URL.
///
/// Accepts http(s) URLs with a host, including private addresses and
/// `localhost` since instances are commonly self-hosted. Trailing slashes
/// are removed so the stored value is stable.
///
/// ```
/// use termflux::util::validate_instance_url;
///
/// assert_eq!(
///     validate_instance_url("https://rss.example.com/").unwrap(),
///     "https://rss.example.com"
/// );
/// assert!(validate_instance_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_instance_url(url_str: &str) -> Result<String, UrlValidationError> {
    let url = parse_web_url(url_str)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Validate an entry link before handing it to the system browser.
///
/// Only http(s) is allowed so that feed content can't launch `file:` or
/// custom-scheme handlers.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_web_url(url_str)
}
