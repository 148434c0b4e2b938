//! Input validation for `POST /api/v1/create/shorten` (§4.6).

use url::Url;
use urlshort_core::ApiError;

const MAX_URL_LEN: usize = 5000;

/// `original_url` must be a syntactically valid http/https URL, length <= 5000.
pub fn validate_original_url(raw: &str) -> Result<String, ApiError> {
    if raw.len() > MAX_URL_LEN {
        return Err(ApiError::InvalidInput(format!(
            "original_url exceeds {MAX_URL_LEN} characters"
        )));
    }
    let parsed = Url::parse(raw)
        .map_err(|e| ApiError::InvalidInput(format!("original_url is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidInput(
            "original_url must use http or https".to_string(),
        ));
    }
    Ok(raw.to_string())
}

/// `base` must be http/https with an optional port. Trailing `/` is
/// stripped; default ports (80/443) are omitted when the base is
/// synthesized from the incoming request's scheme/host/port.
pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ApiError::InvalidInput(format!("base_url is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::InvalidInput(
            "base_url must use http or https".to_string(),
        ));
    }
    let scheme = parsed.scheme();
    let host = parsed
        .host_str()
        .ok_or_else(|| ApiError::InvalidInput("base_url is missing a host".to_string()))?;
    let is_default_port = matches!(
        (scheme, parsed.port()),
        ("http", Some(80)) | ("https", Some(443)) | (_, None)
    );
    let base = if is_default_port {
        format!("{scheme}://{host}")
    } else {
        format!("{scheme}://{host}:{}", parsed.port().unwrap())
    };
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_https_url() {
        assert!(validate_original_url("https://example.com/a").is_ok());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(validate_original_url("ftp://example.com/a").is_err());
    }

    #[test]
    fn rejects_oversized_url() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LEN));
        assert!(validate_original_url(&long).is_err());
    }

    #[test]
    fn strips_trailing_slash_and_default_port() {
        assert_eq!(
            normalize_base_url("https://example.com:443/").unwrap(),
            "https://example.com"
        );
        assert_eq!(
            normalize_base_url("http://example.com:80").unwrap(),
            "http://example.com"
        );
    }

    #[test]
    fn keeps_non_default_port() {
        assert_eq!(
            normalize_base_url("http://localhost:8081").unwrap(),
            "http://localhost:8081"
        );
    }
}
