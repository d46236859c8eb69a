//! Target URL validation and normalization.

use crate::error_handling::InitializationError;

/// Maximum URL length (2048 characters), matching common server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Validates and normalizes the dispatcher's target URL.
///
/// Adds an `http://` prefix when no scheme is given (the server speaks plain
/// HTTP), then checks the URL parses, has a host, and uses http or https.
pub fn validate_target_url(url: &str) -> Result<String, InitializationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(InitializationError::InvalidUrlError(
            "empty URL".to_string(),
        ));
    }

    let normalized = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    if normalized.len() > MAX_URL_LENGTH {
        return Err(InitializationError::InvalidUrlError(format!(
            "URL exceeds maximum length ({} > {})",
            normalized.len(),
            MAX_URL_LENGTH
        )));
    }

    let parsed = url::Url::parse(&normalized)
        .map_err(|e| InitializationError::InvalidUrlError(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(normalized),
        "http" | "https" => Err(InitializationError::InvalidUrlError(format!(
            "{trimmed}: missing host"
        ))),
        other => Err(InitializationError::InvalidUrlError(format!(
            "{trimmed}: unsupported scheme '{other}'"
        ))),
    }
}
