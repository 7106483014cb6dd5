//! URL utilities for consistent endpoint construction
//!
//! Base URLs come from flags, the environment, or the config file and may
//! carry trailing slashes; endpoints are joined without doubling them.

use reqwest::Url;

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use dqchat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000///"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
///
/// # Examples
///
/// ```
/// use dqchat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000", "upload-data"),
///     "http://localhost:8000/upload-data"
/// );
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/health"),
///     "http://localhost:8000/health"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Build `<base>/tool/<name>` with the tool name percent-encoded as a
/// single path segment.
pub fn construct_tool_url(base_url: &str, tool_name: &str) -> Result<Url, String> {
    let mut url = Url::parse(&normalize_base_url(base_url)).map_err(|err| err.to_string())?;
    url.path_segments_mut()
        .map_err(|_| format!("base URL cannot carry a path: {base_url}"))?
        .pop_if_empty()
        .push("tool")
        .push(tool_name);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:8000/api"),
            "http://localhost:8000/api"
        );

        // Multiple trailing slashes - should all be removed
        assert_eq!(
            normalize_base_url("http://localhost:8000/api///"),
            "http://localhost:8000/api"
        );

        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("http://localhost:8000", "chat"),
            "http://localhost:8000/chat"
        );

        // Both base URL with trailing slash and endpoint with leading slash
        assert_eq!(
            construct_api_url("http://localhost:8000/api/", "/tools"),
            "http://localhost:8000/api/tools"
        );

        assert_eq!(
            construct_api_url("http://localhost:8000", "///health"),
            "http://localhost:8000/health"
        );
    }

    #[test]
    fn test_construct_tool_url() {
        assert_eq!(
            construct_tool_url("http://localhost:8000", "validate_data")
                .unwrap()
                .as_str(),
            "http://localhost:8000/tool/validate_data"
        );

        // Prefix paths survive, names are encoded
        assert_eq!(
            construct_tool_url("http://localhost:8000/agent/", "a/b c")
                .unwrap()
                .as_str(),
            "http://localhost:8000/agent/tool/a%2Fb%20c"
        );

        assert!(construct_tool_url("not a url", "x").is_err());
    }
}
