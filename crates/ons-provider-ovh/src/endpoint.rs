//! OVH API endpoints

use ons_core::{Error, Result};

/// Known endpoint aliases and their API base URLs
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("ovh-eu", "https://eu.api.ovh.com/1.0"),
    ("ovh-ca", "https://ca.api.ovh.com/1.0"),
    ("ovh-us", "https://api.us.ovhcloud.com/1.0"),
    ("kimsufi-eu", "https://eu.api.kimsufi.com/1.0"),
    ("kimsufi-ca", "https://ca.api.kimsufi.com/1.0"),
    ("soyoustart-eu", "https://eu.api.soyoustart.com/1.0"),
    ("soyoustart-ca", "https://ca.api.soyoustart.com/1.0"),
];

/// Resolve an endpoint alias or explicit URL to a base URL without a
/// trailing slash
pub fn resolve_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        return Ok(endpoint.trim_end_matches('/').to_string());
    }

    ENDPOINTS
        .iter()
        .find(|(alias, _)| *alias == endpoint)
        .map(|(_, url)| url.to_string())
        .ok_or_else(|| {
            let known: Vec<&str> = ENDPOINTS.iter().map(|(alias, _)| *alias).collect();
            Error::config(format!(
                "Unknown OVH endpoint '{}' (expected one of {} or an http(s) URL)",
                endpoint,
                known.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_api_roots() {
        assert_eq!(
            resolve_endpoint("ovh-eu").unwrap(),
            "https://eu.api.ovh.com/1.0"
        );
        assert_eq!(
            resolve_endpoint("soyoustart-ca").unwrap(),
            "https://ca.api.soyoustart.com/1.0"
        );
    }

    #[test]
    fn explicit_url_is_kept_without_trailing_slash() {
        assert_eq!(
            resolve_endpoint("http://127.0.0.1:8080/1.0/").unwrap(),
            "http://127.0.0.1:8080/1.0"
        );
    }

    #[test]
    fn unknown_alias_is_a_config_error() {
        let err = resolve_endpoint("ovh-mars").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("ovh-eu"));
    }
}
