//! URL resolution for consistent store keys and fetch targets.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request URL against the application origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references (`./index.html`, `/api/data`) against `base`;
///    absolute URLs are kept
/// 3. Require http or https
/// 4. Lowercase the host
/// 5. Remove fragment (#...)
/// 6. Keep query string intact (do not reorder)
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:5000/").unwrap()
    }

    #[test]
    fn test_resolve_dot_relative() {
        let url = resolve(&origin(), "./index.html").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/index.html");
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&origin(), "./").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_resolve_absolute_path() {
        let url = resolve(&origin(), "/api/data").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/data");
    }

    #[test]
    fn test_resolve_keeps_absolute_url() {
        let url = resolve(&origin(), "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css").unwrap();
        assert_eq!(url.as_str(), "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css");
    }

    #[test]
    fn test_resolve_relative_and_absolute_agree() {
        let relative = resolve(&origin(), "./style.css").unwrap();
        let absolute = resolve(&origin(), "http://LOCALHOST:5000/style.css").unwrap();
        assert_eq!(relative, absolute);
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&origin(), "./index.html#plan").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/api/trip?city=jaipur&days=3").unwrap();
        assert_eq!(url.query(), Some("city=jaipur&days=3"));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&origin(), "chrome-extension://abc/script.js");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }
}
