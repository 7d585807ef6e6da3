//! Origin checks that decide how a fetched response is exposed.
//!
//! - Same-origin responses are `basic`.
//! - Cross-origin `no-cors` responses are `opaque`.
//! - Cross-origin `cors` responses need a matching `Access-Control-Allow-Origin`.
//! - `same-origin` requests must not leave the origin.

use offgrid_core::{RequestMode, ResponseKind};
use url::Url;

/// Error type for origin policy violations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CorsError {
    #[error("cross-origin request in same-origin mode: {0}")]
    CrossOrigin(String),

    #[error("missing or mismatched Access-Control-Allow-Origin for {0}")]
    NotAllowed(String),
}

/// Check whether two URLs share scheme, host and port.
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Check a request URL before sending it.
pub fn check_request(origin: &Url, target: &Url, mode: RequestMode) -> Result<(), CorsError> {
    if mode == RequestMode::SameOrigin && !is_same_origin(origin, target) {
        return Err(CorsError::CrossOrigin(target.to_string()));
    }
    Ok(())
}

/// Decide the response kind for a response served from `response_url`.
pub fn response_kind(
    origin: &Url, response_url: &Url, mode: RequestMode, allow_origin: Option<&str>,
) -> Result<ResponseKind, CorsError> {
    if is_same_origin(origin, response_url) {
        return Ok(ResponseKind::Basic);
    }

    match mode {
        RequestMode::SameOrigin => Err(CorsError::CrossOrigin(response_url.to_string())),
        RequestMode::NoCors => Ok(ResponseKind::Opaque),
        RequestMode::Navigate => Ok(ResponseKind::Basic),
        RequestMode::Cors => {
            let expected = origin.origin().ascii_serialization();
            match allow_origin.map(str::trim) {
                Some("*") => Ok(ResponseKind::Cors),
                Some(value) if value == expected => Ok(ResponseKind::Cors),
                _ => Err(CorsError::NotAllowed(response_url.to_string())),
            }
        }
    }
}
