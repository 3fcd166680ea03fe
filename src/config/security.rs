use std::env;

use axum::http::header::{HeaderName, HeaderValue, STRICT_TRANSPORT_SECURITY};
use tower_http::set_header::SetResponseHeaderLayer;

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Static security headers applied to every response. HSTS is only added in
/// production, where the service is expected to sit behind TLS.
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
];

pub fn security_header_layers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    let mut layers: Vec<SetResponseHeaderLayer<HeaderValue>> = STATIC_HEADERS
        .iter()
        .map(|(name, value)| {
            SetResponseHeaderLayer::overriding(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect();

    if hsts_enabled() {
        tracing::info!("Security: HSTS header enabled (production mode)");
        layers.push(SetResponseHeaderLayer::overriding(
            STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        ));
    }

    layers
}

fn hsts_enabled() -> bool {
    env::var("RUST_ENV")
        .map(|v| v.to_lowercase() == "production")
        .unwrap_or(false)
}

/// Fold the header layers onto a router; `SetResponseHeaderLayer` is one
/// layer per header, so they are applied in sequence.
pub fn apply_security_headers(
    router: axum::Router,
    layers: Vec<SetResponseHeaderLayer<HeaderValue>>,
) -> axum::Router {
    layers.into_iter().fold(router, |r, layer| r.layer(layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_headers_are_valid() {
        for (name, value) in STATIC_HEADERS {
            assert!(HeaderName::from_bytes(name.as_bytes()).is_ok());
            assert!(HeaderValue::from_str(value).is_ok());
        }
    }

    #[test]
    fn hsts_defaults_off_outside_production() {
        std::env::remove_var("RUST_ENV");
        assert!(!hsts_enabled());
    }
}
