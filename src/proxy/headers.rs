//! Header construction for upstream requests and relayed responses.
//!
//! [`build_upstream_headers`] starts from an empty map, copies only the
//! allow-listed inbound headers (never hop-by-hop ones), sets the JSON
//! content type when a body is forwarded, and adds proxy metadata
//! (`X-Forwarded-For`, `Via`, `X-Correlation-Id`). [`relay_headers`]
//! builds the fixed header set returned to the caller.

use std::sync::LazyLock;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

pub const CORRELATION_ID: &str = "x-correlation-id";

const VIA: &str = "1.1 storefront-gateway";

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
        "host",
        "content-length",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

/// Headers that describe one connection hop (plus `host` and
/// `content-length`, which the client recomputes) and are never copied.
#[must_use]
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

#[derive(Debug, Clone, Copy)]
pub struct ForwardMeta<'a> {
    pub client_ip: &'a str,
    pub correlation_id: &'a str,
    pub proxy_headers: bool,
}

pub fn build_upstream_headers(
    original: &HeaderMap,
    allow: &[HeaderName],
    has_body: bool,
    meta: ForwardMeta<'_>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for name in allow {
        if is_hop_by_hop(name) {
            continue;
        }
        for value in original.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    if has_body {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }

    if meta.proxy_headers {
        // X-Forwarded-For: append to the inbound chain
        let xff = original
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map_or_else(
                || meta.client_ip.to_string(),
                |existing| format!("{existing}, {}", meta.client_ip),
            );
        if let Ok(val) = HeaderValue::from_str(&xff) {
            headers.insert("x-forwarded-for", val);
        }

        headers.insert(header::VIA, HeaderValue::from_static(VIA));
    }

    if let Ok(val) = HeaderValue::from_str(meta.correlation_id) {
        headers.insert(CORRELATION_ID, val);
    }

    headers
}

/// Headers on every relayed response: the JSON content type, whatever
/// the upstream declared, and the correlation id.
#[must_use]
pub fn relay_headers(correlation_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Ok(val) = HeaderValue::from_str(correlation_id) {
        headers.insert(CORRELATION_ID, val);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(proxy_headers: bool) -> ForwardMeta<'static> {
        ForwardMeta {
            client_ip: "10.0.0.1",
            correlation_id: "test-id",
            proxy_headers,
        }
    }

    fn names(list: &[&str]) -> Vec<HeaderName> {
        list.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[test]
    fn copies_only_allowed_headers() {
        let mut original = HeaderMap::new();
        original.insert("cookie", "session=abc".parse().unwrap());
        original.insert("authorization", "Bearer t".parse().unwrap());
        original.insert("user-agent", "test".parse().unwrap());

        let result = build_upstream_headers(&original, &names(&["cookie"]), false, meta(false));

        assert_eq!(result.get("cookie").unwrap(), "session=abc");
        assert!(result.get("authorization").is_none());
        assert!(result.get("user-agent").is_none());
    }

    #[test]
    fn never_copies_hop_by_hop() {
        let mut original = HeaderMap::new();
        original.insert("connection", "keep-alive".parse().unwrap());
        original.insert("host", "shop.example".parse().unwrap());

        let result = build_upstream_headers(
            &original,
            &names(&["connection", "host"]),
            false,
            meta(false),
        );

        assert!(result.get("connection").is_none());
        assert!(result.get("host").is_none());
    }

    #[test]
    fn sets_json_content_type_only_with_body() {
        let mut original = HeaderMap::new();
        original.insert("content-type", "text/plain".parse().unwrap());

        let with_body = build_upstream_headers(&original, &[], true, meta(false));
        assert_eq!(with_body.get("content-type").unwrap(), "application/json");

        let without_body = build_upstream_headers(&original, &[], false, meta(false));
        assert!(without_body.get("content-type").is_none());
    }

    #[test]
    fn appends_x_forwarded_for() {
        let mut original = HeaderMap::new();
        original.insert("x-forwarded-for", "1.2.3.4".parse().unwrap());

        let result = build_upstream_headers(&original, &[], false, meta(true));

        assert_eq!(result.get("x-forwarded-for").unwrap(), "1.2.3.4, 10.0.0.1");
        assert_eq!(result.get("via").unwrap(), VIA);
    }

    #[test]
    fn proxy_headers_can_be_disabled() {
        let result = build_upstream_headers(&HeaderMap::new(), &[], false, meta(false));
        assert!(result.get("x-forwarded-for").is_none());
        assert!(result.get("via").is_none());
        assert_eq!(result.get(CORRELATION_ID).unwrap(), "test-id");
    }

    #[test]
    fn relay_headers_force_json() {
        let headers = relay_headers("abc");
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get(CORRELATION_ID).unwrap(), "abc");
    }
}
