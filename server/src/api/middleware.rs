//! HTTP middleware (CORS, 404 handler)

use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::types::ApiError;
use crate::core::config::is_all_interfaces;

/// Allowed origins configuration
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Origins for the configured host and port plus the storefront dev
    /// server on the next port
    pub fn new(host: &str, port: u16) -> Self {
        let mut origins = Vec::new();
        let dev_port = port.saturating_add(1);
        let is_all = is_all_interfaces(host);

        let base_hosts: Vec<&str> = if is_all || host == "127.0.0.1" || host == "localhost" {
            vec!["localhost", "127.0.0.1"]
        } else {
            vec![host]
        };

        for h in &base_hosts {
            origins.push(format!("http://{}:{}", h, port));
            origins.push(format!("http://{}:{}", h, dev_port));
            origins.push(format!("http://{}", h));
        }

        if is_all && let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                origins.push(format!("http://{}:{}", ip, port));
                origins.push(format!("http://{}:{}", ip, dev_port));
            }
        }

        Self { origins }
    }

    /// Check if an origin is allowed
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer; the API is read-only
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
        ])
}

/// Unknown routes: `404 Not Found - <path>` as a JSON error
pub async fn handle_404(req: Request) -> ApiError {
    let uri = req.uri().to_string();
    tracing::debug!(method = %req.method(), %uri, "[404]");
    ApiError::not_found("NOT_FOUND", format!("Not Found - {}", uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_localhost() {
        let origins = AllowedOrigins::new("127.0.0.1", 5000);
        assert!(origins.is_allowed("http://localhost:5000"));
        assert!(origins.is_allowed("http://127.0.0.1:5001"));
        assert!(!origins.is_allowed("http://evil.example:5000"));
    }

    #[test]
    fn test_allowed_origins_specific_host() {
        let origins = AllowedOrigins::new("shop.internal", 8080);
        assert!(origins.is_allowed("http://shop.internal:8080"));
        assert!(origins.is_allowed("http://shop.internal"));
        assert!(!origins.is_allowed("http://localhost:8080"));
    }

    #[test]
    fn test_allowed_origins_max_port() {
        let origins = AllowedOrigins::new("localhost", u16::MAX);
        assert!(origins.is_allowed("http://localhost:65535"));
    }
}
