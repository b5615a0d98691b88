// rate_limit_middleware.rs
//! Admission control: per-route named limits keyed by subject or address

use axum::{
    extract::{ConnectInfo, Extension, Request},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::TokenService;
use crate::common::{ApiError, AppState};
use crate::services::rate_limit::{
    NamedLimit, RateLimitDecision, AUTH_DELETE_LIMIT, AUTH_LOGIN_LIMIT, AUTH_REGISTER_LIMIT,
    DEFAULT_LIMIT, HEALTH_LIMIT, INTEREST_EXTRACT_LIMIT,
};

/// How the rate-limit key is derived for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Always the client address.
    Ip,
    /// The authenticated subject when a bearer token verifies; the client
    /// address otherwise. A failing or expired token is treated the same as
    /// no token for key purposes - the request is still rejected as
    /// unauthorized downstream.
    UserOrIp,
}

/// Route-level admission policy.
///
/// Registration, login, and health are keyed per-address; authenticated
/// routes follow the subject, so a subject's budget survives address
/// changes.
pub fn route_policy(method: &Method, path: &str) -> (NamedLimit, KeyStrategy) {
    match (method.as_str(), path) {
        ("GET", "/api/meta/health") => (HEALTH_LIMIT, KeyStrategy::Ip),
        ("POST", "/api/auth/register") => (AUTH_REGISTER_LIMIT, KeyStrategy::Ip),
        ("POST", "/api/auth/login") => (AUTH_LOGIN_LIMIT, KeyStrategy::Ip),
        ("DELETE", "/api/auth/me") => (AUTH_DELETE_LIMIT, KeyStrategy::UserOrIp),
        ("POST", "/api/interests/extract") => (INTEREST_EXTRACT_LIMIT, KeyStrategy::UserOrIp),
        _ => (DEFAULT_LIMIT, KeyStrategy::UserOrIp),
    }
}

/// Extract the client address from the request.
///
/// The right-most `X-Forwarded-For` hop is the one appended by the trusted
/// proxy in front of this service; earlier hops are caller-controlled.
pub fn extract_client_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(last_hop) = forwarded_str
                .split(',')
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .last()
            {
                return Some(last_hop.to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    connect_info.map(|info| info.0.ip().to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Derive the rate-limit key for a request.
pub fn rate_limit_key(
    headers: &HeaderMap,
    tokens: &TokenService,
    strategy: KeyStrategy,
    client_address: Option<&str>,
) -> String {
    if strategy == KeyStrategy::UserOrIp {
        if let Some(token) = bearer_token(headers) {
            if let Some(claims) = tokens.verify(token) {
                if !claims.sub.is_empty() {
                    return format!("user:{}", claims.sub);
                }
            }
        }
    }
    format!("ip:{}", client_address.unwrap_or("unknown"))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    Extension(state): Extension<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let headers = request.headers().clone();
    let path = request.uri().path().to_string();
    let (limit, strategy) = route_policy(request.method(), &path);

    let client_address = extract_client_address(&headers, connect_info.as_ref());
    let key = rate_limit_key(&headers, &state.tokens, strategy, client_address.as_deref());

    match state.rate_limit_service.check(&key, limit).await {
        RateLimitDecision::Allowed => {
            debug!(key = %key, limit = %limit.name, path = %path, "request admitted");
            Ok(next.run(request).await)
        }
        RateLimitDecision::Limited { retry_after } => {
            warn!(
                key = %key,
                limit = %limit.name,
                path = %path,
                retry_after = retry_after,
                "request rejected by rate limiter"
            );
            Err(ApiError::RateLimited { retry_after }.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn tokens() -> TokenService {
        TokenService::new("middleware-test-secret", 30)
    }

    #[test]
    fn takes_rightmost_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1"),
        );

        let address = extract_client_address(&headers, None);
        assert_eq!(address, Some("198.51.100.1".to_string()));
    }

    #[test]
    fn falls_back_to_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.1"));

        let address = extract_client_address(&headers, None);
        assert_eq!(address, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn key_uses_subject_for_valid_bearer_token() {
        let tokens = tokens();
        let token = tokens.issue("42").expect("issue");
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let key = rate_limit_key(&headers, &tokens, KeyStrategy::UserOrIp, Some("10.0.0.1"));
        assert_eq!(key, "user:42");
    }

    #[test]
    fn key_falls_back_to_address_for_invalid_token() {
        let tokens = tokens();
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer not-a-real-token"),
        );

        let key = rate_limit_key(&headers, &tokens, KeyStrategy::UserOrIp, Some("10.0.0.1"));
        assert_eq!(key, "ip:10.0.0.1");
    }

    #[test]
    fn key_falls_back_to_address_without_header() {
        let tokens = tokens();
        let headers = HeaderMap::new();

        let key = rate_limit_key(&headers, &tokens, KeyStrategy::UserOrIp, Some("10.0.0.1"));
        assert_eq!(key, "ip:10.0.0.1");
    }

    #[test]
    fn ip_strategy_ignores_valid_tokens() {
        // Login and registration budget by address even when the caller
        // presents a working token.
        let tokens = tokens();
        let token = tokens.issue("42").expect("issue");
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        let key = rate_limit_key(&headers, &tokens, KeyStrategy::Ip, Some("10.0.0.1"));
        assert_eq!(key, "ip:10.0.0.1");
    }

    #[test]
    fn routes_map_to_their_named_limits() {
        let (limit, strategy) = route_policy(&Method::GET, "/api/meta/health");
        assert_eq!(limit.name, "health");
        assert_eq!(strategy, KeyStrategy::Ip);

        let (limit, strategy) = route_policy(&Method::POST, "/api/auth/register");
        assert_eq!(limit.name, "auth_register");
        assert_eq!(strategy, KeyStrategy::Ip);

        let (limit, _) = route_policy(&Method::POST, "/api/auth/login");
        assert_eq!(limit.name, "auth_login");

        let (limit, strategy) = route_policy(&Method::DELETE, "/api/auth/me");
        assert_eq!(limit.name, "auth_delete");
        assert_eq!(strategy, KeyStrategy::UserOrIp);

        let (limit, _) = route_policy(&Method::POST, "/api/interests/extract");
        assert_eq!(limit.name, "interest_extract");

        let (limit, _) = route_policy(&Method::GET, "/api/auth/me");
        assert_eq!(limit.name, "default");
    }
}
