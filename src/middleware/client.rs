use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::{convert::Infallible, net::SocketAddr};

use crate::config::ServerConfig;

const UNKNOWN: &str = "unknown";

/// Caller address and user agent recorded on each verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

impl ClientInfo {
    /// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = header_str(headers, "x-real-ip")
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let ip_address = forwarded
            .or(real_ip)
            .map(str::to_string)
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let user_agent = header_str(headers, header::USER_AGENT.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();

        Self { ip_address, user_agent }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

/// Scheme and host verification links are built on.
///
/// `server.public_origin` wins; otherwise the forwarded or direct host of the request.
pub fn request_origin(server: &ServerConfig, headers: &HeaderMap) -> String {
    if let Some(origin) = &server.public_origin {
        return origin.trim_end_matches('/').to_string();
    }

    let scheme = header_str(headers, "x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or("http");
    let host = header_str(headers, "x-forwarded-host")
        .and_then(|v| v.split(',').next())
        .or_else(|| header_str(headers, header::HOST.as_str()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("localhost:{}", server.port));

    format!("{}://{}", scheme, host)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
