//! Poster details taken from the connection and proxy headers

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use board_service::dto::PosterInfo;

/// First entry is the original client when running behind a reverse proxy
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
/// Two-letter country code set by the CDN
pub const COUNTRY_HEADER: &str = "cf-ipcountry";

const UNKNOWN_IP: &str = "0.0.0.0";

#[derive(Debug, Clone)]
pub struct ClientInfo(pub PosterInfo);

impl ClientInfo {
    pub fn ip(&self) -> &str {
        &self.0.ip
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let forwarded = header(FORWARDED_FOR_HEADER)
            .and_then(|v| v.split(',').next())
            .map(|ip| ip.trim().to_string());
        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        Ok(ClientInfo(PosterInfo {
            ip,
            country_code: header(COUNTRY_HEADER).map(str::to_string),
        }))
    }
}
