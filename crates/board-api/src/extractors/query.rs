//! Query string extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::response::ApiError;

/// `?page=N` for board listings, zero-based
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: i64,
}

/// `?since=N` for reply polling
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SinceQuery {
    #[serde(default)]
    pub since: i64,
}

macro_rules! query_extractor {
    ($ty:ty) => {
        #[async_trait]
        impl<S> FromRequestParts<S> for $ty
        where
            S: Send + Sync,
        {
            type Rejection = ApiError;

            async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
                let Query(query) = Query::<$ty>::from_request_parts(parts, state)
                    .await
                    .map_err(|e| ApiError::invalid_query(e.body_text()))?;
                Ok(query)
            }
        }
    };
}

query_extractor!(PageQuery);
query_extractor!(SinceQuery);
