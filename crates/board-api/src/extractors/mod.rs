//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, client details, posting forms,
//! and query strings.

mod auth;
mod client;
mod path;
mod posting;
mod query;
mod validated;

pub use auth::{AuthUser, OptionalAuthUser};
pub use client::{ClientInfo, COUNTRY_HEADER, FORWARDED_FOR_HEADER};
pub use path::{BanPath, BoardPostPath, BoardThreadPath};
pub use posting::PostingForm;
pub use query::{PageQuery, SinceQuery};
pub use validated::{JsonBody, OptionalValidatedJson, ValidatedJson};
