//! Route handlers
//!
//! All HTTP request handlers organized by resource.

pub mod auth;
pub mod bans;
pub mod boards;
pub mod health;
pub mod posts;
pub mod threads;
pub mod users;
