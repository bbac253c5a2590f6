//! Test fixtures and data generators
//!
//! The database is shared between runs, so labels and usernames carry a suffix that
//! does not repeat.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};

pub const STAFF_PASSWORD: &str = "correct horse battery";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    let micros = chrono::Utc::now().timestamp_micros().unsigned_abs() % 1_000_000_000_000;
    micros * 100 + COUNTER.fetch_add(1, Ordering::SeqCst) % 100
}

/// A board label that fits the 16 character limit
pub fn unique_label() -> String {
    format!("t{}", unique_suffix() % 1_000_000_000_000_000)
}

#[derive(Debug, Serialize)]
pub struct CreateBoardRequest {
    pub label: String,
    pub name: String,
}

impl CreateBoardRequest {
    pub fn unique() -> Self {
        Self {
            label: unique_label(),
            name: "Integration".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            username: format!("user{suffix}"),
            email: format!("user{suffix}@example.com"),
            password: "TestPass123!".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostCreated {
    pub board: String,
    pub thread_number: i64,
    pub post_number: i64,
    pub deletion_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadSummary {
    pub number: i64,
    pub subject: Option<String>,
    pub locked: bool,
    pub stickied: bool,
    pub reply_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ThreadPage {
    pub board: String,
    pub page: i64,
    pub threads: Vec<ThreadSummary>,
}

pub fn thread_form(subject: &str, body: &str) -> Form {
    Form::new()
        .text("subject", subject.to_string())
        .text("body", body.to_string())
}

pub fn reply_form(body: &str) -> Form {
    Form::new().text("body", body.to_string())
}

pub fn sage_form(body: &str) -> Form {
    reply_form(body).text("sage", "on")
}
