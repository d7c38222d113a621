// crates/moneta-mock/src/context.rs
// ============================================================================
// Module: Request Context
// Description: Per-request view over headers and body for mock handlers.
// Purpose: Give validator chains and responders one read-only request shape.
// Dependencies: axum, serde_json
// ============================================================================

//! ## Overview
//! [`RequestContext`] is created per inbound call and destroyed after the
//! response is written. Header lookup is case-insensitive and the JSON body
//! is parsed at most once, on first use.
//! Invariants:
//! - A context is never shared across requests.
//! - Parsing failures are observable as `None`, not as panics.

use std::sync::OnceLock;

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde_json::Value;

/// Read-only view over a single inbound mock request.
#[derive(Debug)]
pub struct RequestContext {
    /// Request headers; lookup is case-insensitive.
    headers: HeaderMap,
    /// Raw request body bytes.
    body: Bytes,
    /// Lazily parsed JSON body; `None` inner value means unparseable.
    parsed: OnceLock<Option<Value>>,
}

impl RequestContext {
    /// Builds a context from the pieces axum extracted.
    #[must_use]
    pub fn new(headers: HeaderMap, body: Bytes) -> Self {
        Self {
            headers,
            body,
            parsed: OnceLock::new(),
        }
    }

    /// Returns true when the named header is present, regardless of case.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Returns the header value as UTF-8 text, if present and valid.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body parsed as JSON, or `None` when it does not parse.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        self.parsed.get_or_init(|| serde_json::from_slice(&self.body).ok()).as_ref()
    }
}
