// crates/moneta-mock/src/validate.rs
// ============================================================================
// Module: Request Validator
// Description: Ordered precondition chains applied before any responder runs.
// Purpose: Map missing transport/auth context and malformed bodies to statuses.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! Every mock endpoint applies an ordered [`ValidatorChain`]. The chain
//! short-circuits at the first failing check and that check's status code is
//! what the caller sees. Checks inspect presence and shape only, never
//! credential validity: the mock exists to test request construction and
//! response parsing on the connector side.
//! Invariants:
//! - Evaluation is a pure function of the request context.
//! - Missing transport headers map to 500, missing auth context to 401,
//!   malformed search payloads to 400.

use axum::http::StatusCode;

use crate::context::RequestContext;

// ============================================================================
// SECTION: Header Names
// ============================================================================

/// Channel-identifier header the partner API requires on every call.
pub const CHANNEL_HEADER: &str = "channeluuid";

/// Device-identifier header the partner API requires on every call.
pub const DEVICE_HEADER: &str = "device";

/// Authorization header carrying the session token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Session/account-context header scoping transaction queries.
pub const ACCOUNT_CONTEXT_HEADER: &str = "x-account-context";

// ============================================================================
// SECTION: Checks
// ============================================================================

/// One precondition in a validator chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// `channeluuid` header must be present.
    ChannelHeader,
    /// `device` header must be present.
    DeviceHeader,
    /// `authorization` header must be present.
    AuthorizationHeader,
    /// `x-account-context` header must be present.
    AccountContextHeader,
    /// Body must parse as JSON and carry both date-range fields.
    DateRangeBody,
}

impl Check {
    /// Evaluates this check against a request context.
    #[must_use]
    pub fn evaluate(self, ctx: &RequestContext) -> Outcome {
        match self {
            Self::ChannelHeader => presence(ctx, CHANNEL_HEADER, StatusCode::INTERNAL_SERVER_ERROR),
            Self::DeviceHeader => presence(ctx, DEVICE_HEADER, StatusCode::INTERNAL_SERVER_ERROR),
            Self::AuthorizationHeader => {
                presence(ctx, AUTHORIZATION_HEADER, StatusCode::UNAUTHORIZED)
            }
            Self::AccountContextHeader => {
                presence(ctx, ACCOUNT_CONTEXT_HEADER, StatusCode::UNAUTHORIZED)
            }
            Self::DateRangeBody => date_range_body(ctx),
        }
    }
}

/// Result of evaluating a check or a whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// All checks passed; the responder may run.
    Pass,
    /// A check failed; respond with `status` and skip the responder.
    Fail {
        /// HTTP status the failure maps to.
        status: StatusCode,
        /// Human-readable reason, for test diagnostics only.
        reason: String,
    },
}

fn presence(ctx: &RequestContext, header: &str, status: StatusCode) -> Outcome {
    if ctx.has_header(header) {
        Outcome::Pass
    } else {
        Outcome::Fail {
            status,
            reason: format!("missing {header} header"),
        }
    }
}

fn date_range_body(ctx: &RequestContext) -> Outcome {
    let well_formed = ctx.json().is_some_and(|body| {
        body.get("valueDateFrom").is_some() && body.get("valueDateTo").is_some()
    });
    if well_formed {
        Outcome::Pass
    } else {
        Outcome::Fail {
            status: StatusCode::BAD_REQUEST,
            reason: "body must be JSON with valueDateFrom and valueDateTo".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Chains
// ============================================================================

/// Ordered sequence of checks, short-circuiting on first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorChain {
    /// Checks in evaluation order.
    checks: Vec<Check>,
}

impl ValidatorChain {
    /// Chain for public login endpoints: transport headers only.
    #[must_use]
    pub fn public_login() -> Self {
        Self {
            checks: vec![Check::ChannelHeader, Check::DeviceHeader],
        }
    }

    /// Chain for authenticated endpoints that are not account-scoped.
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            checks: vec![Check::ChannelHeader, Check::DeviceHeader, Check::AuthorizationHeader],
        }
    }

    /// Chain for account-scoped transaction endpoints.
    #[must_use]
    pub fn transactional() -> Self {
        Self {
            checks: vec![
                Check::ChannelHeader,
                Check::DeviceHeader,
                Check::AuthorizationHeader,
                Check::AccountContextHeader,
            ],
        }
    }

    /// Chain for the transaction search endpoint: account scope plus a
    /// shape-checked date-range body.
    #[must_use]
    pub fn transactional_search() -> Self {
        Self {
            checks: vec![
                Check::ChannelHeader,
                Check::DeviceHeader,
                Check::AuthorizationHeader,
                Check::AccountContextHeader,
                Check::DateRangeBody,
            ],
        }
    }

    /// Evaluates the chain, stopping at the first failing check.
    #[must_use]
    pub fn evaluate(&self, ctx: &RequestContext) -> Outcome {
        for check in &self.checks {
            match check.evaluate(ctx) {
                Outcome::Pass => {}
                fail @ Outcome::Fail { .. } => return fail,
            }
        }
        Outcome::Pass
    }
}
