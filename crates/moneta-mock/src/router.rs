// crates/moneta-mock/src/router.rs
// ============================================================================
// Module: Endpoint Router
// Description: Static table binding paths to validator chains and responders.
// Purpose: Dispatch inbound requests without runtime type inspection.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! An [`EndpointTable`] is built once at server construction and is immutable
//! for the server's lifetime. Each registration pairs a path and method with
//! a validator chain and a responder; unmatched paths fall through to axum's
//! default 404.
//! Invariants:
//! - One registration per path.
//! - The chain runs before the responder; its first failure wins.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;

use crate::catalog::CannedResponse;
use crate::catalog::Responder;
use crate::context::RequestContext;
use crate::validate::Outcome;
use crate::validate::ValidatorChain;

// ============================================================================
// SECTION: Registrations
// ============================================================================

/// HTTP methods the mock endpoints speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
}

/// One path bound to a validator chain and a responder.
#[derive(Debug, Clone)]
pub struct EndpointRegistration {
    /// Request path, matched exactly.
    pub path: &'static str,
    /// Method the endpoint accepts.
    pub method: EndpointMethod,
    /// Preconditions applied before the responder runs.
    pub chain: ValidatorChain,
    /// Pure response generator for validated requests.
    pub respond: Responder,
}

impl EndpointRegistration {
    /// Builds a POST registration.
    #[must_use]
    pub fn post(path: &'static str, chain: ValidatorChain, respond: Responder) -> Self {
        Self {
            path,
            method: EndpointMethod::Post,
            chain,
            respond,
        }
    }
}

/// Immutable path-to-handler table for one mock server.
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    /// Registrations in declaration order.
    entries: Vec<EndpointRegistration>,
}

impl EndpointTable {
    /// Builds a table from registrations.
    #[must_use]
    pub fn new(entries: Vec<EndpointRegistration>) -> Self {
        Self {
            entries,
        }
    }

    /// Returns the registered paths, for diagnostics.
    #[must_use]
    pub fn paths(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.path).collect()
    }

    /// Converts the table into an axum router.
    #[must_use]
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        for entry in self.entries {
            let path = entry.path;
            let service = match entry.method {
                EndpointMethod::Get => get(dispatch).with_state(Arc::new(entry)),
                EndpointMethod::Post => post(dispatch).with_state(Arc::new(entry)),
            };
            router = router.route(path, service);
        }
        router
    }
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Runs the validator chain, then the responder, for one request.
async fn dispatch(
    State(entry): State<Arc<EndpointRegistration>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    use axum::response::IntoResponse;

    let ctx = RequestContext::new(headers, body);
    match entry.chain.evaluate(&ctx) {
        Outcome::Pass => (entry.respond)(&ctx).into_response(),
        Outcome::Fail {
            status, ..
        } => CannedResponse::empty(status).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::EndpointRegistration;
    use super::EndpointTable;
    use crate::catalog::currency_limits;
    use crate::validate::ValidatorChain;

    #[test]
    fn table_preserves_registration_paths() {
        let table = EndpointTable::new(vec![EndpointRegistration::post(
            "/mktinvestor/api/private/investor/limits",
            ValidatorChain::authenticated(),
            currency_limits,
        )]);
        assert_eq!(table.paths(), vec!["/mktinvestor/api/private/investor/limits"]);
    }
}
