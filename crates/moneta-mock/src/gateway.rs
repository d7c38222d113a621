// crates/moneta-mock/src/gateway.rs
// ============================================================================
// Module: Partner Gateway Mock
// Description: Endpoint table for the external partner API test double.
// Purpose: Serve the five partner endpoints the connector exercises.
// Dependencies: moneta-mock router, validate, catalog
// ============================================================================

//! ## Overview
//! Wires the partner-gateway endpoint table: two public authentication
//! endpoints and three private investor endpoints, each with the validator
//! chain the real partner API implies. All endpoints are POST.

use std::net::SocketAddr;

use axum::Router;

use crate::catalog;
use crate::router::EndpointRegistration;
use crate::router::EndpointTable;
use crate::server::MockServer;
use crate::validate::ValidatorChain;

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Login-scenario listing endpoint.
pub const LOGIN_SCENARIO_PATH: &str = "/router/api/public/authentication/getLoginScenario";

/// Login-step validation endpoint.
pub const VALIDATE_LOGIN_STEP_PATH: &str = "/router/api/public/authentication/validateLoginStep";

/// Currency investment limits endpoint.
pub const INVESTOR_LIMITS_PATH: &str = "/mktinvestor/api/private/investor/limits";

/// Transaction list endpoint.
pub const TRANSACTION_LIST_PATH: &str = "/mktinvestor/api/private/transaction/list";

/// Transaction search endpoint.
pub const TRANSACTION_SEARCH_PATH: &str = "/mktinvestor/api/private/transaction/search";

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the partner-gateway endpoint table.
#[must_use]
pub fn endpoint_table() -> EndpointTable {
    EndpointTable::new(vec![
        EndpointRegistration::post(
            LOGIN_SCENARIO_PATH,
            ValidatorChain::public_login(),
            catalog::login_scenario,
        ),
        EndpointRegistration::post(
            VALIDATE_LOGIN_STEP_PATH,
            ValidatorChain::public_login(),
            catalog::validate_login_step,
        ),
        EndpointRegistration::post(
            INVESTOR_LIMITS_PATH,
            ValidatorChain::authenticated(),
            catalog::currency_limits,
        ),
        EndpointRegistration::post(
            TRANSACTION_LIST_PATH,
            ValidatorChain::transactional(),
            catalog::transaction_list,
        ),
        EndpointRegistration::post(
            TRANSACTION_SEARCH_PATH,
            ValidatorChain::transactional_search(),
            catalog::transaction_search,
        ),
    ])
}

/// Builds the partner-gateway router.
#[must_use]
pub fn router() -> Router {
    endpoint_table().into_router()
}

/// Builds a partner-gateway mock server bound to `bind`.
#[must_use]
pub fn partner_gateway(bind: SocketAddr) -> MockServer {
    MockServer::new("partner-gateway", bind, router())
}
