// crates/moneta-mock/src/lib.rs
// ============================================================================
// Module: Moneta Mock Library
// Description: Deterministic mock servers for connector acceptance tests.
// Purpose: Stand in for the partner gateway and platform services.
// Dependencies: axum, axum-server, rcgen, serde_json
// ============================================================================

//! ## Overview
//! This crate hosts the TLS-terminating mock servers that acceptance
//! scenarios point the connector under test at: the partner gateway and the
//! vault/ledger platform-service mocks. Every endpoint applies an ordered
//! validator chain and answers from a deterministic response catalog.
//! Invariants:
//! - Identical request class yields byte-identical response bodies.
//! - Mock state is owned per server instance, never process-global.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod context;
pub mod gateway;
pub mod platform;
pub mod router;
pub mod server;
pub mod tls;
pub mod validate;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use context::RequestContext;
pub use gateway::partner_gateway;
pub use router::EndpointMethod;
pub use router::EndpointRegistration;
pub use router::EndpointTable;
pub use server::LifecycleState;
pub use server::MockServer;
pub use server::MockServerError;
pub use validate::Outcome;
pub use validate::ValidatorChain;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Port the connector expects the partner gateway on.
pub const PARTNER_GATEWAY_PORT: u16 = 4000;

/// Port the connector expects the vault gateway on.
pub const VAULT_GATEWAY_PORT: u16 = 4400;

/// Port the connector expects the ledger gateway on.
pub const LEDGER_GATEWAY_PORT: u16 = 4401;
