// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Moneta harness system-tests.
// Purpose: Provide mock-server clients and timeout configuration.
// Dependencies: system-tests, moneta-mock
// ============================================================================

//! ## Overview
//! Shared helpers for Moneta harness system-tests.
//! Invariants:
//! - System-test execution is deterministic.
//! - Mock responses are asserted byte-for-byte where the contract demands it.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod client;
pub mod timeouts;
