// crates/moneta-orchestration/src/lib.rs
// ============================================================================
// Module: Moneta Orchestration Library
// Description: Convergence polling and process control for acceptance tests.
// Purpose: Drive the connector under test into target states and wait on them.
// Dependencies: async-trait, tokio, thiserror
// ============================================================================

//! ## Overview
//! This crate carries everything a scenario needs around the mocks: the
//! convergence poller that tolerates the connector's asynchronous
//! processing, the process-controller seam over the service manager, the
//! connector configuration renderer, and the orchestration steps composing
//! them.
//! Invariants:
//! - Convergence timeouts surface the last observed failure, never a
//!   synthetic one.
//! - The core depends on the [`process::ProcessController`] interface only,
//!   never on a concrete invocation mechanism.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod eventually;
pub mod metrics;
pub mod process;
pub mod steps;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use config::ConnectorConfig;
pub use eventually::ConvergenceError;
pub use eventually::Eventually;
pub use process::ProcessController;
pub use process::ProcessError;
pub use process::RunState;
pub use process::SystemdController;
pub use steps::Orchestrator;
pub use steps::OrchestrationError;
