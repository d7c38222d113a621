// crates/moneta-mock/src/server.rs
// ============================================================================
// Module: Mock Server Lifecycle
// Description: TLS listener ownership and start/stop for mock servers.
// Purpose: Serve a router on a background task with explicit lifecycle state.
// Dependencies: axum, axum-server, tokio
// ============================================================================

//! ## Overview
//! [`MockServer`] owns one TLS listener and its lifecycle. `start()` binds
//! the port and spawns the accept loop on a background task; bind or TLS
//! failures are surfaced immediately as errors, never deferred. `stop()`
//! drains the accept loop before returning and is a no-op when already
//! stopped. Access logging is deliberately quiesced: the harness runs many
//! short-lived scenarios and per-request server logs drown the test output.
//! Invariants:
//! - At most one live listener per configured port.
//! - Starting an already-running server fails fast.
//! - In-flight requests complete or are abandoned without crashing.

use std::net::SocketAddr;
use std::net::TcpListener;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::tls::TlsIdentity;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by mock-server lifecycle operations.
#[derive(Debug, Error)]
pub enum MockServerError {
    /// The server is already running; stop it before starting again.
    #[error("mock server {name} is already running on {addr}")]
    AlreadyRunning {
        /// Server name, for diagnostics.
        name: String,
        /// Address the live listener is bound to.
        addr: SocketAddr,
    },
    /// The listener could not be bound; an environment precondition failed.
    #[error("mock server {name} failed to bind {addr}: {source}")]
    Bind {
        /// Server name, for diagnostics.
        name: String,
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Underlying bind failure.
        #[source]
        source: std::io::Error,
    },
    /// The TLS context could not be constructed.
    #[error("mock server {name} failed to build tls context: {detail}")]
    Tls {
        /// Server name, for diagnostics.
        name: String,
        /// Underlying TLS failure description.
        detail: String,
    },
    /// The accept loop exited before signalling readiness.
    #[error("mock server {name} exited before accepting connections")]
    FailedToStart {
        /// Server name, for diagnostics.
        name: String,
    },
}

// ============================================================================
// SECTION: Lifecycle State
// ============================================================================

/// Lifecycle states a mock server moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No listener; `start()` is legal.
    Stopped,
    /// `start()` is binding the listener.
    Starting,
    /// The accept loop is live.
    Running,
    /// `stop()` is draining the accept loop.
    Stopping,
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// One TLS-terminating mock server around an axum router.
pub struct MockServer {
    /// Name used in errors and the TLS common name.
    name: String,
    /// Address requested at construction; port 0 picks an ephemeral port.
    bind: SocketAddr,
    /// Router served to every connection.
    router: Router,
    /// Current lifecycle state.
    state: LifecycleState,
    /// Shutdown handle for the live accept loop, when running.
    handle: Option<Handle>,
    /// Join handle for the background serve task, when running.
    join: Option<JoinHandle<std::io::Result<()>>>,
    /// Address the live listener actually bound, when running.
    local_addr: Option<SocketAddr>,
}

impl MockServer {
    /// Builds a stopped server; nothing is bound until `start()`.
    #[must_use]
    pub fn new(name: &str, bind: SocketAddr, router: Router) -> Self {
        Self {
            name: name.to_string(),
            bind,
            router,
            state: LifecycleState::Stopped,
            handle: None,
            join: None,
            local_addr: None,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns the bound address while the server is running.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Returns the HTTPS base URL while the server is running.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        self.local_addr.map(|addr| format!("https://{addr}"))
    }

    /// Binds the TLS listener and spawns the accept loop.
    ///
    /// Returns once the listener is accepting, so the caller stays the
    /// driver of the scenario.
    ///
    /// # Errors
    ///
    /// Returns [`MockServerError::AlreadyRunning`] when called while running,
    /// [`MockServerError::Bind`] when the port cannot be bound, and
    /// [`MockServerError::Tls`] when the TLS context cannot be constructed.
    /// Bind and TLS failures are environment preconditions and are never
    /// retried here.
    pub async fn start(&mut self) -> Result<(), MockServerError> {
        if self.state != LifecycleState::Stopped {
            return Err(MockServerError::AlreadyRunning {
                name: self.name.clone(),
                addr: self.local_addr.unwrap_or(self.bind),
            });
        }
        self.state = LifecycleState::Starting;

        let listener = match bind_listener(&self.name, self.bind) {
            Ok(listener) => listener,
            Err(err) => {
                self.state = LifecycleState::Stopped;
                return Err(err);
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                self.state = LifecycleState::Stopped;
                return Err(MockServerError::Bind {
                    name: self.name.clone(),
                    addr: self.bind,
                    source,
                });
            }
        };

        let tls = match self.tls_config().await {
            Ok(tls) => tls,
            Err(err) => {
                self.state = LifecycleState::Stopped;
                return Err(err);
            }
        };

        let handle = Handle::new();
        let serve_handle = handle.clone();
        let router = self.router.clone();
        let join = tokio::spawn(async move {
            axum_server::from_tcp_rustls(listener, tls)
                .handle(serve_handle)
                .serve(router.into_make_service())
                .await
        });

        // listening() resolves once the accept loop is live; None means it
        // already exited.
        if handle.listening().await.is_none() {
            join.abort();
            self.state = LifecycleState::Stopped;
            return Err(MockServerError::FailedToStart {
                name: self.name.clone(),
            });
        }

        self.handle = Some(handle);
        self.join = Some(join);
        self.local_addr = Some(local_addr);
        self.state = LifecycleState::Running;
        Ok(())
    }

    /// Signals shutdown and waits for the accept loop to drain.
    ///
    /// Safe to call when already stopped. In-flight requests get a bounded
    /// grace period, then the listener is torn down.
    pub async fn stop(&mut self) {
        if self.state != LifecycleState::Running {
            return;
        }
        self.state = LifecycleState::Stopping;
        if let Some(handle) = self.handle.take() {
            handle.graceful_shutdown(Some(Duration::from_secs(5)));
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
        self.local_addr = None;
        self.state = LifecycleState::Stopped;
    }

    /// Builds the TLS context from a freshly generated identity.
    async fn tls_config(&self) -> Result<RustlsConfig, MockServerError> {
        let identity = TlsIdentity::generate(&self.name).map_err(|err| MockServerError::Tls {
            name: self.name.clone(),
            detail: err.to_string(),
        })?;
        RustlsConfig::from_pem(identity.cert_pem.into_bytes(), identity.key_pem.into_bytes())
            .await
            .map_err(|err| MockServerError::Tls {
                name: self.name.clone(),
                detail: err.to_string(),
            })
    }
}

/// Binds the listener in non-blocking mode for the tokio-driven accept loop.
fn bind_listener(name: &str, addr: SocketAddr) -> Result<TcpListener, MockServerError> {
    let listener = TcpListener::bind(addr).map_err(|source| MockServerError::Bind {
        name: name.to_string(),
        addr,
        source,
    })?;
    listener.set_nonblocking(true).map_err(|source| MockServerError::Bind {
        name: name.to_string(),
        addr,
        source,
    })?;
    Ok(listener)
}
