// crates/moneta-mock/src/platform.rs
// ============================================================================
// Module: Platform Service Mocks
// Description: Vault and ledger test doubles backed by owned keyed stores.
// Purpose: Absorb the connector's account and transaction side-effects.
// Dependencies: axum, serde, serde_json
// ============================================================================

//! ## Overview
//! The connector pushes discovered accounts to the vault service and imported
//! transactions to the ledger service. These mocks accept those calls with
//! the status contract the connector's retry logic expects and record what
//! was posted so scenarios can assert on it. Each mock owns its store as
//! instance state handed in at construction; two servers in one test process
//! never collide.
//! Invariants:
//! - Account creation: 200 first time, 409 on duplicate, 400 on malformed.
//! - Transaction posting: 200 on any well-formed body, 400 otherwise.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::catalog::CannedResponse;
use crate::server::MockServer;

// ============================================================================
// SECTION: Account Store
// ============================================================================

/// One account as the connector registers it with the vault.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Account name unique within a tenant.
    pub name: String,
    /// Account number format advertised by the partner.
    pub format: String,
    /// Portfolio currency.
    pub currency: String,
    /// Whether the vault should balance-check the account.
    pub is_balance_check: bool,
}

/// Keyed account store owned by one vault mock instance.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Accounts keyed by tenant, then account name.
    tenants: BTreeMap<String, BTreeMap<String, AccountRecord>>,
}

impl AccountStore {
    /// Registers an account; false when the name already exists.
    pub fn create(&mut self, tenant: &str, record: AccountRecord) -> bool {
        let accounts = self.tenants.entry(tenant.to_string()).or_default();
        if accounts.contains_key(&record.name) {
            return false;
        }
        accounts.insert(record.name.clone(), record);
        true
    }

    /// Returns the tenants that have at least one account.
    #[must_use]
    pub fn tenants(&self) -> Vec<String> {
        self.tenants.keys().cloned().collect()
    }

    /// Returns the account names registered for a tenant.
    #[must_use]
    pub fn accounts(&self, tenant: &str) -> Vec<String> {
        self.tenants.get(tenant).map(|accounts| accounts.keys().cloned().collect()).unwrap_or_default()
    }

    /// Returns one account record, if registered.
    #[must_use]
    pub fn account(&self, tenant: &str, name: &str) -> Option<AccountRecord> {
        self.tenants.get(tenant).and_then(|accounts| accounts.get(name)).cloned()
    }
}

/// Shared handle to a vault store, cloneable into scenario assertions.
pub type AccountStoreHandle = Arc<Mutex<AccountStore>>;

/// Builds a fresh, empty account store handle.
#[must_use]
pub fn account_store() -> AccountStoreHandle {
    Arc::new(Mutex::new(AccountStore::default()))
}

/// Builds the vault mock router over the given store.
#[must_use]
pub fn vault_router(store: AccountStoreHandle) -> Router {
    Router::new().route("/account/{tenant}", post(create_account)).with_state(store)
}

/// Builds a vault mock server bound to `bind`, owning `store`.
#[must_use]
pub fn vault_mock(bind: SocketAddr, store: AccountStoreHandle) -> MockServer {
    MockServer::new("vault", bind, vault_router(store))
}

/// Handles `POST /account/{tenant}`.
async fn create_account(
    State(store): State<AccountStoreHandle>,
    Path(tenant): Path<String>,
    body: Bytes,
) -> Response {
    let Ok(record) = serde_json::from_slice::<AccountRecord>(&body) else {
        return CannedResponse::empty(StatusCode::BAD_REQUEST).into_response();
    };
    let created = store.lock().map(|mut guard| guard.create(&tenant, record));
    match created {
        Ok(true) => CannedResponse::empty(StatusCode::OK).into_response(),
        Ok(false) => CannedResponse::empty(StatusCode::CONFLICT).into_response(),
        Err(_) => CannedResponse::empty(StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

// ============================================================================
// SECTION: Ledger Store
// ============================================================================

/// Transactions recorded by one ledger mock instance, keyed by tenant.
#[derive(Debug, Default)]
pub struct LedgerStore {
    /// Posted transaction payloads per tenant, in arrival order.
    transactions: BTreeMap<String, Vec<Value>>,
}

impl LedgerStore {
    /// Records one posted transaction.
    pub fn record(&mut self, tenant: &str, transaction: Value) {
        self.transactions.entry(tenant.to_string()).or_default().push(transaction);
    }

    /// Returns the transactions posted for a tenant.
    #[must_use]
    pub fn posted(&self, tenant: &str) -> Vec<Value> {
        self.transactions.get(tenant).cloned().unwrap_or_default()
    }
}

/// Shared handle to a ledger store.
pub type LedgerStoreHandle = Arc<Mutex<LedgerStore>>;

/// Builds a fresh, empty ledger store handle.
#[must_use]
pub fn ledger_store() -> LedgerStoreHandle {
    Arc::new(Mutex::new(LedgerStore::default()))
}

/// Builds the ledger mock router over the given store.
#[must_use]
pub fn ledger_router(store: LedgerStoreHandle) -> Router {
    Router::new().route("/transaction/{tenant}", post(post_transaction)).with_state(store)
}

/// Builds a ledger mock server bound to `bind`, owning `store`.
#[must_use]
pub fn ledger_mock(bind: SocketAddr, store: LedgerStoreHandle) -> MockServer {
    MockServer::new("ledger", bind, ledger_router(store))
}

/// Handles `POST /transaction/{tenant}`.
async fn post_transaction(
    State(store): State<LedgerStoreHandle>,
    Path(tenant): Path<String>,
    body: Bytes,
) -> Response {
    let Ok(transaction) = serde_json::from_slice::<Value>(&body) else {
        return CannedResponse::empty(StatusCode::BAD_REQUEST).into_response();
    };
    if !transaction.is_object() {
        return CannedResponse::empty(StatusCode::BAD_REQUEST).into_response();
    }
    match store.lock() {
        Ok(mut guard) => {
            guard.record(&tenant, transaction);
            CannedResponse::ok(json!({})).into_response()
        }
        Err(_) => CannedResponse::empty(StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}
