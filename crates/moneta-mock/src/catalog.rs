// crates/moneta-mock/src/catalog.rs
// ============================================================================
// Module: Response Catalog
// Description: Fixed JSON payloads returned by the partner gateway mock.
// Purpose: Encode the response contract the connector must parse correctly.
// Dependencies: axum, serde_json
// ============================================================================

//! ## Overview
//! Each responder is a pure function from a validated request to a canned
//! status and JSON body. There is no randomness and no shared mutable state,
//! so a given endpoint and validation outcome always yields byte-identical
//! bytes on the wire. The session tokens below are static fixture strings,
//! not generated material; scenarios only need the connector to carry them
//! around, never to verify them.
//! Invariants:
//! - Every response is serialized JSON with `Content-Type: application/json`.
//! - Responders never inspect credential values, only echo scoped context.

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::Value;
use serde_json::json;

use crate::context::RequestContext;
use crate::validate::ACCOUNT_CONTEXT_HEADER;

// ============================================================================
// SECTION: Canned Response
// ============================================================================

/// A fixed status plus serialized JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    /// HTTP status to answer with.
    pub status: StatusCode,
    /// JSON payload; serialized with stable key order.
    pub body: Value,
}

impl CannedResponse {
    /// Builds a 200 response around a JSON payload.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// Builds a failure response with an empty JSON object body.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: json!({}),
        }
    }
}

impl IntoResponse for CannedResponse {
    fn into_response(self) -> Response {
        let bytes = serde_json::to_vec(&self.body).unwrap_or_else(|_| b"{}".to_vec());
        (self.status, [(CONTENT_TYPE, "application/json")], bytes).into_response()
    }
}

/// Signature shared by every endpoint responder.
pub type Responder = fn(&RequestContext) -> CannedResponse;

// ============================================================================
// SECTION: Authentication Responders
// ============================================================================

/// Advertises the single two-step username/password login scenario.
#[must_use]
pub fn login_scenario(_ctx: &RequestContext) -> CannedResponse {
    CannedResponse::ok(json!({
        "scenarios": [
            {
                "code": "USR_PWD",
                "steps": [
                    {
                        "details": [
                            { "code": "USERNAME" },
                            { "code": "PWD" }
                        ]
                    }
                ]
            }
        ]
    }))
}

/// Completes the login flow with a fixed terminal `FINISH` result.
///
/// Token, expiry, and short-lived session values are hardcoded fixtures.
#[must_use]
pub fn validate_login_step(_ctx: &RequestContext) -> CannedResponse {
    CannedResponse::ok(json!({
        "result": "FINISH",
        "idAuthProcess": "rIw5_8ARbFY2YrL8TG_UQ7vIPof3KuoiRt6YT27S75Y_fPx-iWXEwl36vHTerr8JSqnlGkMpkfMvLPWhFAlskw==",
        "nextSMSAfter": 0,
        "jwt": {
            "value": "rM9aAc3ccNFg8A37gE3TN24rPb34zViEyg5YnmUB1ygj5YxSWZ86zAIMt9O2ONQIZ2XclAqaxp9CC2YSGTggumzv+i5cWj+ntJWqHC4/cuxvM70NOES+50JhVBitJC92dBeSjRo7Xg9M+5kcCHeeU5eP7JiMmzlEKptdHQW2sY3G+m2acfiG4BR1VV6hLkoL00Zl5nZixtGEm+Sx/E4yz6wqhq0O9ykB8Wg18w/ZuJAT4ZvYjDbuJisKaTgk5rIB7/V3GdRLjJzHwRjeG9dnltWyVcE6wdOB3nWc9pX6x+0azpQTcAar9GVfb0aM1V/NGK4goqNXALljg5DQBj6FWAUW11DfN+a3K9rr0G2RkR8dY2jVRXAylVv9KW7d6y5TYYTYNekxjGzTafrDAxwslKYWPJh9VCjUfUZJCee/ip1uijmJw5EoxbojApQB/FzZAVu6+qdx5cta/LCrxmPuTI0GyxcJEWSOxilxMtf5fyOPePmm00ZAU8Iu+qKQdwPgo0XVAnNZS6gQm6VO+jSfzJjKv/vrr54GX9HXbIbsqeloDDoo8WbJAZlK3CEwmMix4BB6pne2FXe9RRv7ltBr1r3WXOBf3zQcmF8DPbYbLF36BpLHFT5YQBbvTD0jRag4BY0tJoqyFXJhIq1ybGmut/xYVKE5/X3kP7nyY0UwvZOgwInDLVG9yot37rEUbf6GDFnqWmKdk7iFegtoKYMr+2Yx8uIRqYRn80hTzGIYMcE=",
            "expirationDate": "2019-01-17T18:32:23.173Z"
        },
        "ssid": {
            "value": "vWfbuAdFXdzpPK6JtKAy4QI7qVU=",
            "expirationDate": "2019-01-18T00:22:23.152Z"
        }
    }))
}

// ============================================================================
// SECTION: Investor Responders
// ============================================================================

/// Returns fixed investment bounds for the two supported currencies.
#[must_use]
pub fn currency_limits(_ctx: &RequestContext) -> CannedResponse {
    CannedResponse::ok(json!({
        "EUR": {
            "minInvestment": 0.01,
            "maxInvestment": 10_000_000,
            "maxInvestmentPercentage": 100,
            "defaultInvestment": 5
        },
        "CZK": {
            "minInvestment": 0.01,
            "maxInvestment": 10_000_000,
            "maxInvestmentPercentage": 100,
            "defaultInvestment": 100
        }
    }))
}

/// Returns one fixed synthetic transaction record.
#[must_use]
pub fn transaction_list(_ctx: &RequestContext) -> CannedResponse {
    CannedResponse::ok(json!([
        {
            "idTransaction": "x",
            "idTransfer": "y",
            "direction": "CREDIT",
            "valueDate": "2018-05-28T08:56:15.683Z",
            "transactionType": "type",
            "loanNumber": "0",
            "internalId": "1",
            "amount": {
                "amount": 10.0,
                "currencyCode": "CZK"
            },
            "originator": {
                "idOriginator": "123",
                "originatorName": "xzy"
            },
            "storno": false
        }
    ]))
}

/// Returns a fixed transfer-id set and a zeroed summary.
///
/// The summary currency echoes the `x-account-context` header verbatim, which
/// is how scenarios assert the connector scopes its queries correctly.
#[must_use]
pub fn transaction_search(ctx: &RequestContext) -> CannedResponse {
    let currency = ctx.header(ACCOUNT_CONTEXT_HEADER).unwrap_or_default();
    CannedResponse::ok(json!({
        "transferIdList": ["a", "b", "c", "d", "e"],
        "summary": {
            "startingBalance": 0,
            "finalBalance": 0,
            "currencyCode": currency,
            "principalInstallmentSum": 0,
            "principalOtherSum": 0,
            "interestSum": 0,
            "sanctionSum": 0,
            "investorDepositSum": 0,
            "investorWithdrawalSum": 0
        }
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use axum::http::HeaderMap;
    use axum::http::HeaderValue;

    use super::currency_limits;
    use super::login_scenario;
    use super::transaction_search;
    use super::validate_login_step;
    use crate::context::RequestContext;

    fn empty_request() -> RequestContext {
        RequestContext::new(HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn repeated_calls_serialize_to_identical_bytes() {
        for responder in [login_scenario, validate_login_step, currency_limits] {
            let first = serde_json::to_vec(&responder(&empty_request()).body);
            let second = serde_json::to_vec(&responder(&empty_request()).body);
            assert!(first.is_ok());
            assert_eq!(first.ok(), second.ok());
        }
    }

    #[test]
    fn limits_cover_exactly_eur_and_czk() {
        let body = currency_limits(&empty_request()).body;
        let keys: Vec<&String> =
            body.as_object().map(|map| map.keys().collect()).unwrap_or_default();
        assert_eq!(keys.len(), 2);
        assert!(body.get("EUR").is_some());
        assert!(body.get("CZK").is_some());
        for currency in ["EUR", "CZK"] {
            let min = body.get(currency).and_then(|entry| entry.get("minInvestment"));
            assert_eq!(min.and_then(serde_json::Value::as_f64), Some(0.01));
        }
    }

    #[test]
    fn search_summary_echoes_account_context_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert("x-account-context", HeaderValue::from_static("CZK"));
        let ctx = RequestContext::new(headers, Bytes::new());
        let body = transaction_search(&ctx).body;
        let currency = body.get("summary").and_then(|summary| summary.get("currencyCode"));
        assert_eq!(currency.and_then(serde_json::Value::as_str), Some("CZK"));
        let transfers = body.get("transferIdList").and_then(serde_json::Value::as_array);
        assert_eq!(transfers.map(Vec::len), Some(5));
    }
}
