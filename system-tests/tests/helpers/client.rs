// system-tests/tests/helpers/client.rs
// ============================================================================
// Module: Mock Gateway Client
// Description: HTTPS client for talking to the mock servers in tests.
// Purpose: Centralize the insecure-TLS client and common request shapes.
// Dependencies: reqwest
// ============================================================================

//! ## Overview
//! The mocks terminate TLS with ephemeral self-signed certificates, matching
//! the connector's own test configuration which skips verification. The
//! helper client does the same; nothing here must ever talk to a real
//! service.

use reqwest::Client;
use reqwest::Response;

/// Builds a client that accepts the mocks' self-signed certificates.
pub fn insecure_client() -> Result<Client, String> {
    Client::builder()
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(|err| format!("failed to build https client: {err}"))
}

/// Issues a POST with the given headers and raw body.
pub async fn post(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> Result<Response, String> {
    let mut request = client.post(url);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
        .body(body.to_string())
        .send()
        .await
        .map_err(|err| format!("POST {url} failed: {err}"))
}

/// Issues a POST and returns (status, body bytes).
pub async fn post_raw(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> Result<(u16, Vec<u8>), String> {
    let response = post(client, url, headers, body).await?;
    let status = response.status().as_u16();
    let bytes =
        response.bytes().await.map_err(|err| format!("read body from {url} failed: {err}"))?;
    Ok((status, bytes.to_vec()))
}
