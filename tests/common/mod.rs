//! Shared helpers for integration tests against a mock OTRS webservice.

#![allow(dead_code)]

use otrs_mcp::config::Config;
use otrs_mcp::otrs_client::OtrsClient;
use serde_json::Value;
use wiremock::{MockServer, Request};

/// Webservice path mounted on the mock server.
pub const WEBSERVICE_PATH: &str = "/otrs/nph-genericinterface.pl/Webservice/TestInterface";

pub const USERNAME: &str = "agent";
pub const PASSWORD: &str = "t0p-s3cret";

/// Path of an operation on the mock server.
pub fn op_path(operation: &str) -> String {
    format!("{}/{}", WEBSERVICE_PATH, operation)
}

/// Configuration pointing at the mock server with default settings.
pub fn config_for(server: &MockServer) -> Config {
    Config::new(format!("{}{}", server.uri(), WEBSERVICE_PATH), USERNAME, PASSWORD)
        .expect("valid test config")
}

/// Client pointing at the mock server with default settings.
pub fn client_for(server: &MockServer) -> OtrsClient {
    OtrsClient::new(&config_for(server)).expect("client builds")
}

/// JSON bodies of every request the mock server received, in order.
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request: &Request| request.body_json::<Value>().expect("JSON request body"))
        .collect()
}
