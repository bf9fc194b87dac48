//! HTTP client for the OTRS generic interface webservice.
//!
//! This module provides `OtrsClient`, which dispatches one JSON `POST` per
//! operation to `{base_url}/{Operation}` and exposes the ticket, history,
//! configuration item, customer user and session operations on top of it.
//!
//! # Authentication
//!
//! Every request carries `UserLogin` and `Password` in its body. No
//! session id is cached or reused between calls.
//!
//! # Errors
//!
//! Transport failures, non-2xx statuses and non-JSON bodies are raised.
//! Application errors OTRS reports inside a 2xx body (an `Error` object)
//! are returned as data so callers see them unmodified.
//!
//! # Security
//!
//! The password is never logged. Remote bodies are sanitized before they
//! are logged or embedded in errors.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::Config;
use crate::error::OtrsError;
use crate::fallback::{priority_candidates, CandidateResolver, FieldErrorPredicate};
use crate::models::{
    into_payload, scalar_to_string, ConfigItemGetRequest, ConfigItemSearchRequest,
    CustomerUserAddRequest, JsonObject, NewArticle, NewCustomerUser, NewTicket, Operation,
    OtrsFault, TicketChanges, TicketCreateRequest, TicketGetRequest, TicketHistoryRequest,
    TicketSearchRequest, TicketUpdateRequest, RESULT_ARRAY,
};
use crate::tools::{
    AddCustomerUserInput, CreateTicketInput, SearchConfigItemsInput, SearchTicketsInput,
    UpdateTicketInput, DEFAULT_ORDER_BY, DEFAULT_SEARCH_LIMIT, DEFAULT_SORT_BY,
};

/// Request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Content type for both directions.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Maximum length for HTTP error response bodies.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Response key for the agent web UI link.
pub const WEB_URL_KEY: &str = "WebURL";

/// Response key for the ticket history web UI link.
pub const HISTORY_URL_KEY: &str = "HistoryURL";

/// Response key for the per-ticket links added to search results.
pub const WEB_URLS_KEY: &str = "WebURLs";

/// Response key for the priority that was finally sent.
pub const PRIORITY_USED_KEY: &str = "PriorityUsed";

/// Response key for the number of priority candidates sent.
pub const PRIORITY_ATTEMPTS_KEY: &str = "PriorityAttempts";

/// Fields whose errors make `create_ticket` try the next priority.
const CREATE_WATCHED_FIELDS: [&str; 2] = ["Priority", "CustomerUser"];

/// Fields whose errors make `update_ticket` try the next priority.
const UPDATE_WATCHED_FIELDS: [&str; 1] = ["Priority"];

/// HTTP client for the OTRS webservice.
///
/// Cloning is cheap; the configuration is immutable after construction.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = OtrsClient::new(&config)?;
///
/// let ticket = client.get_ticket("1234", true, true).await?;
/// ```
#[derive(Clone)]
pub struct OtrsClient {
    /// The underlying HTTP client.
    http: Client,

    /// Connection parameters and ticket defaults.
    config: Config,
}

impl OtrsClient {
    /// Creates a new OTRS client from configuration.
    ///
    /// Redirects are followed; certificate checks follow `verify_ssl`.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &Config) -> Result<Self, OtrsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(OtrsError::HttpClient)?;

        if !config.verify_ssl {
            tracing::debug!("TLS certificate verification disabled");
        }

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the password for sanitization purposes.
    ///
    /// This should ONLY be used for sanitizing error messages, never for logging.
    pub(crate) fn password_for_sanitization(&self) -> &str {
        self.config.password()
    }

    /// Returns the agent web UI link for a ticket.
    pub fn ticket_web_url(&self, ticket_id: &str) -> String {
        format!(
            "{}/index.pl?Action=AgentTicketZoom;TicketID={}",
            self.config.web_base_url,
            urlencoding::encode(ticket_id)
        )
    }

    /// Returns the agent web UI link for a ticket's history.
    pub fn ticket_history_url(&self, ticket_id: &str) -> String {
        format!(
            "{}/index.pl?Action=AgentTicketHistory;TicketID={}",
            self.config.web_base_url,
            urlencoding::encode(ticket_id)
        )
    }

    /// Rejects blank identifiers before they reach the wire.
    fn validate_id(id: &str, field_name: &str) -> Result<(), OtrsError> {
        if id.trim().is_empty() {
            return Err(OtrsError::validation(format!(
                "{} must not be empty",
                field_name
            )));
        }
        Ok(())
    }

    /// Tests connectivity and credentials with `SessionCreate`.
    ///
    /// # Errors
    ///
    /// Returns `OtrsError::ConnectionTest` describing why the probe failed.
    pub async fn test_connection(&self) -> Result<(), OtrsError> {
        tracing::debug!("Testing connection to OTRS webservice");

        let result = self.create_session().await.and_then(|response| {
            if let Some(fault) = OtrsFault::from_response(&response) {
                return Err(fault.into_error());
            }
            if response.get("SessionID").and_then(scalar_to_string).is_none() {
                return Err(OtrsError::remote_application(
                    "SessionCreate",
                    "response carried no SessionID",
                ));
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                tracing::info!("Connection test successful");
                Ok(())
            }
            Err(OtrsError::RemoteApplication { code, message }) => {
                Err(OtrsError::connection_test(format!(
                    "{}: {} - verify OTRS_USERNAME and OTRS_PASSWORD",
                    code, message
                )))
            }
            Err(OtrsError::Timeout { duration, .. }) => {
                Err(OtrsError::connection_test(format!(
                    "Connection timed out after {:?} - verify OTRS_BASE_URL is correct and server is reachable",
                    duration
                )))
            }
            Err(e) if e.is_transport() => Err(OtrsError::connection_test(format!(
                "{} - verify OTRS_BASE_URL is correct",
                self.sanitize(&e)
            ))),
            Err(e) => Err(OtrsError::connection_test(self.sanitize(&e))),
        }
    }

    fn sanitize(&self, error: &OtrsError) -> String {
        error.sanitized_display(self.config.password())
    }

    /// Dispatches one operation.
    ///
    /// Adds `UserLogin`/`Password` to `payload`, POSTs it as JSON to
    /// `{base_url}/{operation}` and decodes the response object.
    ///
    /// # Errors
    ///
    /// - `OtrsError::Transport` / `OtrsError::Timeout` if no response arrived
    /// - `OtrsError::RemoteHttp` on a non-2xx status
    /// - `OtrsError::MalformedResponse` if the body is not a JSON object
    pub async fn call(
        &self,
        operation: Operation,
        mut payload: JsonObject,
    ) -> Result<JsonObject, OtrsError> {
        let url = format!("{}/{}", self.config.base_url, operation);

        payload.insert(
            "UserLogin".to_string(),
            Value::String(self.config.username.clone()),
        );
        payload.insert(
            "Password".to_string(),
            Value::String(self.config.password().to_string()),
        );

        tracing::debug!(operation = %operation, "Making OTRS API request");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Self::transport_error(e, operation))?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::transport_error(e, operation))?;

        tracing::trace!(
            operation = %operation,
            body = %OtrsError::sanitize_message(&body, self.config.password()),
            "OTRS API response"
        );

        Self::parse_body(operation, &body)
    }

    fn transport_error(error: reqwest::Error, operation: Operation) -> OtrsError {
        if error.is_timeout() {
            return OtrsError::timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS), operation.as_str());
        }
        OtrsError::Transport(error)
    }

    /// Decodes a response body into a JSON object.
    fn parse_body(operation: Operation, body: &str) -> Result<JsonObject, OtrsError> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(OtrsError::malformed(
                operation.as_str(),
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
            Err(e) => Err(OtrsError::malformed(operation.as_str(), e.to_string())),
        }
    }

    /// Converts a non-2xx response into `OtrsError::RemoteHttp`.
    async fn handle_http_error(&self, status: StatusCode, response: reqwest::Response) -> OtrsError {
        let body = response.text().await.unwrap_or_default();
        let body = OtrsError::sanitize_message(&body, self.config.password());
        let body = truncate_body(body, MAX_ERROR_BODY_LEN);

        tracing::warn!(status = %status, "OTRS webservice returned an error status");

        OtrsError::RemoteHttp { status, body }
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Creates a new OTRS session.
    ///
    /// The returned `SessionID` is handed to the caller; the client itself
    /// keeps authenticating with credentials.
    pub async fn create_session(&self) -> Result<JsonObject, OtrsError> {
        self.call(Operation::SessionCreate, JsonObject::new()).await
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Creates a ticket with an internal note as its first article.
    ///
    /// Missing queue, state and type fall back to the configured defaults.
    /// Priorities are resolved through the fallback list: the first
    /// response without a priority or customer user error wins, and if
    /// every candidate is rejected the last response is returned verbatim.
    ///
    /// `CustomerUser` is replaced by `Config::customer_user_override` when
    /// one is configured (the default is `Internal`).
    ///
    /// On success the result gains `WebURL`, `PriorityUsed` and
    /// `PriorityAttempts`.
    pub async fn create_ticket(&self, input: &CreateTicketInput) -> Result<JsonObject, OtrsError> {
        let customer_user = self.resolve_customer_user(input.customer_user.as_deref());
        let resolver = CandidateResolver::new(
            "Priority",
            priority_candidates(input.priority.as_deref(), &self.config.default_priority),
            FieldErrorPredicate::new(CREATE_WATCHED_FIELDS),
        );

        let resolution = resolver
            .resolve(|priority| {
                let request = TicketCreateRequest {
                    ticket: NewTicket {
                        title: input.title.clone(),
                        queue: or_default(&input.queue, &self.config.default_queue),
                        priority: priority.to_string(),
                        state: or_default(&input.state, &self.config.default_state),
                        ticket_type: or_default(&input.ticket_type, &self.config.default_type),
                        customer_user: customer_user.clone(),
                    },
                    article: NewArticle::internal_note(&input.title, &input.body),
                };
                let payload = into_payload(&request);
                async move { self.call(Operation::TicketCreate, payload?).await }
            })
            .await?;

        let mut result = resolution.response;
        if !resolution.accepted || OtrsFault::from_response(&result).is_some() {
            return Ok(result);
        }

        result.insert(PRIORITY_USED_KEY.to_string(), Value::String(resolution.chosen));
        result.insert(
            PRIORITY_ATTEMPTS_KEY.to_string(),
            Value::from(resolution.attempts),
        );
        if let Some(ticket_id) = result.get("TicketID").and_then(scalar_to_string) {
            let url = self.ticket_web_url(&ticket_id);
            result.insert(WEB_URL_KEY.to_string(), Value::String(url));
        }

        Ok(result)
    }

    /// Picks the `CustomerUser` sent on ticket creation.
    fn resolve_customer_user(&self, requested: Option<&str>) -> String {
        match (&self.config.customer_user_override, requested) {
            (Some(forced), Some(requested)) if requested != forced => {
                tracing::debug!(
                    requested = %requested,
                    forced = %forced,
                    "Overriding requested customer user"
                );
                forced.clone()
            }
            (Some(forced), _) => forced.clone(),
            (None, Some(requested)) => requested.to_string(),
            (None, None) => self.config.username.clone(),
        }
    }

    /// Gets one ticket, adding `WebURL` and `HistoryURL`.
    pub async fn get_ticket(
        &self,
        ticket_id: &str,
        include_dynamic_fields: bool,
        include_extended_data: bool,
    ) -> Result<JsonObject, OtrsError> {
        Self::validate_id(ticket_id, "ticket_id")?;
        let request = TicketGetRequest::new(ticket_id, include_dynamic_fields, include_extended_data);

        let mut result = self.call(Operation::TicketGet, into_payload(&request)?).await?;
        self.add_ticket_links(&mut result, ticket_id);

        Ok(result)
    }

    /// Searches tickets.
    ///
    /// Only the filters present in `input` are sent. When the result's
    /// `TicketID` is a list, a matching `WebURLs` list is added.
    pub async fn search_tickets(&self, input: &SearchTicketsInput) -> Result<JsonObject, OtrsError> {
        let request = TicketSearchRequest {
            limit: input.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            result: RESULT_ARRAY.to_string(),
            sort_by: or_default(&input.sort_by, DEFAULT_SORT_BY),
            order_by: or_default(&input.order_by, DEFAULT_ORDER_BY),
            customer_user_login: input.customer_user.clone(),
            queues: input.queue.clone().map(|q| vec![q]),
            states: input.state.clone().map(|s| vec![s]),
            priorities: input.priority.clone().map(|p| vec![p]),
            title: input.title.clone(),
        };

        let mut result = self
            .call(Operation::TicketSearch, into_payload(&request)?)
            .await?;

        if let Some(Value::Array(ids)) = result.get("TicketID") {
            let urls: Vec<Value> = ids
                .iter()
                .filter_map(scalar_to_string)
                .map(|id| Value::String(self.ticket_web_url(&id)))
                .collect();
            result.insert(WEB_URLS_KEY.to_string(), Value::Array(urls));
        }

        Ok(result)
    }

    /// Updates a ticket with only the fields present in `input`.
    ///
    /// A supplied priority goes through the same fallback resolution as
    /// `create_ticket`, watching only priority errors.
    pub async fn update_ticket(&self, input: &UpdateTicketInput) -> Result<JsonObject, OtrsError> {
        Self::validate_id(&input.ticket_id, "ticket_id")?;

        let changes = TicketChanges {
            title: input.title.clone(),
            queue: input.queue.clone(),
            priority: None,
            state: input.state.clone(),
            customer_user: input.customer_user.clone(),
            owner: input.owner.clone(),
        };

        let mut result = match input.priority.as_deref() {
            None => {
                let request = TicketUpdateRequest {
                    ticket_id: input.ticket_id.clone(),
                    ticket: changes,
                };
                self.call(Operation::TicketUpdate, into_payload(&request)?)
                    .await?
            }
            Some(requested) => {
                let resolver = CandidateResolver::new(
                    "Priority",
                    priority_candidates(Some(requested), &self.config.default_priority),
                    FieldErrorPredicate::new(UPDATE_WATCHED_FIELDS),
                );
                let resolution = resolver
                    .resolve(|priority| {
                        let request = TicketUpdateRequest {
                            ticket_id: input.ticket_id.clone(),
                            ticket: TicketChanges {
                                priority: Some(priority.to_string()),
                                ..changes.clone()
                            },
                        };
                        let payload = into_payload(&request);
                        async move { self.call(Operation::TicketUpdate, payload?).await }
                    })
                    .await?;

                if !resolution.accepted {
                    return Ok(resolution.response);
                }
                let mut result = resolution.response;
                if OtrsFault::from_response(&result).is_none() {
                    result.insert(PRIORITY_USED_KEY.to_string(), Value::String(resolution.chosen));
                    result.insert(
                        PRIORITY_ATTEMPTS_KEY.to_string(),
                        Value::from(resolution.attempts),
                    );
                }
                result
            }
        };

        if OtrsFault::from_response(&result).is_none() {
            let url = self.ticket_web_url(&input.ticket_id);
            result.insert(WEB_URL_KEY.to_string(), Value::String(url));
        }

        Ok(result)
    }

    /// Gets a ticket's history, adding `WebURL` and `HistoryURL`.
    pub async fn get_ticket_history(&self, ticket_id: &str) -> Result<JsonObject, OtrsError> {
        Self::validate_id(ticket_id, "ticket_id")?;
        let request = TicketHistoryRequest {
            ticket_id: ticket_id.to_string(),
        };

        let mut result = self
            .call(Operation::TicketHistoryGet, into_payload(&request)?)
            .await?;
        self.add_ticket_links(&mut result, ticket_id);

        Ok(result)
    }

    fn add_ticket_links(&self, result: &mut JsonObject, ticket_id: &str) {
        result.insert(
            WEB_URL_KEY.to_string(),
            Value::String(self.ticket_web_url(ticket_id)),
        );
        result.insert(
            HISTORY_URL_KEY.to_string(),
            Value::String(self.ticket_history_url(ticket_id)),
        );
    }

    // ========================================================================
    // Configuration items and customer users
    // ========================================================================

    /// Gets one configuration item. The response is returned as-is.
    pub async fn get_config_item(
        &self,
        config_item_id: &str,
        include_dynamic_fields: bool,
    ) -> Result<JsonObject, OtrsError> {
        Self::validate_id(config_item_id, "config_item_id")?;
        let request = ConfigItemGetRequest::new(config_item_id, include_dynamic_fields);
        self.call(Operation::ConfigItemGet, into_payload(&request)?)
            .await
    }

    /// Searches configuration items with only the filters present in `input`.
    pub async fn search_config_items(
        &self,
        input: &SearchConfigItemsInput,
    ) -> Result<JsonObject, OtrsError> {
        let request = ConfigItemSearchRequest {
            limit: input.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
            result: RESULT_ARRAY.to_string(),
            name: input.name.clone(),
            class_ids: input.class_name.clone().map(|c| vec![c]),
            deployment_state_ids: input.deployment_state.clone().map(|s| vec![s]),
            incident_state_ids: input.incident_state.clone().map(|s| vec![s]),
        };
        self.call(Operation::ConfigItemSearch, into_payload(&request)?)
            .await
    }

    /// Creates a customer user. The customer id defaults to the login.
    pub async fn add_customer_user(
        &self,
        input: &AddCustomerUserInput,
    ) -> Result<JsonObject, OtrsError> {
        Self::validate_id(&input.login, "login")?;
        let request = CustomerUserAddRequest {
            customer_user: NewCustomerUser {
                login: input.login.clone(),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                email: input.email.clone(),
                customer_id: or_default(&input.customer_id, &input.login),
            },
        };
        self.call(Operation::CustomerUserAdd, into_payload(&request)?)
            .await
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Truncates on a char boundary at or below `max_len` bytes.
fn truncate_body(body: String, max_len: usize) -> String {
    if body.len() <= max_len {
        return body;
    }
    let mut end = max_len;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Creates an OtrsClient for unit tests without requiring env vars.
    fn test_client() -> OtrsClient {
        let config = Config::new(
            "https://otrs.example.com/otrs/nph-genericinterface.pl/Webservice/TestInterface",
            "agent",
            "s3cret",
        )
        .unwrap();
        OtrsClient::new(&config).unwrap()
    }

    #[test]
    fn test_ticket_web_url() {
        let client = test_client();
        assert_eq!(
            client.ticket_web_url("T123"),
            "https://otrs.example.com/otrs/index.pl?Action=AgentTicketZoom;TicketID=T123"
        );
        assert!(client
            .ticket_history_url("T123")
            .ends_with("Action=AgentTicketHistory;TicketID=T123"));
    }

    #[test]
    fn test_ticket_web_url_encodes_id() {
        let client = test_client();
        let url = client.ticket_web_url("12;Action=Evil");
        assert!(!url.contains(";Action=Evil"));
        assert!(url.contains("TicketID=12%3BAction%3DEvil"));
    }

    #[test]
    fn test_validate_id() {
        assert!(OtrsClient::validate_id("12", "ticket_id").is_ok());
        let err = OtrsClient::validate_id("  ", "ticket_id").unwrap_err();
        assert!(err.to_string().contains("ticket_id"));
    }

    #[test]
    fn test_parse_body_object() {
        let body = r#"{"TicketID": ["1", "2"]}"#;
        let parsed = OtrsClient::parse_body(Operation::TicketSearch, body).unwrap();
        assert!(parsed.contains_key("TicketID"));
    }

    #[test]
    fn test_parse_body_rejects_non_json() {
        let err = OtrsClient::parse_body(Operation::TicketGet, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, OtrsError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_body_rejects_non_object() {
        let err = OtrsClient::parse_body(Operation::TicketGet, "[1,2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_resolve_customer_user_forced() {
        let client = test_client();
        assert_eq!(client.resolve_customer_user(Some("bob")), "Internal");
        assert_eq!(client.resolve_customer_user(None), "Internal");
    }

    #[test]
    fn test_resolve_customer_user_without_override() {
        let mut config = test_client().config().clone();
        config.customer_user_override = None;
        let client = OtrsClient::new(&config).unwrap();
        assert_eq!(client.resolve_customer_user(Some("bob")), "bob");
        assert_eq!(client.resolve_customer_user(None), "agent");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short".to_string(), 10), "short");
        let long = "é".repeat(300);
        let truncated = truncate_body(long, 501);
        assert!(truncated.ends_with("...[truncated]"));
        assert!(truncated.len() <= 501 + "...[truncated]".len());
    }
}
