//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Input Sanitization
//!
//! All input structs implement `sanitize()` which trims whitespace
//! from string fields and turns blank optional strings into `None`.
//! This should be called before processing input.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

/// Default `Limit` for ticket and configuration item searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Default ticket search sort field.
pub const DEFAULT_SORT_BY: &str = "Age";

/// Default ticket search sort order.
pub const DEFAULT_ORDER_BY: &str = "Down";

/// Helper function to trim an optional string.
fn trim_option(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn default_true() -> bool {
    true
}

/// Input parameters for the create_ticket tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateTicketInput {
    /// Ticket title; also used as the subject of the first article.
    pub title: String,

    /// Body of the first article (plain text).
    pub body: String,

    /// Queue name (defaults to the configured queue, e.g. "Raw").
    #[serde(default)]
    pub queue: Option<String>,

    /// Priority name, e.g. "3 normal". If OTRS rejects it, other common spellings are tried.
    #[serde(default)]
    pub priority: Option<String>,

    /// Ticket state (defaults to the configured state, e.g. "new").
    #[serde(default)]
    pub state: Option<String>,

    /// Customer user login. Currently replaced by the server-wide customer user override.
    #[serde(default)]
    pub customer_user: Option<String>,

    /// Ticket type (defaults to the configured type, e.g. "Unclassified").
    #[serde(default)]
    pub ticket_type: Option<String>,
}

impl CreateTicketInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            queue: trim_option(&self.queue),
            priority: trim_option(&self.priority),
            state: trim_option(&self.state),
            customer_user: trim_option(&self.customer_user),
            ticket_type: trim_option(&self.ticket_type),
        }
    }
}

/// Input parameters for the get_ticket tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTicketInput {
    /// The ticket ID to retrieve.
    pub ticket_id: String,

    /// Include dynamic field data (default: true).
    #[serde(default = "default_true")]
    pub include_dynamic_fields: bool,

    /// Include extended ticket information (default: true).
    #[serde(default = "default_true")]
    pub include_extended_data: bool,
}

impl GetTicketInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
            ..self
        }
    }
}

/// Input parameters for the search_tickets tool.
///
/// All fields are optional. Unset filters are not sent at all.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchTicketsInput {
    /// Filter by customer user login.
    #[serde(default)]
    pub customer_user: Option<String>,

    /// Filter by queue name.
    #[serde(default)]
    pub queue: Option<String>,

    /// Filter by ticket state.
    #[serde(default)]
    pub state: Option<String>,

    /// Filter by priority.
    #[serde(default)]
    pub priority: Option<String>,

    /// Search in ticket titles.
    #[serde(default)]
    pub title: Option<String>,

    /// Maximum number of results (default: 50).
    #[serde(default)]
    pub limit: Option<u32>,

    /// Sort field such as "Age" or "Created" (default: "Age").
    #[serde(default)]
    pub sort_by: Option<String>,

    /// Sort order, "Up" or "Down" (default: "Down").
    #[serde(default)]
    pub order_by: Option<String>,
}

impl SearchTicketsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            customer_user: trim_option(&self.customer_user),
            queue: trim_option(&self.queue),
            state: trim_option(&self.state),
            priority: trim_option(&self.priority),
            title: trim_option(&self.title),
            limit: self.limit,
            sort_by: trim_option(&self.sort_by),
            order_by: trim_option(&self.order_by),
        }
    }

    /// A search with no filters and the given limit.
    pub fn recent(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

/// Input parameters for the update_ticket tool.
///
/// Only the fields that are provided are sent.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateTicketInput {
    /// The ticket ID to update.
    pub ticket_id: String,

    /// New ticket title.
    #[serde(default)]
    pub title: Option<String>,

    /// New queue name.
    #[serde(default)]
    pub queue: Option<String>,

    /// New priority. If OTRS rejects it, other common spellings are tried.
    #[serde(default)]
    pub priority: Option<String>,

    /// New ticket state.
    #[serde(default)]
    pub state: Option<String>,

    /// New customer user login.
    #[serde(default)]
    pub customer_user: Option<String>,

    /// New ticket owner login.
    #[serde(default)]
    pub owner: Option<String>,
}

impl UpdateTicketInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
            title: trim_option(&self.title),
            queue: trim_option(&self.queue),
            priority: trim_option(&self.priority),
            state: trim_option(&self.state),
            customer_user: trim_option(&self.customer_user),
            owner: trim_option(&self.owner),
        }
    }
}

/// Input parameters for the get_ticket_history tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TicketHistoryInput {
    /// The ticket ID to get history for.
    pub ticket_id: String,
}

impl TicketHistoryInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
        }
    }
}

/// Input parameters for the get_config_item tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetConfigItemInput {
    /// The configuration item ID to retrieve.
    pub config_item_id: String,

    /// Include dynamic field data (default: true).
    #[serde(default = "default_true")]
    pub include_dynamic_fields: bool,
}

impl GetConfigItemInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            config_item_id: self.config_item_id.trim().to_string(),
            ..self
        }
    }
}

/// Input parameters for the search_config_items tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchConfigItemsInput {
    /// Filter by configuration item name.
    #[serde(default)]
    pub name: Option<String>,

    /// Filter by class.
    #[serde(default)]
    pub class_name: Option<String>,

    /// Filter by deployment state.
    #[serde(default)]
    pub deployment_state: Option<String>,

    /// Filter by incident state.
    #[serde(default)]
    pub incident_state: Option<String>,

    /// Maximum number of results (default: 50).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl SearchConfigItemsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            name: trim_option(&self.name),
            class_name: trim_option(&self.class_name),
            deployment_state: trim_option(&self.deployment_state),
            incident_state: trim_option(&self.incident_state),
            limit: self.limit,
        }
    }
}

/// Input parameters for the add_customer_user tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddCustomerUserInput {
    /// Login for the new customer user.
    pub login: String,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Email address.
    pub email: String,

    /// Customer company ID (defaults to the login).
    #[serde(default)]
    pub customer_id: Option<String>,
}

impl AddCustomerUserInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            login: self.login.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            customer_id: trim_option(&self.customer_id),
        }
    }
}
