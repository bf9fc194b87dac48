//! MCP resources backed by OTRS lookups.
//!
//! Each resource runs a tool operation and renders the result as
//! pretty-printed JSON. Failures are rendered as an `Error ...` string
//! instead of being raised.
//!
//! | URI                                  | Operation            |
//! |--------------------------------------|----------------------|
//! | `otrs://ticket/{ticket_id}`          | `get_ticket`         |
//! | `otrs://ticket/{ticket_id}/history`  | `get_ticket_history` |
//! | `otrs://search/tickets`              | `search_tickets`     |
//! | `otrs://configitem/{config_item_id}` | `get_config_item`    |

use rmcp::model::{AnnotateAble, RawResourceTemplate, ResourceTemplate};
use serde_json::json;

use crate::error::OtrsError;
use crate::models::JsonObject;
use crate::otrs_client::OtrsClient;
use crate::tools::SearchTicketsInput;

/// URI scheme prefix for all resources.
pub const SCHEME: &str = "otrs://";

/// URI of the recent tickets resource.
pub const SEARCH_TICKETS_URI: &str = "otrs://search/tickets";

/// Number of tickets returned by the recent tickets resource.
pub const RECENT_TICKETS_LIMIT: u32 = 20;

/// Parameterized resources: `(uri_template, name, description)`.
pub const RESOURCE_TEMPLATES: [(&str, &str, &str); 3] = [
    (
        "otrs://ticket/{ticket_id}",
        "Ticket",
        "Ticket details with dynamic fields, extended data and web links",
    ),
    (
        "otrs://ticket/{ticket_id}/history",
        "Ticket history",
        "History entries of a ticket",
    ),
    (
        "otrs://configitem/{config_item_id}",
        "Configuration item",
        "Configuration item details with dynamic fields",
    ),
];

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// `otrs://ticket/{id}`
    Ticket(String),
    /// `otrs://ticket/{id}/history`
    TicketHistory(String),
    /// `otrs://search/tickets`
    TicketSearch,
    /// `otrs://configitem/{id}`
    ConfigItem(String),
}

impl ResourceUri {
    /// Parses a resource URI. Returns `None` for anything unrecognised.
    ///
    /// Identifier segments are percent-decoded.
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(SCHEME)?;
        let segments: Vec<&str> = rest.split('/').collect();

        match segments.as_slice() {
            ["ticket", id] => decode_id(id).map(Self::Ticket),
            ["ticket", id, "history"] => decode_id(id).map(Self::TicketHistory),
            ["search", "tickets"] => Some(Self::TicketSearch),
            ["configitem", id] => decode_id(id).map(Self::ConfigItem),
            _ => None,
        }
    }

    /// Renders the URI back to its string form, percent-encoding ids.
    pub fn to_uri(&self) -> String {
        match self {
            Self::Ticket(id) => format!("{}ticket/{}", SCHEME, urlencoding::encode(id)),
            Self::TicketHistory(id) => {
                format!("{}ticket/{}/history", SCHEME, urlencoding::encode(id))
            }
            Self::TicketSearch => SEARCH_TICKETS_URI.to_string(),
            Self::ConfigItem(id) => format!("{}configitem/{}", SCHEME, urlencoding::encode(id)),
        }
    }
}

fn decode_id(segment: &str) -> Option<String> {
    let id = urlencoding::decode(segment).ok()?;
    if id.trim().is_empty() {
        return None;
    }
    Some(id.into_owned())
}

/// Builds the advertised resource templates.
///
/// Each template is decoded from its wire form; unnamed fields are left
/// unset.
pub fn resource_templates() -> Result<Vec<ResourceTemplate>, OtrsError> {
    RESOURCE_TEMPLATES
        .iter()
        .map(|(uri_template, name, description)| {
            let raw: RawResourceTemplate = serde_json::from_value(json!({
                "uriTemplate": uri_template,
                "name": name,
                "description": description,
                "mimeType": "application/json",
            }))?;
            Ok(raw.no_annotation())
        })
        .collect()
}

/// Reads a resource, never failing.
pub async fn read(client: &OtrsClient, resource: &ResourceUri) -> String {
    match resource {
        ResourceUri::Ticket(id) => ticket_resource(client, id).await,
        ResourceUri::TicketHistory(id) => ticket_history_resource(client, id).await,
        ResourceUri::TicketSearch => search_tickets_resource(client).await,
        ResourceUri::ConfigItem(id) => config_item_resource(client, id).await,
    }
}

/// Ticket details as JSON, or `Error retrieving ticket: ...`.
pub async fn ticket_resource(client: &OtrsClient, ticket_id: &str) -> String {
    let result = client.get_ticket(ticket_id, true, true).await;
    render(client, result, "Error retrieving ticket")
}

/// Ticket history as JSON, or `Error retrieving ticket history: ...`.
pub async fn ticket_history_resource(client: &OtrsClient, ticket_id: &str) -> String {
    let result = client.get_ticket_history(ticket_id).await;
    render(client, result, "Error retrieving ticket history")
}

/// The most recent tickets as JSON, or `Error searching tickets: ...`.
pub async fn search_tickets_resource(client: &OtrsClient) -> String {
    let result = client
        .search_tickets(&SearchTicketsInput::recent(RECENT_TICKETS_LIMIT))
        .await;
    render(client, result, "Error searching tickets")
}

/// Configuration item as JSON, or `Error retrieving configuration item: ...`.
pub async fn config_item_resource(client: &OtrsClient, config_item_id: &str) -> String {
    let result = client.get_config_item(config_item_id, true).await;
    render(client, result, "Error retrieving configuration item")
}

fn render(client: &OtrsClient, result: Result<JsonObject, OtrsError>, error_prefix: &str) -> String {
    let outcome = result.and_then(|value| serde_json::to_string_pretty(&value).map_err(OtrsError::from));

    match outcome {
        Ok(text) => text,
        Err(e) => {
            let sanitized = e.sanitized_display(client.password_for_sanitization());
            tracing::warn!(error = %sanitized, "{}", error_prefix);
            format!("{}: {}", error_prefix, sanitized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticket() {
        assert_eq!(
            ResourceUri::parse("otrs://ticket/123"),
            Some(ResourceUri::Ticket("123".to_string()))
        );
    }

    #[test]
    fn test_parse_ticket_history() {
        assert_eq!(
            ResourceUri::parse("otrs://ticket/123/history"),
            Some(ResourceUri::TicketHistory("123".to_string()))
        );
    }

    #[test]
    fn test_parse_search_and_config_item() {
        assert_eq!(
            ResourceUri::parse(SEARCH_TICKETS_URI),
            Some(ResourceUri::TicketSearch)
        );
        assert_eq!(
            ResourceUri::parse("otrs://configitem/55"),
            Some(ResourceUri::ConfigItem("55".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(ResourceUri::parse("issue://1").is_none());
        assert!(ResourceUri::parse("otrs://ticket/").is_none());
        assert!(ResourceUri::parse("otrs://ticket/1/articles").is_none());
        assert!(ResourceUri::parse("otrs://queue/Raw").is_none());
    }

    #[test]
    fn test_parse_decodes_ids() {
        assert_eq!(
            ResourceUri::parse("otrs://ticket/T%20123"),
            Some(ResourceUri::Ticket("T 123".to_string()))
        );
        assert_eq!(
            ResourceUri::parse("otrs://configitem/srv%2Fdb"),
            Some(ResourceUri::ConfigItem("srv/db".to_string()))
        );
        assert!(ResourceUri::parse("otrs://ticket/%20").is_none());
        assert!(ResourceUri::parse("otrs://ticket/%FF").is_none());
    }

    #[test]
    fn test_to_uri_encodes_ids() {
        let resource = ResourceUri::TicketHistory("T 123".to_string());
        assert_eq!(resource.to_uri(), "otrs://ticket/T%20123/history");
        assert_eq!(ResourceUri::parse(&resource.to_uri()), Some(resource));
    }

    #[test]
    fn test_resource_templates() {
        let templates = resource_templates().unwrap();
        let uris: Vec<&str> = templates
            .iter()
            .map(|t| t.raw.uri_template.as_str())
            .collect();
        assert_eq!(
            uris,
            vec![
                "otrs://ticket/{ticket_id}",
                "otrs://ticket/{ticket_id}/history",
                "otrs://configitem/{config_item_id}",
            ]
        );
        assert_eq!(templates[1].raw.name, "Ticket history");
        assert_eq!(
            templates[2].raw.mime_type.as_deref(),
            Some("application/json")
        );
    }

    #[test]
    fn test_uri_round_trip() {
        for uri in [
            "otrs://ticket/9",
            "otrs://ticket/9/history",
            "otrs://search/tickets",
            "otrs://configitem/4",
        ] {
            assert_eq!(ResourceUri::parse(uri).unwrap().to_uri(), uri);
        }
    }
}
