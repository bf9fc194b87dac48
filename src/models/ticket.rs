//! Ticket request payloads for the OTRS generic interface.
//!
//! OTRS owns tickets; these structs only describe what the adapter sends.
//! Field names follow the webservice's PascalCase wire format.

use serde::Serialize;

/// Content type of the initial article.
pub const ARTICLE_CONTENT_TYPE: &str = "text/plain; charset=utf8";

/// Article type of the initial article.
pub const ARTICLE_TYPE: &str = "note-internal";

/// `Result` value asking OTRS for a plain id array.
pub const RESULT_ARRAY: &str = "ARRAY";

/// The `Ticket` block of a `TicketCreate` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewTicket {
    /// Ticket title.
    pub title: String,
    /// Queue name.
    pub queue: String,
    /// Priority name, e.g. `3 normal`.
    pub priority: String,
    /// State name, e.g. `new`.
    pub state: String,
    /// Ticket type name.
    #[serde(rename = "Type")]
    pub ticket_type: String,
    /// Customer user login.
    pub customer_user: String,
}

/// The `Article` block of a `TicketCreate` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewArticle {
    /// Article subject (the ticket title).
    pub subject: String,
    /// Article body.
    pub body: String,
    /// MIME content type.
    pub content_type: String,
    /// OTRS article type.
    pub article_type: String,
}

impl NewArticle {
    /// An internal plain-text note.
    pub fn internal_note(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            content_type: ARTICLE_CONTENT_TYPE.to_string(),
            article_type: ARTICLE_TYPE.to_string(),
        }
    }
}

/// Payload for `TicketCreate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TicketCreateRequest {
    /// Ticket attributes.
    pub ticket: NewTicket,
    /// Initial article.
    pub article: NewArticle,
}

/// Payload for `TicketGet`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketGetRequest {
    /// Ticket id.
    #[serde(rename = "TicketID")]
    pub ticket_id: String,
    /// `1` to include dynamic fields.
    #[serde(rename = "DynamicFields")]
    pub dynamic_fields: u8,
    /// `1` to include extended data.
    #[serde(rename = "Extended")]
    pub extended: u8,
}

impl TicketGetRequest {
    /// Builds a request from boolean flags.
    pub fn new(ticket_id: impl Into<String>, dynamic_fields: bool, extended: bool) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            dynamic_fields: u8::from(dynamic_fields),
            extended: u8::from(extended),
        }
    }
}

/// Payload for `TicketSearch`.
///
/// Unset filters are omitted from the wire entirely.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TicketSearchRequest {
    /// Maximum number of ids.
    pub limit: u32,
    /// Always `ARRAY`.
    pub result: String,
    /// Sort field, e.g. `Age`.
    pub sort_by: String,
    /// `Up` or `Down`.
    pub order_by: String,
    /// Customer user login filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_user_login: Option<String>,
    /// Queue filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queues: Option<Vec<String>>,
    /// State filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    /// Priority filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priorities: Option<Vec<String>>,
    /// Title filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The `Ticket` block of a `TicketUpdate` payload.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TicketChanges {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New queue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// New state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// New customer user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_user: Option<String>,
    /// New owner login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Payload for `TicketUpdate`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketUpdateRequest {
    /// Ticket id.
    #[serde(rename = "TicketID")]
    pub ticket_id: String,
    /// Attributes to change.
    #[serde(rename = "Ticket")]
    pub ticket: TicketChanges,
}

/// Payload for `TicketHistoryGet`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketHistoryRequest {
    /// Ticket id.
    #[serde(rename = "TicketID")]
    pub ticket_id: String,
}
