//! Configuration item and customer user payloads.

use serde::Serialize;

/// Payload for `ConfigItemGet`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigItemGetRequest {
    /// Configuration item id.
    #[serde(rename = "ConfigItemID")]
    pub config_item_id: String,
    /// `1` to include dynamic fields.
    #[serde(rename = "DynamicFields")]
    pub dynamic_fields: u8,
}

impl ConfigItemGetRequest {
    /// Builds a request from a boolean flag.
    pub fn new(config_item_id: impl Into<String>, dynamic_fields: bool) -> Self {
        Self {
            config_item_id: config_item_id.into(),
            dynamic_fields: u8::from(dynamic_fields),
        }
    }
}

/// Payload for `ConfigItemSearch`.
///
/// Class and state filters are passed through as single-element lists.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigItemSearchRequest {
    /// Maximum number of ids.
    #[serde(rename = "Limit")]
    pub limit: u32,
    /// Always `ARRAY`.
    #[serde(rename = "Result")]
    pub result: String,
    /// Name filter.
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Class filter.
    #[serde(rename = "ClassIDs", skip_serializing_if = "Option::is_none")]
    pub class_ids: Option<Vec<String>>,
    /// Deployment state filter.
    #[serde(rename = "DeplStateIDs", skip_serializing_if = "Option::is_none")]
    pub deployment_state_ids: Option<Vec<String>>,
    /// Incident state filter.
    #[serde(rename = "InciStateIDs", skip_serializing_if = "Option::is_none")]
    pub incident_state_ids: Option<Vec<String>>,
}

/// The `CustomerUser` block of a `CustomerUserAdd` payload.
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomerUser {
    /// Customer login.
    #[serde(rename = "UserLogin")]
    pub login: String,
    /// First name.
    #[serde(rename = "UserFirstname")]
    pub first_name: String,
    /// Last name.
    #[serde(rename = "UserLastname")]
    pub last_name: String,
    /// Email address.
    #[serde(rename = "UserEmail")]
    pub email: String,
    /// Customer company id.
    #[serde(rename = "UserCustomerID")]
    pub customer_id: String,
}

/// Payload for `CustomerUserAdd`.
///
/// The customer is nested so its `UserLogin` never collides with the
/// agent credentials merged in at the top level.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerUserAddRequest {
    /// The customer user to create.
    #[serde(rename = "CustomerUser")]
    pub customer_user: NewCustomerUser,
}
