//! MCP server implementation for the OTRS adapter.
//!
//! This module defines the `OtrsServer` struct that implements the MCP
//! `ServerHandler` trait, exposing OTRS webservice operations as tools
//! and ticket/configuration item lookups as resources.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, ListResourceTemplatesResult, ListResourcesResult, PaginatedRequestParam,
        RawResource, ReadResourceRequestParam, ReadResourceResult, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};

use crate::error::OtrsError;
use crate::models::JsonObject;
use crate::otrs_client::OtrsClient;
use crate::resources::{self, ResourceUri};
use crate::tools::{
    AddCustomerUserInput, CreateTicketInput, GetConfigItemInput, GetTicketInput,
    SearchConfigItemsInput, SearchTicketsInput, TicketHistoryInput, UpdateTicketInput,
};

/// The OTRS MCP server.
///
/// This server exposes OTRS generic interface operations as MCP tools.
#[derive(Clone)]
pub struct OtrsServer {
    /// OTRS client for API operations.
    otrs_client: OtrsClient,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OtrsServer {
    /// Creates a new server instance.
    ///
    /// # Arguments
    ///
    /// * `otrs_client` - The OTRS client for API operations
    pub fn new(otrs_client: OtrsClient) -> Self {
        Self {
            otrs_client,
            tool_router: Self::tool_router(),
        }
    }

    /// Create a new OTRS session.
    #[tool(description = "Create a new OTRS session. Returns the SessionID and session information.")]
    async fn create_session(&self) -> Result<String, String> {
        tracing::debug!("create_session tool called");

        let result = self.otrs_client.create_session().await;
        self.render(result, "Failed to create session")
    }

    /// Create a new ticket in OTRS.
    ///
    /// Title and body are required. Unknown priority spellings are retried
    /// with common alternatives.
    #[tool(description = "Create a new ticket in OTRS. Title and body are required; queue, priority, state and type default to the configured values. If OTRS rejects the priority, common alternative spellings are tried. Returns the TicketID, TicketNumber and a WebURL.")]
    async fn create_ticket(
        &self,
        Parameters(input): Parameters<CreateTicketInput>,
    ) -> Result<String, String> {
        // Sanitize input
        let input = input.sanitize();
        tracing::debug!(title = %input.title, "create_ticket tool called");

        if input.title.is_empty() {
            return Err("Title is required and cannot be empty.".to_string());
        }

        let result = self.otrs_client.create_ticket(&input).await;
        self.render(result, "Failed to create ticket")
    }

    /// Get ticket details from OTRS.
    #[tool(description = "Get ticket details from OTRS, optionally with dynamic fields and extended data. Adds links to the ticket and its history in the agent web interface.")]
    async fn get_ticket(
        &self,
        Parameters(input): Parameters<GetTicketInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "get_ticket tool called");

        let result = self
            .otrs_client
            .get_ticket(
                &input.ticket_id,
                input.include_dynamic_fields,
                input.include_extended_data,
            )
            .await;
        self.render(result, &format!("Failed to get ticket {}", input.ticket_id))
    }

    /// Search for tickets in OTRS.
    #[tool(description = "Search for tickets in OTRS by customer user, queue, state, priority or title. Returns matching TicketIDs (default limit 50, newest first) with a web link for each.")]
    async fn search_tickets(
        &self,
        Parameters(input): Parameters<SearchTicketsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "search_tickets tool called");

        let result = self.otrs_client.search_tickets(&input).await;
        self.render(result, "Failed to search tickets")
    }

    /// Update an existing ticket in OTRS.
    ///
    /// Only the supplied fields are changed.
    #[tool(description = "Update an existing ticket in OTRS. Ticket ID is required; only the supplied fields (title, queue, priority, state, customer_user, owner) are changed. If OTRS rejects the priority, common alternative spellings are tried.")]
    async fn update_ticket(
        &self,
        Parameters(input): Parameters<UpdateTicketInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "update_ticket tool called");

        let result = self.otrs_client.update_ticket(&input).await;
        self.render(result, &format!("Failed to update ticket {}", input.ticket_id))
    }

    /// Get ticket history from OTRS.
    #[tool(description = "Get the history of a ticket in OTRS.")]
    async fn get_ticket_history(
        &self,
        Parameters(input): Parameters<TicketHistoryInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "get_ticket_history tool called");

        let result = self.otrs_client.get_ticket_history(&input.ticket_id).await;
        self.render(
            result,
            &format!("Failed to get history of ticket {}", input.ticket_id),
        )
    }

    /// Get configuration item details from OTRS.
    #[tool(description = "Get configuration item details from OTRS, optionally with dynamic fields.")]
    async fn get_config_item(
        &self,
        Parameters(input): Parameters<GetConfigItemInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(config_item_id = %input.config_item_id, "get_config_item tool called");

        let result = self
            .otrs_client
            .get_config_item(&input.config_item_id, input.include_dynamic_fields)
            .await;
        self.render(
            result,
            &format!("Failed to get configuration item {}", input.config_item_id),
        )
    }

    /// Search for configuration items in OTRS.
    #[tool(description = "Search for configuration items in OTRS by name, class, deployment state or incident state (default limit 50).")]
    async fn search_config_items(
        &self,
        Parameters(input): Parameters<SearchConfigItemsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "search_config_items tool called");

        let result = self.otrs_client.search_config_items(&input).await;
        self.render(result, "Failed to search configuration items")
    }

    /// Create a customer user in OTRS.
    #[tool(description = "Create a customer user in OTRS. Login, first name, last name and email are required; customer_id defaults to the login.")]
    async fn add_customer_user(
        &self,
        Parameters(input): Parameters<AddCustomerUserInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(login = %input.login, "add_customer_user tool called");

        if input.email.is_empty() {
            return Err("Email is required and cannot be empty.".to_string());
        }

        let result = self.otrs_client.add_customer_user(&input).await;
        self.render(
            result,
            &format!("Failed to add customer user {}", input.login),
        )
    }

    /// Renders a result as pretty JSON, or a sanitized error message.
    fn render(&self, result: Result<JsonObject, OtrsError>, failure: &str) -> Result<String, String> {
        let value = result.map_err(|e| {
            let sanitized = self.sanitize_error(&e);
            tracing::error!(error = %sanitized, "{}", failure);
            format!("{}: {}", failure, sanitized)
        })?;

        serde_json::to_string_pretty(&value).map_err(|e| format!("{}: {}", failure, e))
    }

    /// Sanitizes an error message to remove the password.
    fn sanitize_error(&self, error: &OtrsError) -> String {
        error.sanitized_display(self.otrs_client.password_for_sanitization())
    }

    /// The static resources: only the recent tickets search.
    fn resource_list(&self) -> ListResourcesResult {
        let mut recent = RawResource::new(ResourceUri::TicketSearch.to_uri(), "Recent tickets");
        recent.description = Some(format!(
            "The {} most recently changed tickets",
            resources::RECENT_TICKETS_LIMIT
        ));
        recent.mime_type = Some("application/json".into());

        ListResourcesResult::with_all_items(vec![recent.no_annotation()])
    }

    fn resource_template_list(&self) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = resources::resource_templates().map_err(|e| {
            McpError::internal_error(format!("failed to build resource templates: {}", e), None)
        })?;
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    /// Reads one resource by URI.
    ///
    /// Unknown URIs are an `invalid_params` error. Known URIs always
    /// succeed; lookup failures are rendered into the text.
    async fn read_resource_uri(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let resource = ResourceUri::parse(uri).ok_or_else(|| {
            McpError::invalid_params(format!("unknown resource URI: {}", uri), None)
        })?;

        let text = resources::read(&self.otrs_client, &resource).await;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

#[tool_handler]
impl ServerHandler for OtrsServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "This server provides access to an OTRS ticketing system. \
                 Use search_tickets to find tickets, get_ticket and get_ticket_history \
                 for details, create_ticket and update_ticket to make changes, and \
                 get_config_item / search_config_items for the CMDB. Results are the \
                 raw OTRS JSON; application errors appear in an 'Error' field. \
                 Resources: otrs://ticket/{id}, otrs://ticket/{id}/history, \
                 otrs://search/tickets, otrs://configitem/{id}."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(self.resource_list())
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        self.resource_template_list()
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        tracing::debug!(uri = %request.uri, "read_resource called");
        self.read_resource_uri(&request.uri).await
    }
}
