//! # otrs-mcp
//!
//! An MCP (Model Context Protocol) server for the OTRS ticketing system.
//!
//! It exposes the OTRS generic interface webservice (the REST-style
//! `nph-genericinterface.pl` endpoints) as MCP tools and resources, so AI
//! assistants can create, search, read and update tickets and look up
//! configuration items.
//!
//! ## Features
//!
//! - **Tickets**: create, get, search, update, history
//! - **CMDB**: get and search configuration items
//! - **Customer users**: create
//! - **Sessions**: create a session on demand
//! - **Priority fallback**: create/update retry alternative priority spellings
//!   when OTRS rejects the supplied one
//! - **Web links**: ticket results carry links into the agent interface
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with password sanitization
//! - [`models`] - Operation catalogue and request payloads
//! - [`fallback`] - Ordered candidate resolution for rejected field values
//! - [`otrs_client`] - HTTP dispatcher and typed operations
//! - [`tools`] - Tool input parameter structs
//! - [`resources`] - Resource URIs and never-failing formatters
//! - [`server`] - MCP server implementation with tool routing
//!
//! ## Configuration
//!
//! Required:
//!
//! - `OTRS_BASE_URL`: webservice URL, e.g.
//!   `https://otrs.example.com/otrs/nph-genericinterface.pl/Webservice/TestInterface`
//! - `OTRS_USERNAME`: agent login
//! - `OTRS_PASSWORD`: agent password
//!
//! Optional:
//!
//! - `OTRS_VERIFY_SSL` (default `false`)
//! - `OTRS_DEFAULT_QUEUE`, `OTRS_DEFAULT_STATE`, `OTRS_DEFAULT_PRIORITY`,
//!   `OTRS_DEFAULT_TYPE`
//! - `OTRS_WEB_BASE_URL`: agent interface root for links
//! - `OTRS_CUSTOMER_USER_OVERRIDE` (default `Internal`, empty disables)
//! - `RUST_LOG`: log level (e.g., `otrs_mcp=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use otrs_mcp::config::Config;
//! use otrs_mcp::otrs_client::OtrsClient;
//! use otrs_mcp::tools::SearchTicketsInput;
//!
//! async fn example() -> Result<(), otrs_mcp::error::OtrsError> {
//!     let config = Config::from_env()?;
//!     let client = OtrsClient::new(&config)?;
//!
//!     let input = SearchTicketsInput {
//!         queue: Some("Raw".to_string()),
//!         ..SearchTicketsInput::recent(10)
//!     };
//!     let result = client.search_tickets(&input).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod fallback;
pub mod models;
pub mod otrs_client;
pub mod resources;
pub mod server;
pub mod tools;
