//! MCP tool inputs for the OTRS adapter.
//!
//! This module contains the parameter types for the MCP tools that
//! expose OTRS webservice operations.

mod inputs;

pub use inputs::*;
