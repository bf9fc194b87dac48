//! Data models for the OTRS generic interface.
//!
//! This module contains the operation catalogue, the error envelope OTRS
//! embeds in responses, and typed request payloads for tickets,
//! configuration items and customer users.

mod common;
mod config_item;
mod ticket;

pub use common::*;
pub use config_item::*;
pub use ticket::*;
