//! Culinary Tools module
//!
//! MCP tool implementations for the Culinary Assistant.

pub mod backup;
pub mod favorites;
pub mod measure;
pub mod recipes;
pub mod share;
pub mod shopping_list;
pub mod status;
pub mod suggest;
pub mod users;
