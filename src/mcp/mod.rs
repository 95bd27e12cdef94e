//! MCP server module
//!
//! Exposes the Culinary tools over the Model Context Protocol.

pub mod server;

pub use server::CulinaryService;
