//! Culinary Assistant Library
//!
//! Fridge-photo recipe suggestions, favorites and shopping lists.

pub mod ai;
pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod measure;
pub mod models;
pub mod photo;
pub mod session;
pub mod tools;
