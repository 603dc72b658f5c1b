//! MCP server exposing the n8n public REST API as tools.
//!
//! Each tool call is validated against a static operation table, translated
//! into one upstream HTTP request, and every failure is normalized into a
//! single `ToolError` shape.

pub mod app;
pub mod config;
pub mod constants;
pub mod errors;
pub mod mcp;
pub mod operations;
pub mod services;
pub mod utils;
