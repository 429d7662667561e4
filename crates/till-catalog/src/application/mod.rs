//! Application layer for the catalog context.

pub mod command_handlers;
pub mod query_handlers;
pub mod views;
