//! Application layer for the sales context.

pub mod command_handlers;
pub mod sales_view;
