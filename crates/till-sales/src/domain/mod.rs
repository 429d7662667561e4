//! Domain layer for the sales context.

pub mod commands;
pub mod error;
pub mod sale;
pub mod summary;
