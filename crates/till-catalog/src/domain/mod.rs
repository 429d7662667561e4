//! Domain layer for the catalog context.

pub mod category;
pub mod commands;
pub mod product;
