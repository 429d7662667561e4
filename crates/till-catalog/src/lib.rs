//! Till — catalog bounded context.
//!
//! Owns categories and products: validated write commands that delegate to
//! the document store, and the cached live views the back office and the
//! cashier screen read from.

pub mod application;
pub mod domain;
