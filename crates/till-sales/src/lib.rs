//! Till — sales bounded context.
//!
//! Follows the live sales feed, validates each sale record at the ingestion
//! boundary and derives the dashboard figures (daily, monthly and all-time
//! totals plus a per-product rollup) by recomputing them from the current
//! snapshot on every pass.

pub mod aggregator;
pub mod application;
pub mod domain;
