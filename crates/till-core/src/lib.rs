//! Till Core — shared data-layer abstractions.
//!
//! This crate defines the contracts every bounded context depends on: the
//! clock, the domain error type, the document store and local cache seams,
//! and the live-snapshot plumbing built on top of them. It contains no
//! concrete storage backend.

pub mod cache;
pub mod clock;
pub mod document;
pub mod error;
pub mod listener;
pub mod mirror;
pub mod timestamp;
