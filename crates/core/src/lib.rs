//! Shopify Relay Core - Shared types library.
//!
//! This crate provides the domain types used by the relay service:
//! - shop domains and Admin API versions that are safe to put in a URL
//! - numeric resource IDs with per-endpoint strictness rules
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for shop domains, API versions and IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
