//! Core types for the Shopify relay.
//!
//! This module provides type-safe wrappers for the values that end up in
//! Admin API URLs.

pub mod id;
pub mod shop;

pub use id::{JsonKind, ResourceId, ResourceIdError};
pub use shop::{ApiVersion, ApiVersionError, ShopDomain, ShopDomainError};
