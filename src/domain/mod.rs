//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Rich domain types (validated, ready for aggregation)
//! - `wire.rs`: Raw serde structs matching provider responses
//! - `convert.rs`: Conversions with validation
//! - `client.rs`: Sub-client with HTTP methods

pub mod neo;
pub mod price;
