//! Registry document loaders.
//!
//! Each loader reads a schema document and produces a validated
//! [`Registry`](crate::registry::Registry).

mod json;

pub use json::{parse_registry, parse_registry_str};
