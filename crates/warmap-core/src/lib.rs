//! Core vocabulary for the warmap terrain system.
//!
//! Constants, tile types, terrain classification, map object components
//! and error types shared by every other crate.

pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod types;

pub use error::{MapError, RoutingError};
