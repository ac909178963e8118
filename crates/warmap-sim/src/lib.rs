//! Map session for warmap.
//!
//! Owns the tile grid together with everything that has to change in step
//! with it: terrain table, routing data, wave field and the hecs world of
//! map objects.

pub mod objects;
pub mod session;

pub use warmap_core as core;
pub use objects::ObjectWorld;
pub use session::{MapSession, SessionConfig};

#[cfg(test)]
mod tests;
