//! Reverse geocoding.
//!
//! [`ReverseGeocoder`] maps a coordinate to the nearest published ZIP code.
//! The spatial index is built once per snapshot epoch and shared by all
//! requests through [`IndexCache`].

mod cache;
mod reverse;

// Re-export public API
pub use cache::{IndexCache, IndexedSnapshot};
pub use reverse::{ReverseGeocoder, ReverseResult};
