//! HTTP handlers.

mod dataset;
mod lookup;

pub use dataset::{all_handler, bulk_handler, list_handler, master_handler, populate_handler};
pub use lookup::{reverse_handler, zipcode_handler};
