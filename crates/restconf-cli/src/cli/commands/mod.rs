//! CLI command handlers.

mod capabilities;
mod data;

pub use capabilities::run_capabilities;
pub use data::run_data;
