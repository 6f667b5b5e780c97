pub mod client;
pub mod error_map;
pub mod metrics;
pub mod types;

pub use client::MediaClient;
pub use types::*;
