//! Employee records: wire format, remote client, cache wiring, fallback data.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod synthetic;
pub mod types;

pub use cached_client::CachedDirectoryClient;
pub use types::Employee;
