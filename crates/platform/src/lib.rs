//! Social platform access for notewatch.
//!
//! `PlatformClient` is the capability the monitor depends on;
//! `HttpPlatformClient` is the production implementation.

mod api_types;
pub mod error;
mod http_client;
pub mod traits;

pub use error::PlatformError;
pub use http_client::HttpPlatformClient;
pub use traits::PlatformClient;
