pub mod geocoder;
pub mod stop_fetcher;

pub use geocoder::*;
pub use stop_fetcher::*;

use std::time::Duration;

/// Shared HTTP client for the upstream APIs
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
