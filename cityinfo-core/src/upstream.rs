use async_trait::async_trait;
use std::fmt::Debug;

use crate::{config::ResolvedConfig, error::UpstreamError, model::CityWeatherRecord};

pub mod http;

pub use http::HttpUpstream;

/// GET access to the zip-lookup and weather services.
///
/// `Ok(None)` means the service answered successfully with a `null` body.
#[async_trait]
pub trait UpstreamClient: Send + Sync + Debug {
    async fn fetch_record(&self, url: &str) -> Result<Option<CityWeatherRecord>, UpstreamError>;
}

/// Construct the shared HTTP client from resolved config.
pub fn client_from_config(config: &ResolvedConfig) -> anyhow::Result<HttpUpstream> {
    HttpUpstream::new(config.timeout)
}
