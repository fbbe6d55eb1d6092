//! Two-stage lookup: zip code to city, then city to current weather.

use std::{error::Error as StdError, sync::Arc};
use tracing::{error, info, instrument, warn};

use crate::{
    config::ResolvedConfig,
    error::LookupError,
    model::CityWeatherRecord,
    upstream::UpstreamClient,
};

/// Longest zip code accepted, regardless of the configured `MaxLength`.
/// Lengths are counted in UTF-16 code units.
pub const MAX_ZIP_CODE_LENGTH: usize = 10;

/// Resolves a zip code into a [`CityWeatherRecord`]. Cheap to clone; holds
/// no per-request state.
#[derive(Debug, Clone)]
pub struct CityInfoService {
    config: Arc<ResolvedConfig>,
    upstream: Arc<dyn UpstreamClient>,
}

impl CityInfoService {
    pub fn new(config: ResolvedConfig, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { config: Arc::new(config), upstream }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Run the lookup and log the outcome. Errors are returned untouched so
    /// the caller can map them to a response.
    #[instrument(skip_all, fields(zip_code = %zip_code))]
    pub async fn lookup(&self, zip_code: &str) -> Result<CityWeatherRecord, LookupError> {
        let result = self.try_lookup(zip_code).await;

        match &result {
            Ok(record) => info!(
                city = %record.city_name,
                weather = %record.current_weather,
                "lookup succeeded"
            ),
            Err(err @ LookupError::BadInput { .. }) => warn!("{err}"),
            Err(err) => error!(error = %error_chain(err), "lookup failed"),
        }

        result
    }

    async fn try_lookup(&self, zip_code: &str) -> Result<CityWeatherRecord, LookupError> {
        let bounds = self
            .config
            .bounds
            .as_ref()
            .map_err(|e| LookupError::Configuration(e.clone()))?;

        let len = zip_code.encode_utf16().count();
        if len < bounds.min || len > MAX_ZIP_CODE_LENGTH {
            return Err(LookupError::BadInput { min: bounds.min, max: bounds.max });
        }

        let endpoints = self
            .config
            .endpoints
            .as_ref()
            .map_err(|e| LookupError::EndpointsMissing(e.clone()))?;

        let zip_url = endpoints.zipcode_url(zip_code);
        let city = self.upstream.fetch_record(&zip_url).await?;
        let mut city = city.ok_or(LookupError::UpstreamUnavailable { url: zip_url })?;

        if city.city_name.is_empty() {
            warn!("zip lookup returned no city name; weather call uses the bare prefix");
        }

        let weather_url = endpoints.weather_url(&city.city_name);
        let weather = self.upstream.fetch_record(&weather_url).await?;
        let weather = weather.ok_or(LookupError::UpstreamUnavailable { url: weather_url })?;

        if city.zip_code.is_empty() {
            city.zip_code = zip_code.to_owned();
        }

        Ok(city.merge_weather(weather))
    }
}

/// Render an error with its full `source()` chain, `outer: inner: ...`.
fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
