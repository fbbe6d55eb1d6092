//! Fixtures shared by the router and CLI tests.

use async_trait::async_trait;
use axum::http::StatusCode;
use cityinfo_core::{
    CityWeatherRecord, Endpoints, LengthBounds, ResolvedConfig, UpstreamClient, UpstreamError,
};
use std::collections::HashMap;

/// Answers from a fixed table; unknown URLs fail with 503.
#[derive(Debug, Default)]
pub struct StubUpstream {
    responses: HashMap<String, Option<CityWeatherRecord>>,
}

impl StubUpstream {
    pub fn respond(mut self, url: &str, record: Option<CityWeatherRecord>) -> Self {
        self.responses.insert(url.to_owned(), record);
        self
    }
}

#[async_trait]
impl UpstreamClient for StubUpstream {
    async fn fetch_record(&self, url: &str) -> Result<Option<CityWeatherRecord>, UpstreamError> {
        self.responses.get(url).cloned().ok_or_else(|| UpstreamError::Status {
            url: url.to_owned(),
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "down".to_owned(),
        })
    }
}

pub fn config() -> ResolvedConfig {
    ResolvedConfig {
        bounds: Ok(LengthBounds { min: 5, max: 10 }),
        endpoints: Ok(Endpoints {
            zipcode: "http://zip/zipcode/".into(),
            weather: "http://weather/weather/".into(),
        }),
        timeout: None,
    }
}

pub fn city(name: &str, weather: &str) -> Option<CityWeatherRecord> {
    Some(CityWeatherRecord {
        city_name: name.into(),
        zip_code: String::new(),
        current_weather: weather.into(),
    })
}
