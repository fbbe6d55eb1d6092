use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::{error::UpstreamError, model::CityWeatherRecord};

use super::UpstreamClient;

/// [`UpstreamClient`] backed by a single reused `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: Client,
}

impl HttpUpstream {
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self { http: builder.build()? })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn fetch_record(&self, url: &str) -> Result<Option<CityWeatherRecord>, UpstreamError> {
        debug!(%url, "calling upstream");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| UpstreamError::Request { url: url.to_owned(), source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| UpstreamError::Request { url: url.to_owned(), source })?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_owned(),
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str::<Option<CityWeatherRecord>>(&body)
            .map_err(|source| UpstreamError::Decode { url: url.to_owned(), source })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
