//! Error types for configuration, upstream calls and the lookup itself.

use thiserror::Error;

/// Body returned for broken configuration and unexpected failures.
pub const SERVER_ERROR_MESSAGE: &str =
    "Server Error: We were unable to process your request. Please try again later.";

pub const ENDPOINTS_MISSING_MESSAGE: &str = "API endpoints are missing in the configuration.";

/// Problem detail returned when an upstream service answers with no data.
pub const UPSTREAM_UNAVAILABLE_DETAIL: &str =
    "The remote service is currently unavailable. Please try again later.";

/// A configuration group that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("StringParamConfig.{0} is not configured")]
    MissingLengthBound(&'static str),

    #[error("StringParamConfig.{key} must be greater than zero, got {value}")]
    InvalidLengthBound { key: &'static str, value: i64 },

    #[error("EndPoints.{0} is not configured")]
    MissingEndpoint(&'static str),
}

/// Failure of a single upstream GET.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification used when turning a [`LookupError`] into a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    Configuration,
    UpstreamUnavailable,
    Unexpected,
}

impl ErrorKind {
    /// HTTP status reported for this kind, shared by the server and the CLI.
    pub fn status_code(self) -> reqwest::StatusCode {
        match self {
            ErrorKind::BadInput => reqwest::StatusCode::BAD_REQUEST,
            ErrorKind::Configuration
            | ErrorKind::UpstreamUnavailable
            | ErrorKind::Unexpected => reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Terminal outcome of a failed lookup. Nothing is retried.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Zip code length outside the accepted range.
    #[error("Invalid zip code format. Zip code should be between {min} and {max} characters.")]
    BadInput { min: usize, max: usize },

    #[error("configuration has issues")]
    Configuration(#[source] ConfigError),

    #[error("API endpoints are not configured properly")]
    EndpointsMissing(#[source] ConfigError),

    /// The upstream answered successfully but with a `null` body.
    #[error("remote service returned no data for {url}")]
    UpstreamUnavailable { url: String },

    #[error(transparent)]
    Unexpected(#[from] UpstreamError),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::BadInput { .. } => ErrorKind::BadInput,
            LookupError::Configuration(_) | LookupError::EndpointsMissing(_) => {
                ErrorKind::Configuration
            }
            LookupError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            LookupError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Text safe to hand back to the caller. Never includes upstream details.
    pub fn public_message(&self) -> String {
        match self {
            LookupError::BadInput { .. } => self.to_string(),
            LookupError::EndpointsMissing(_) => ENDPOINTS_MISSING_MESSAGE.to_owned(),
            LookupError::UpstreamUnavailable { .. } => UPSTREAM_UNAVAILABLE_DETAIL.to_owned(),
            LookupError::Configuration(_) | LookupError::Unexpected(_) => {
                SERVER_ERROR_MESSAGE.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_input_message_cites_configured_bounds() {
        let err = LookupError::BadInput { min: 5, max: 9 };

        assert_eq!(err.kind(), ErrorKind::BadInput);
        assert_eq!(err.kind().status_code().as_u16(), 400);
        assert_eq!(
            err.public_message(),
            "Invalid zip code format. Zip code should be between 5 and 9 characters."
        );
    }

    #[test]
    fn configuration_errors_hide_details() {
        let bounds = LookupError::Configuration(ConfigError::MissingLengthBound("MinLength"));
        assert_eq!(bounds.kind(), ErrorKind::Configuration);
        assert_eq!(bounds.public_message(), SERVER_ERROR_MESSAGE);
        let source = std::error::Error::source(&bounds).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("StringParamConfig.MinLength is not configured"));

        let endpoints = LookupError::EndpointsMissing(ConfigError::MissingEndpoint("Weather"));
        assert_eq!(endpoints.kind(), ErrorKind::Configuration);
        assert_eq!(endpoints.public_message(), ENDPOINTS_MISSING_MESSAGE);
    }

    #[test]
    fn unexpected_errors_hide_upstream_details() {
        let err = LookupError::from(UpstreamError::Status {
            url: "https://zip.test/internal/12345".into(),
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        });

        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.kind().status_code().as_u16(), 500);
        assert_eq!(err.public_message(), SERVER_ERROR_MESSAGE);
        assert!(err.to_string().contains("502"));
    }
}
