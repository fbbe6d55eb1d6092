//! Core library for the `cityinfo` relay.
//!
//! This crate defines:
//! - Configuration loading and validation
//! - Abstraction over the two upstream HTTP services
//! - The merged city/weather record
//! - The two-stage lookup and its error taxonomy
//!
//! It is used by `cityinfo-server`, but has no dependency on any web framework.

pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod upstream;

pub use config::{Config, Endpoints, LengthBounds, ResolvedConfig};
pub use error::{ConfigError, ErrorKind, LookupError, UpstreamError};
pub use lookup::CityInfoService;
pub use model::CityWeatherRecord;
pub use upstream::{HttpUpstream, UpstreamClient};
