use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ConfigError;

/// Bounds used to validate incoming zip codes.
///
/// Example TOML:
/// [StringParamConfig]
/// MinLength = 4
/// MaxLength = 10
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StringParamConfig {
    #[serde(rename = "MinLength", default)]
    pub min_length: Option<i64>,

    #[serde(rename = "MaxLength", default)]
    pub max_length: Option<i64>,
}

/// URL prefixes of the two upstream services. The zip code (or city name)
/// is appended verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndPointsConfig {
    #[serde(rename = "Zipcode", default)]
    pub zipcode: Option<String>,

    #[serde(rename = "Weather", default)]
    pub weather: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for upstream calls. No timeout when absent.
    #[serde(rename = "TimeoutSecs", default)]
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "StringParamConfig", default)]
    pub string_params: StringParamConfig,

    #[serde(rename = "EndPoints", default)]
    pub endpoints: EndPointsConfig,

    #[serde(rename = "Http", default)]
    pub http: HttpConfig,
}

/// Validated zip code length bounds. Both values are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

/// Validated, non-empty upstream URL prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub zipcode: String,
    pub weather: String,
}

impl Endpoints {
    pub fn zipcode_url(&self, zip_code: &str) -> String {
        format!("{}{}", self.zipcode, zip_code)
    }

    pub fn weather_url(&self, city_name: &str) -> String {
        format!("{}{}", self.weather, city_name)
    }
}

/// Configuration checked once at startup. Broken groups are kept as errors
/// so that every request reports them the same way.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub bounds: Result<LengthBounds, ConfigError>,
    pub endpoints: Result<Endpoints, ConfigError>,
    pub timeout: Option<Duration>,
}

impl ResolvedConfig {
    pub fn is_valid(&self) -> bool {
        self.bounds.is_ok() && self.endpoints.is_ok()
    }
}

impl Config {
    /// Load config from an explicit path. A missing file yields the empty default.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityinfo", "cityinfo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn length_bounds(&self) -> Result<LengthBounds, ConfigError> {
        let min = positive_bound("MinLength", self.string_params.min_length)?;
        let max = positive_bound("MaxLength", self.string_params.max_length)?;
        Ok(LengthBounds { min, max })
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let zipcode = non_empty_endpoint("Zipcode", self.endpoints.zipcode.as_deref())?;
        let weather = non_empty_endpoint("Weather", self.endpoints.weather.as_deref())?;
        Ok(Endpoints { zipcode, weather })
    }

    pub fn resolve(&self) -> ResolvedConfig {
        ResolvedConfig {
            bounds: self.length_bounds(),
            endpoints: self.endpoints(),
            timeout: self.http.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn positive_bound(key: &'static str, value: Option<i64>) -> Result<usize, ConfigError> {
    let value = value.ok_or(ConfigError::MissingLengthBound(key))?;
    if value <= 0 {
        return Err(ConfigError::InvalidLengthBound { key, value });
    }
    usize::try_from(value).map_err(|_| ConfigError::InvalidLengthBound { key, value })
}

fn non_empty_endpoint(key: &'static str, value: Option<&str>) -> Result<String, ConfigError> {
    match value {
        Some(url) if !url.is_empty() => Ok(url.to_owned()),
        _ => Err(ConfigError::MissingEndpoint(key)),
    }
}
