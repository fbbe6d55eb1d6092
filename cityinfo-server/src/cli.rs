use anyhow::{Context, bail};
use cityinfo_core::{
    CityInfoService, Config, lookup::MAX_ZIP_CODE_LENGTH, upstream::client_from_config,
};
use clap::{Parser, Subcommand};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{AppState, create_router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityinfo", version, about = "Zip code to city weather relay")]
pub struct Cli {
    /// Path to the TOML config file. Defaults to the platform config directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `GET /CityInfo?zipCode=...` (default).
    Serve {
        /// Address to listen on.
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },

    /// Look up a single zip code and print the merged record.
    Lookup {
        /// Zip code to resolve.
        zip_code: String,
    },

    /// Validate the configuration and print what was resolved.
    CheckConfig,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&config_path)?;

        match self.command {
            Some(Command::Serve { bind }) => serve(config, bind).await,
            None => serve(config, default_bind()).await,
            Some(Command::Lookup { zip_code }) => lookup(config, &zip_code).await,
            Some(Command::CheckConfig) => check_config(&config, &config_path),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn build_service(config: &Config) -> anyhow::Result<CityInfoService> {
    let resolved = config.resolve();
    let upstream = client_from_config(&resolved).context("Failed to build HTTP client")?;
    Ok(CityInfoService::new(resolved, Arc::new(upstream)))
}

async fn serve(config: Config, bind: SocketAddr) -> anyhow::Result<()> {
    let service = build_service(&config)?;
    if let Err(err) = &service.config().bounds {
        warn!(%err, "length bounds are invalid; every request will fail");
    }
    if let Err(err) = &service.config().endpoints {
        warn!(%err, "endpoints are missing; valid requests will fail");
    }

    let app = create_router(AppState::new(service));
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    info!(%bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("shut down");
    Ok(())
}

async fn lookup(config: Config, zip_code: &str) -> anyhow::Result<()> {
    let service = build_service(&config)?;
    println!("{}", render_lookup(&service, zip_code).await?);
    Ok(())
}

/// Pretty JSON on success; otherwise the status the HTTP API would return
/// together with its body text.
async fn render_lookup(service: &CityInfoService, zip_code: &str) -> anyhow::Result<String> {
    match service.lookup(zip_code).await {
        Ok(record) => Ok(serde_json::to_string_pretty(&record)?),
        Err(err) => bail!("{}: {}", err.kind().status_code(), err.public_message()),
    }
}

fn check_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    let resolved = config.resolve();

    println!("Config file: {}", path.display());

    match &resolved.bounds {
        Ok(bounds) => println!(
            "Zip code length: {}..={} (configured max {})",
            bounds.min, MAX_ZIP_CODE_LENGTH, bounds.max
        ),
        Err(err) => println!("Zip code length: INVALID ({err})"),
    }

    match &resolved.endpoints {
        Ok(endpoints) => {
            println!("Zipcode endpoint: {}", endpoints.zipcode);
            println!("Weather endpoint: {}", endpoints.weather);
        }
        Err(err) => println!("Endpoints: INVALID ({err})"),
    }

    match resolved.timeout {
        Some(timeout) => println!("Upstream timeout: {}s", timeout.as_secs()),
        None => println!("Upstream timeout: none"),
    }

    if !resolved.is_valid() {
        bail!("configuration has issues");
    }

    println!("Configuration OK");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubUpstream, city, config};
    use cityinfo_core::error::{SERVER_ERROR_MESSAGE, UPSTREAM_UNAVAILABLE_DETAIL};

    fn stub_service(upstream: StubUpstream) -> CityInfoService {
        CityInfoService::new(config(), Arc::new(upstream))
    }

    #[tokio::test]
    async fn lookup_prints_merged_record() {
        let service = stub_service(
            StubUpstream::default()
                .respond("http://zip/zipcode/33823", city("Lakeland", ""))
                .respond("http://weather/weather/Lakeland", city("", "Sunny")),
        );

        let out = render_lookup(&service, "33823").await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "CityName": "Lakeland", "ZipCode": "33823", "Weather": "Sunny" })
        );
    }

    #[tokio::test]
    async fn lookup_reports_bad_request_status() {
        let service = stub_service(StubUpstream::default());
        let err = render_lookup(&service, "1").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "400 Bad Request: Invalid zip code format. \
             Zip code should be between 5 and 10 characters."
        );
    }

    #[tokio::test]
    async fn lookup_reports_server_error_status() {
        let service =
            stub_service(StubUpstream::default().respond("http://zip/zipcode/33930", None));
        let err = render_lookup(&service, "33930").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("500 Internal Server Error: {UPSTREAM_UNAVAILABLE_DETAIL}")
        );

        // Unknown URLs fail in the stub, so the zip call errors.
        let service = stub_service(StubUpstream::default());
        let err = render_lookup(&service, "12345").await.unwrap_err();
        assert_eq!(err.to_string(), format!("500 Internal Server Error: {SERVER_ERROR_MESSAGE}"));
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["cityinfo"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["cityinfo", "lookup", "33823", "--config", "/tmp/c.toml", "-v"])
                .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Some(Command::Lookup { zip_code }) if zip_code == "33823"));
    }

    #[test]
    fn serve_bind_defaults_to_localhost() {
        let cli = Cli::try_parse_from(["cityinfo", "serve"]).unwrap();
        match cli.command {
            Some(Command::Serve { bind }) => assert_eq!(bind, default_bind()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_config_fails_on_empty_config() {
        let err = check_config(&Config::default(), Path::new("config.toml")).unwrap_err();
        assert!(err.to_string().contains("configuration has issues"));
    }
}
