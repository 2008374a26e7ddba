//! jfar-refresh - refresh incomplete new Jellyfin episodes
//!
//! Lists the episodes released in the last few days, requests a full
//! metadata and image refresh for every one missing a synopsis or a
//! sufficiently large primary image, and re-checks after the server has had
//! time to apply it. Prints a per-item trace and a summary on stdout;
//! diagnostics go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use jfar_common::config::{AppConfig, ConfigOverrides};
use jfar_refresh::services::GatewayError;
use jfar_refresh::utils::TokioSleeper;
use jfar_refresh::{config, ReconcileError, Reconciler, RunContext, RunReporter};
use reqwest::StatusCode;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for jfar-refresh
#[derive(Parser, Debug)]
#[command(name = "jfar-refresh")]
#[command(about = "Refresh metadata and artwork of newly released Jellyfin episodes")]
#[command(version)]
struct Args {
    /// Config file (JSON or TOML)
    #[arg(short, long, env = "JFAR_CONFIG")]
    config: Option<PathBuf>,

    /// Jellyfin server URL
    #[arg(long, env = "JFAR_JELLYFIN_URL")]
    url: Option<String>,

    /// Jellyfin API key
    #[arg(long, env = "JFAR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Minimum height of the primary image, in pixels
    #[arg(long)]
    desired_image_height: Option<u16>,

    /// How many days back to look for new releases
    #[arg(long)]
    lookback_days: Option<u32>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        ConfigOverrides {
            config_path: args.config,
            jellyfin_url: args.url,
            api_key: args.api_key,
            desired_image_height: args.desired_image_height,
            lookback_days: args.lookback_days,
            log_level: args.log_level,
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("jfar_refresh={level},jfar_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing comes up with the CLI level so config errors are visible;
    // the file's logging level applies when no CLI level was given.
    let cli_level = args.log_level.clone();
    let app_config = match AppConfig::resolve(args.into()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(cli_level.as_deref().unwrap_or("info"));
            error!("{}", e);
            return Err(e).context("Startup failed");
        }
    };
    init_tracing(&app_config.logging.level);

    info!(
        "Starting jfar-refresh v{} against {}",
        env!("CARGO_PKG_VERSION"),
        app_config.jellyfin_url
    );

    let client = config::build_client(&app_config).context("Failed to create HTTP client")?;
    let reconciler = Reconciler::new(
        client,
        TokioSleeper,
        config::completeness_policy(&app_config),
        config::reconcile_settings(&app_config),
    );

    let ctx = RunContext::starting_now(app_config.lookback_days)
        .context("Lookback window reaches outside the supported date range")?;
    let reporter = RunReporter::new(std::io::stdout().lock());

    match reconciler.run(&ctx, &app_config.jellyfin_url, reporter).await {
        Ok(_) => Ok(()),
        Err(ReconcileError::InitialListing(GatewayError::Server { status }))
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
        {
            error!(%status, "Request failed. Please check the API key.");
            Err(anyhow::anyhow!("Initial item listing rejected: {status}"))
        }
        Err(e) => {
            error!(error = %e, "Run aborted");
            Err(e.into())
        }
    }
}
