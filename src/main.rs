//! CLI entry point for the cookiesync tool.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};

use cookiesync_core::config::{self, CI_OUTPUT_VAR};
use cookiesync_core::{Credentials, LoginCookieExtractor, Mode, Settings};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("cookiesync starting");

    // Exit explicitly: the CDP handler task must not keep the runtime alive.
    match run(args).await {
        Ok(()) => {
            info!("cookie refresh complete");
            std::process::exit(0);
        }
        Err(err) => {
            error!(error = format!("{err:#}"), "cookie refresh failed");
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let app_domain = config::app_domain_from_login_url(&args.login_url)?;

    // Credentials are read once here and handed to the flow; interactive
    // mode needs none (the operator types them into the browser).
    let credentials = match args.mode {
        Mode::Scripted => Credentials::from_env(),
        Mode::Interactive => Credentials::default(),
    };

    let headless = !args.headful && args.mode != Mode::Interactive;
    let ci_output = std::env::var_os(CI_OUTPUT_VAR).map(PathBuf::from);

    let settings = Settings {
        mode: args.mode,
        login_url: args.login_url,
        app_domain,
        env_file: args.env_file,
        env_key: args.env_key,
        ci_output,
        headless,
        nav_timeout: Duration::from_secs(args.nav_timeout_secs),
        credentials,
    };

    let cookie_string = LoginCookieExtractor::new(settings).run().await?;
    info!(length = cookie_string.len(), "cookie string written");
    Ok(())
}
