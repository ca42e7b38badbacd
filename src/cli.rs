//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use cookiesync_core::Mode;

/// Refresh the staging session cookie.
///
/// Cookiesync drives the two-stage browser login (identity-aware proxy,
/// then the application form), extracts the session cookies, and writes the
/// joined cookie string into the Postman environment file that API-testing
/// tooling reads.
#[derive(Parser, Debug)]
#[command(name = "cookiesync")]
#[command(author, version, about)]
pub struct Args {
    /// Credential entry mode: scripted (environment variables) or
    /// interactive (manual login in a visible browser window)
    #[arg(long, value_enum, default_value = "scripted")]
    pub mode: Mode,

    /// Login page URL
    #[arg(long, default_value = "https://app.stg.kolr.ai/login")]
    pub login_url: String,

    /// Postman environment file to update
    #[arg(long, default_value = "STG-Env.postman_environment.json")]
    pub env_file: PathBuf,

    /// Key of the environment entry that receives the cookie string; also
    /// used as the key of the CI output line, so overriding it changes
    /// what later workflow steps must read
    #[arg(long, default_value = "company_cookie")]
    pub env_key: String,

    /// Show the browser window (scripted mode is headless by default;
    /// interactive mode is always headful)
    #[arg(long)]
    pub headful: bool,

    /// Navigation/CDP timeout in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(5..=600))]
    pub nav_timeout_secs: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
