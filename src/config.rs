//! Run settings and credential handling.
//!
//! Credentials are read from the process environment exactly once at startup
//! and passed into the flow explicitly, so the flow itself never touches
//! ambient process state.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use url::Url;

/// Environment variable holding the identity-aware proxy email.
pub const PROXY_EMAIL_VAR: &str = "IAP_EMAIL";
/// Environment variable holding the identity-aware proxy password.
pub const PROXY_PASSWORD_VAR: &str = "IAP_PASSWORD";
/// Environment variable holding the application login email.
pub const APP_EMAIL_VAR: &str = "COMPANY_EMAIL";
/// Environment variable holding the application login password.
pub const APP_PASSWORD_VAR: &str = "COMPANY_PASSWORD";
/// Environment variable naming the CI output file (GitHub Actions).
pub const CI_OUTPUT_VAR: &str = "GITHUB_OUTPUT";

/// Credential entry mode for the extraction flow.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Drive both login stages from environment-provided credentials.
    Scripted,
    /// Open a visible browser and block until the operator finishes logging
    /// in by hand (including any 2FA step).
    Interactive,
}

/// An email/password pair for one login stage.
///
/// The password is intentionally redacted in Debug output.
#[derive(Clone)]
pub struct LoginCredentials {
    /// Login email or username.
    pub email: String,
    /// Login password (sensitive — never log).
    password: String,
}

impl LoginCredentials {
    /// Creates a credential pair. Returns `None` when either part is empty,
    /// so a half-configured stage reads as "not configured" rather than
    /// silently typing an empty string into a login form.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Option<Self> {
        let email = email.into();
        let password = password.into();
        if email.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { email, password })
    }

    /// Returns the password.
    ///
    /// Passwords are sensitive — avoid logging the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Custom Debug impl that redacts the password.
impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Credentials for both login stages. Either stage may be absent; the flow
/// decides whether that is fatal (stage 1 in scripted mode) or fine
/// (stage 2 when the application form never appears).
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Stage-1 (identity-aware proxy) credentials.
    pub proxy: Option<LoginCredentials>,
    /// Stage-2 (application login) credentials.
    pub app: Option<LoginCredentials>,
}

impl Credentials {
    /// Reads both credential pairs from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads both credential pairs through the provided lookup function.
    /// Split out from [`Credentials::from_env`] so tests never have to
    /// mutate process-wide environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pair = |email_var: &str, password_var: &str| {
            let email = lookup(email_var)?;
            let password = lookup(password_var)?;
            LoginCredentials::new(email, password)
        };
        Self {
            proxy: pair(PROXY_EMAIL_VAR, PROXY_PASSWORD_VAR),
            app: pair(APP_EMAIL_VAR, APP_PASSWORD_VAR),
        }
    }
}

/// Errors produced while resolving run settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The login URL could not be parsed or has no host.
    #[error("invalid login URL '{url}': {reason}")]
    InvalidLoginUrl {
        /// The offending URL as given.
        url: String,
        /// Description of what was wrong.
        reason: String,
    },
}

/// Fully resolved settings for one extraction run.
#[derive(Debug)]
pub struct Settings {
    /// Credential entry mode.
    pub mode: Mode,
    /// Login page URL.
    pub login_url: String,
    /// Host of the target application, derived from the login URL. Used to
    /// decide whether a missing proxy password prompt means "already
    /// authenticated" or "stuck on the identity provider".
    pub app_domain: String,
    /// Postman environment file to update.
    pub env_file: PathBuf,
    /// Key of the environment entry that receives the cookie string.
    pub env_key: String,
    /// CI output file, when running under a CI mechanism that provides one.
    pub ci_output: Option<PathBuf>,
    /// Whether to run the browser headless.
    pub headless: bool,
    /// CDP request timeout; generous to tolerate slow identity-provider
    /// redirects.
    pub nav_timeout: Duration,
    /// Stage credentials.
    pub credentials: Credentials,
}

/// Derives the application domain from the login URL host.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidLoginUrl`] when the URL cannot be parsed
/// or has no host component.
pub fn app_domain_from_login_url(login_url: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(login_url).map_err(|e| ConfigError::InvalidLoginUrl {
        url: login_url.to_string(),
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(ToString::to_string)
        .ok_or_else(|| ConfigError::InvalidLoginUrl {
            url: login_url.to_string(),
            reason: "URL has no host".to_string(),
        })
}

/// Returns true when `url` points at `domain` or one of its subdomains.
/// Unparseable URLs never match.
#[must_use]
pub fn url_on_domain(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    match parsed.host_str() {
        Some(host) => host == domain || host.ends_with(&format!(".{domain}")),
        None => false,
    }
}
