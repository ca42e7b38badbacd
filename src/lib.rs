//! Cookiesync Core Library
//!
//! This library provides the core functionality for the cookiesync tool,
//! which drives the staging application's two-stage browser login
//! (identity-aware proxy, then the application form), extracts the session
//! cookies, and persists the joined cookie string for API-testing tooling.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`browser`] - Browser session lifecycle and wait policies
//! - [`config`] - Run settings and credential handling
//! - [`cookies`] - Cookie pairs and cookie-header serialization
//! - [`envfile`] - Postman environment file read/update/rewrite
//! - [`ci`] - CI output file emission
//! - [`flow`] - The login-and-cookie-extraction flow

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod ci;
pub mod config;
pub mod cookies;
pub mod envfile;
pub mod flow;

// Re-export commonly used types
pub use browser::{BrowserSession, SelectorPolicy, SelectorTimeout};
pub use config::{Credentials, LoginCredentials, Mode, Settings};
pub use cookies::{Cookie, cookie_header};
pub use envfile::EnvFileError;
pub use flow::LoginCookieExtractor;
