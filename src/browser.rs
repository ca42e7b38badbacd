//! Browser session lifecycle and wait policies.
//!
//! One Chromium session and one page per run, used strictly sequentially.
//! Readiness is condition-based (selector polling, `document.readyState`)
//! with bounded timeouts as the safety net.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::Cookie as CdpCookie;
use chromiumoxide::element::Element;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A launched browser with its CDP event handler task and single page.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Launches Chromium and opens a blank page.
    ///
    /// The CDP request timeout is set generously because identity-provider
    /// redirect chains can be slow.
    ///
    /// # Errors
    ///
    /// Returns an error when the browser cannot be launched or the initial
    /// page cannot be opened.
    pub async fn launch(headless: bool, request_timeout: Duration) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(request_timeout)
            .args(vec!["--no-sandbox", "--disable-setuid-sandbox"]);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("invalid browser configuration: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch browser")?;

        // Drain CDP events for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open page")?;

        info!(headless, "browser session started");
        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// The single page driven by this session.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Dumps every cookie in the browser's store via the session protocol,
    /// including cookies not scoped to the current document (the
    /// identity-proxy sets some of those, and the page-level accessor would
    /// miss them).
    ///
    /// # Errors
    ///
    /// Returns an error when the CDP call fails.
    pub async fn all_cookies(&self) -> Result<Vec<CdpCookie>> {
        self.browser
            .get_cookies()
            .await
            .context("failed to read cookies from the browser session")
    }

    /// Closes the browser and stops the event handler task. Failures are
    /// logged, not propagated, so teardown can run on every exit path.
    pub async fn close(mut self) {
        if let Err(error) = self.browser.close().await {
            warn!(%error, "browser close request failed");
        }
        if let Err(error) = self.browser.wait().await {
            debug!(%error, "waiting for browser exit failed");
        }
        self.handler_task.abort();
        info!("browser session closed");
    }
}

/// Timeout error for [`SelectorPolicy`] waits, carrying the candidate list
/// for diagnosis.
#[derive(Debug, thiserror::Error)]
#[error("none of the selectors {candidates:?} appeared within {timeout:?}")]
pub struct SelectorTimeout {
    /// The candidate selectors that were polled.
    pub candidates: &'static [&'static str],
    /// The overall wait bound.
    pub timeout: Duration,
}

/// An ordered list of candidate CSS selectors with a bounded wait.
///
/// Login pages vary their markup (the identity provider especially), so each
/// field is located by a fallback list: the first candidate present on the
/// page wins, with no scoring or retries beyond the bounded poll.
#[derive(Debug, Clone, Copy)]
pub struct SelectorPolicy {
    /// Candidate selectors, in preference order.
    pub candidates: &'static [&'static str],
    /// Overall wait bound for [`SelectorPolicy::wait_for_first`].
    pub timeout: Duration,
    /// Poll interval between passes over the candidates.
    pub poll: Duration,
}

impl SelectorPolicy {
    /// Creates a policy with the default 250 ms poll interval.
    #[must_use]
    pub const fn new(candidates: &'static [&'static str], timeout: Duration) -> Self {
        Self {
            candidates,
            timeout,
            poll: Duration::from_millis(250),
        }
    }

    /// Single pass: returns the first candidate currently present on the
    /// page, if any.
    pub async fn find_first(&self, page: &Page) -> Option<Element> {
        for selector in self.candidates {
            if let Ok(element) = page.find_element(*selector).await {
                debug!(selector = *selector, "selector candidate matched");
                return Some(element);
            }
        }
        None
    }

    /// Bounded wait: polls the candidates until one appears or the timeout
    /// elapses.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorTimeout`] when no candidate appeared in time.
    pub async fn wait_for_first(&self, page: &Page) -> Result<Element, SelectorTimeout> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(element) = self.find_first(page).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(SelectorTimeout {
                    candidates: self.candidates,
                    timeout: self.timeout,
                });
            }
            tokio::time::sleep(self.poll).await;
        }
    }
}

/// Polls `document.readyState` until the page reports `complete` or the
/// bound elapses. Not a guarantee of "page ready", but a better proxy than
/// a fixed sleep; a timeout here is logged and tolerated.
pub async fn wait_until_ready(page: &Page, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let state = page
            .evaluate("document.readyState")
            .await
            .ok()
            .and_then(|value| value.into_value::<String>().ok());
        if state.as_deref() == Some("complete") {
            return;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    warn!(?timeout, "page never reported readyState=complete; continuing");
}

/// Captures a full-page PNG screenshot for diagnosis. Best effort: a failed
/// capture is logged and swallowed so it never masks the original error.
pub async fn save_debug_screenshot(page: &Page, path: &Path) {
    use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
    use chromiumoxide::page::ScreenshotParams;

    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .full_page(true)
        .build();
    match page.save_screenshot(params, path).await {
        Ok(_) => info!(path = %path.display(), "diagnostic screenshot saved"),
        Err(error) => {
            warn!(%error, path = %path.display(), "failed to capture diagnostic screenshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_policy_defaults_to_quarter_second_poll() {
        let policy = SelectorPolicy::new(&["input"], Duration::from_secs(5));
        assert_eq!(policy.poll, Duration::from_millis(250));
        assert_eq!(policy.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_selector_timeout_message_names_candidates() {
        let error = SelectorTimeout {
            candidates: &["input[type=\"password\"]", "#password"],
            timeout: Duration::from_secs(30),
        };
        let message = error.to_string();
        assert!(message.contains("input[type=\\\"password\\\"]") || message.contains("#password"));
        assert!(message.contains("30s"));
    }
}
