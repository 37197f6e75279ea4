use crate::error::{FetchKind, Result, ScoutError};
use crate::scrapers::traits::{RenderedPage, Renderer, WaitStrategy};
use anyhow::Context;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Extra settle time after navigation when the caller asked for a quiet
/// network; marketplace pages render listings from JS after DOM ready.
const NETWORK_SETTLE: Duration = Duration::from_secs(3);

/// Renderer backed by a headless Chrome instance. One browser process,
/// a fresh tab per navigation.
pub struct ChromeRenderer {
    browser: Browser,
}

impl ChromeRenderer {
    pub fn new(headless: bool) -> anyhow::Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(headless)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self { browser })
    }

    fn render_blocking(
        browser: &Browser,
        url: &str,
        timeout: Duration,
        wait: WaitStrategy,
    ) -> Result<RenderedPage> {
        let tab = browser.new_tab().map_err(classify)?;
        tab.set_default_timeout(timeout);

        debug!("Navigating to {}", url);
        let navigated = tab
            .navigate_to(url)
            .and_then(|t| t.wait_until_navigated().map(|_| ()));
        if let Err(e) = navigated {
            let _ = tab.close(true);
            return Err(classify(e));
        }

        if wait == WaitStrategy::NetworkIdle {
            thread::sleep(NETWORK_SETTLE);
        }

        let html = match tab.evaluate("document.documentElement.outerHTML", false) {
            Ok(result) => result
                .value
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            Err(e) => {
                let _ = tab.close(true);
                return Err(classify(e));
            }
        };
        let final_url = tab.get_url();
        let _ = tab.close(true);

        debug!("Rendered {} bytes from {}", html.len(), final_url);
        Ok(RenderedPage { html, final_url })
    }
}

fn classify(err: anyhow::Error) -> ScoutError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    let kind = if lowered.contains("timeout") || lowered.contains("timed out") {
        FetchKind::Timeout
    } else {
        FetchKind::Network
    };
    ScoutError::Fetch { kind, message }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(
        &self,
        url: &str,
        timeout: Duration,
        wait: WaitStrategy,
    ) -> Result<RenderedPage> {
        let browser = self.browser.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::render_blocking(&browser, &url, timeout, wait))
            .await
            .map_err(|e| ScoutError::Fetch {
                kind: FetchKind::Network,
                message: format!("renderer task failed: {}", e),
            })?
    }
}
