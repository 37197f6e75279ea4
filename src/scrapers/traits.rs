use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// What to wait for before declaring a navigation complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Wait until the page has gone quiet on the network
    NetworkIdle,
    /// Return as soon as the DOM is ready; cheaper, misses late JS content
    DomReady,
}

/// Fully rendered page text plus the URL the browser ended up on
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub final_url: String,
}

/// The one capability the scrape pipeline needs from a browser: render a URL
/// and hand back the DOM as text. The real implementation drives headless
/// Chrome; tests substitute a fixture-backed fake.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        url: &str,
        timeout: Duration,
        wait: WaitStrategy,
    ) -> Result<RenderedPage>;
}
