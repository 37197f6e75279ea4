use crate::error::{Result, ScoutError};
use crate::scrapers::traits::{RenderedPage, Renderer, WaitStrategy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::warn;
use url::Url;

const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Drives the renderer with URL validation, a bounded session pool and
/// bounded retry. Holds no page state; safe to share across tool calls.
pub struct PageFetcher {
    renderer: Arc<dyn Renderer>,
    sessions: Semaphore,
    timeout: Duration,
    max_retries: u32,
}

impl PageFetcher {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        max_sessions: usize,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            renderer,
            sessions: Semaphore::new(max_sessions.max(1)),
            timeout,
            max_retries,
        }
    }

    /// Render a page, retrying transient failures with exponential backoff
    /// (base 500 ms, factor 2). A renderer session is held only for the
    /// duration of each navigation; the permit guard releases it on every
    /// exit path.
    pub async fn fetch(&self, url: &str, wait: WaitStrategy) -> Result<RenderedPage> {
        validate_url(url)?;

        let mut attempt = 0;
        loop {
            let result = {
                // Semaphore is never closed, acquire cannot fail
                let _permit = self.sessions.acquire().await.map_err(|_| {
                    ScoutError::Validation("fetcher session pool closed".into())
                })?;
                self.renderer.render(url, self.timeout, wait).await
            };

            match result {
                Ok(page) => return Ok(page),
                Err(ScoutError::Fetch { kind, message }) if kind.is_transient() => {
                    if attempt >= self.max_retries {
                        return Err(ScoutError::Fetch { kind, message });
                    }
                    let delay = BACKOFF_BASE * 2u32.pow(attempt);
                    warn!(
                        "Fetch of {} failed ({}), retry {}/{} in {:?}",
                        url,
                        message,
                        attempt + 1,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Only absolute http(s) URLs are fetchable
fn validate_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| ScoutError::invalid_url(format!("`{}` is not an absolute URL: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ScoutError::invalid_url(format!(
            "scheme `{}` is not allowed for `{}`",
            other, raw
        ))),
    }
}
