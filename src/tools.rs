//! The four public operations the transport layer calls into.
//!
//! Everything is constructor-injected (renderer, clock, rules, config) so
//! tests run against an in-memory store, a fake clock and canned HTML.

use crate::cache::{normalize_url, Cache, CachedValue, Clock, SystemClock};
use crate::config::Config;
use crate::error::{Result, ScoutError};
use crate::extract;
use crate::models::{ListingDetail, ListingSummary, MatchResult, Requirements, VendorRating};
use crate::scrapers::fetcher::PageFetcher;
use crate::scrapers::rules::{MarketRules, XMRBAZAAR};
use crate::scrapers::traits::{Renderer, WaitStrategy};
use crate::score;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_RESULTS: usize = 15;

/// How many result cards a single search render is read for, regardless of
/// the caller's `max_results`; the full list is cached and truncated per
/// call so differing limits share one entry.
const SEARCH_EXTRACT_CAP: usize = 100;

/// Marketplace research tools: search, item details, vendor rating, match
/// analysis. One instance is shared across concurrent tool calls; the cache
/// is the only mutable state.
pub struct MarketScout {
    fetcher: PageFetcher,
    cache: Cache,
    clock: Arc<dyn Clock>,
    rules: MarketRules,
    cache_ttl_secs: u64,
}

impl MarketScout {
    pub fn new(renderer: Arc<dyn Renderer>, config: Config) -> Self {
        Self::with_clock(renderer, config, Arc::new(SystemClock), XMRBAZAAR)
    }

    pub fn with_clock(
        renderer: Arc<dyn Renderer>,
        config: Config,
        clock: Arc<dyn Clock>,
        rules: MarketRules,
    ) -> Self {
        let fetcher = PageFetcher::new(
            renderer,
            config.max_sessions,
            config.fetch_timeout(),
            config.max_retries,
        );
        Self {
            fetcher,
            cache: Cache::new(),
            clock,
            rules,
            cache_ttl_secs: config.cache_ttl_secs,
        }
    }

    /// Search the marketplace for listings matching a keyword, best-effort
    /// ordered as the site orders them.
    pub async fn search_market(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ListingSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ScoutError::Validation("search query is empty".into()));
        }
        if max_results == 0 {
            return Err(ScoutError::Validation(
                "max_results must be greater than zero".into(),
            ));
        }

        let url = self.rules.search_url_for(query);
        let key = normalize_url(&url);
        if let Some(CachedValue::Summaries(cached)) = self.cache.get(&key, self.clock.as_ref()) {
            info!("Returning cached search for: {}", query);
            return Ok(cached.into_iter().take(max_results).collect());
        }

        info!("Searching {} for: {}", self.rules.id, query);
        let page = self.fetcher.fetch(&url, WaitStrategy::NetworkIdle).await?;
        let all = extract::extract_summaries(&page, &self.rules, SEARCH_EXTRACT_CAP)?;
        self.cache.put(
            key,
            CachedValue::Summaries(all.clone()),
            self.cache_ttl_secs,
            self.clock.as_ref(),
        );
        Ok(all.into_iter().take(max_results).collect())
    }

    /// Scrape the full record for one listing page.
    pub async fn get_item_details(&self, url: &str) -> Result<ListingDetail> {
        let key = normalize_url(url);
        if let Some(CachedValue::Detail(cached)) = self.cache.get(&key, self.clock.as_ref()) {
            info!("Returning cached details for: {}", url);
            return Ok(cached);
        }

        info!("Fetching listing details: {}", url);
        let page = self.fetcher.fetch(url, WaitStrategy::NetworkIdle).await?;
        let detail = extract::extract_detail(&page, &self.rules)?;
        debug!("Extracted listing `{}`", detail.summary.title);
        self.cache.put(
            key,
            CachedValue::Detail(detail.clone()),
            self.cache_ttl_secs,
            self.clock.as_ref(),
        );
        Ok(detail)
    }

    /// Read a seller's reputation from their profile page.
    pub async fn get_vendor_rating(&self, vendor_url: &str) -> Result<VendorRating> {
        let key = normalize_url(vendor_url);
        if let Some(CachedValue::Vendor(cached)) = self.cache.get(&key, self.clock.as_ref()) {
            info!("Returning cached vendor rating for: {}", vendor_url);
            return Ok(cached);
        }

        info!("Checking vendor: {}", vendor_url);
        let page = self
            .fetcher
            .fetch(vendor_url, WaitStrategy::NetworkIdle)
            .await?;
        let rating = extract::extract_vendor_profile(&page, &self.rules);
        self.cache.put(
            key,
            CachedValue::Vendor(rating.clone()),
            self.cache_ttl_secs,
            self.clock.as_ref(),
        );
        Ok(rating)
    }

    /// Score an already-fetched listing against the buyer's requirements.
    /// Pure: no network, no cache.
    pub fn analyze_match(
        &self,
        detail: &ListingDetail,
        requirements: &Requirements,
        vendor: Option<&VendorRating>,
    ) -> MatchResult {
        score::score(detail, requirements, vendor)
    }
}
