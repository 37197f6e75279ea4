//! End-to-end tests of the tool facade against canned HTML and a manually
//! advanced clock: no browser, no network.

use async_trait::async_trait;
use bazaar_scout::cache::Clock;
use bazaar_scout::{
    Config, Currency, MarketScout, RenderedPage, Renderer, Requirements, Result, Verdict,
    WaitStrategy, XMRBAZAAR,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct FakeClock {
    offset_secs: AtomicI64,
}

impl FakeClock {
    fn new() -> Self {
        Self {
            offset_secs: AtomicI64::new(0),
        }
    }

    fn advance_secs(&self, secs: i64) {
        self.offset_secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + self.offset_secs.load(Ordering::SeqCst), 0)
            .unwrap()
    }
}

/// Serves canned HTML per exact URL and counts render calls
struct FakeRenderer {
    pages: HashMap<String, String>,
    renders: AtomicU32,
}

impl FakeRenderer {
    fn new(pages: Vec<(&str, &str)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(u, h)| (u.to_string(), h.to_string()))
                .collect(),
            renders: AtomicU32::new(0),
        }
    }

    fn render_count(&self) -> u32 {
        self.renders.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(
        &self,
        url: &str,
        _timeout: Duration,
        _wait: WaitStrategy,
    ) -> Result<RenderedPage> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let html = self.pages.get(url).cloned().unwrap_or_default();
        Ok(RenderedPage {
            html,
            final_url: url.to_string(),
        })
    }
}

const SEARCH_URL: &str = "https://xmrbazaar.com/search/?q=thinkpad";
const LISTING_URL: &str = "https://xmrbazaar.com/listing/42";
const VENDOR_URL: &str = "https://xmrbazaar.com/user/techdeals";

fn search_html() -> String {
    r#"<html><body>
        <div class="listings-product">
          <a href="/listing/42"><span class="listing-title-text">ThinkPad X1 Carbon</span></a>
          <span class="listings-product-price-value">4.5 XMR</span>
        </div>
        <div class="listings-product">
          <a href="/listing/43"><span class="listing-title-text">ThinkPad T480</span></a>
          <span class="listings-product-price-value">2.1 XMR</span>
        </div>
    </body></html>"#
        .to_string()
}

fn listing_html() -> String {
    r#"<html><body>
        <h1 class="listings-product-title">ThinkPad X1 Carbon</h1>
        <span class="listings-product-price-value">Price: 4.5 XMR</span>
        <div class="listing-description">Runs Linux out of the box.</div>
        <ul class="listing-specs"><li>RAM: 16GB</li><li>SSD: 512GB</li></ul>
        <span class="listing-condition">Good</span>
        <a class="listings-product-username" href="/user/techdeals">techdeals</a>
    </body></html>"#
        .to_string()
}

fn vendor_html() -> String {
    r#"<html><body>
        <h1 class="profile-name">techdeals</h1>
        <span class="rating-stars">4.8</span>
        <span class="completed-trades">523 trades</span>
        <div class="review-text">Fast shipping, item as described.</div>
        <div class="review-text">Would buy again.</div>
    </body></html>"#
        .to_string()
}

fn scout() -> (Arc<FakeRenderer>, Arc<FakeClock>, MarketScout) {
    let renderer = Arc::new(FakeRenderer::new(vec![
        (SEARCH_URL, &search_html()),
        (LISTING_URL, &listing_html()),
        (VENDOR_URL, &vendor_html()),
    ]));
    let clock = Arc::new(FakeClock::new());
    let scout = MarketScout::with_clock(
        renderer.clone(),
        Config::default(),
        clock.clone(),
        XMRBAZAAR,
    );
    (renderer, clock, scout)
}

#[tokio::test]
async fn search_returns_summaries_in_page_order() {
    let (_, _, scout) = scout();
    let results = scout.search_market("thinkpad", 15).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "ThinkPad X1 Carbon");
    assert_eq!(results[1].title, "ThinkPad T480");
    assert_eq!(results[0].url, LISTING_URL);
}

#[tokio::test]
async fn repeated_search_within_ttl_renders_once() {
    let (renderer, _, scout) = scout();
    let a = scout.search_market("thinkpad", 15).await.unwrap();
    let b = scout.search_market("thinkpad", 15).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(renderer.render_count(), 1);
}

#[tokio::test]
async fn differing_result_limits_share_one_cache_entry() {
    let (renderer, _, scout) = scout();
    let wide = scout.search_market("thinkpad", 15).await.unwrap();
    let narrow = scout.search_market("thinkpad", 1).await.unwrap();
    assert_eq!(wide.len(), 2);
    assert_eq!(narrow.len(), 1);
    assert_eq!(renderer.render_count(), 1);
}

#[tokio::test]
async fn details_are_idempotent_within_ttl() {
    let (renderer, _, scout) = scout();
    let a = scout.get_item_details(LISTING_URL).await.unwrap();
    let b = scout.get_item_details(LISTING_URL).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(renderer.render_count(), 1);
    assert_eq!(a.summary.title, "ThinkPad X1 Carbon");
    assert_eq!(a.specs.get("RAM").map(String::as_str), Some("16GB"));
}

#[tokio::test]
async fn normalized_url_variants_hit_the_same_entry() {
    let (renderer, _, scout) = scout();
    scout.get_item_details(LISTING_URL).await.unwrap();
    // tracking params and trailing slash are not cache-busting, but the
    // renderer never sees this second variant at all
    let variant = format!("{}/?utm_source=x", LISTING_URL);
    let cached = scout.get_item_details(&variant).await.unwrap();
    assert_eq!(cached.summary.url, LISTING_URL);
    assert_eq!(renderer.render_count(), 1);
}

#[tokio::test]
async fn expired_ttl_triggers_exactly_one_new_render() {
    let (renderer, clock, scout) = scout();
    scout.get_item_details(LISTING_URL).await.unwrap();
    clock.advance_secs(Config::default().cache_ttl_secs as i64);
    scout.get_item_details(LISTING_URL).await.unwrap();
    scout.get_item_details(LISTING_URL).await.unwrap();
    assert_eq!(renderer.render_count(), 2);
}

#[tokio::test]
async fn vendor_rating_is_cached_and_derived() {
    let (renderer, _, scout) = scout();
    let a = scout.get_vendor_rating(VENDOR_URL).await.unwrap();
    let b = scout.get_vendor_rating(VENDOR_URL).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(renderer.render_count(), 1);
    assert_eq!(a.rating, Some(4.8));
    assert_eq!(a.trade_count, 523);
    assert_eq!(
        a.reviews,
        vec![
            "Fast shipping, item as described.".to_string(),
            "Would buy again.".to_string(),
        ]
    );
}

#[tokio::test]
async fn empty_query_and_zero_limit_are_validation_errors() {
    let (renderer, _, scout) = scout();
    let err = scout.search_market("  ", 15).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    let err = scout.search_market("thinkpad", 0).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert_eq!(renderer.render_count(), 0);
}

#[tokio::test]
async fn analyze_match_does_no_network() {
    let (renderer, _, scout) = scout();
    let detail = scout.get_item_details(LISTING_URL).await.unwrap();
    let before = renderer.render_count();

    let mut requirements = Requirements::default();
    requirements.max_price = Some(bazaar_scout::Money::new(5.0, Currency::Xmr));
    requirements
        .required_specs
        .insert("RAM".to_string(), "16GB".to_string());

    let result = scout.analyze_match(&detail, &requirements, None);
    assert_eq!(result.verdict, Verdict::Match);
    assert_eq!(renderer.render_count(), before);
}

#[tokio::test]
async fn detail_page_missing_price_surfaces_the_field() {
    let renderer = Arc::new(FakeRenderer::new(vec![(
        LISTING_URL,
        "<h1 class=\"listings-product-title\">Mystery Box</h1>",
    )]));
    let scout = MarketScout::with_clock(
        renderer,
        Config::default(),
        Arc::new(FakeClock::new()),
        XMRBAZAAR,
    );
    let err = scout.get_item_details(LISTING_URL).await.unwrap_err();
    assert_eq!(err.kind(), "missing_field");
    assert!(err.to_string().contains("price"));
}
