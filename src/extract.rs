//! Turns rendered marketplace pages into structured records.
//!
//! Stateless and reentrant: every function takes the page and the rule table
//! and returns owned data. Which elements mean what is decided entirely by
//! the `MarketRules` passed in.

use crate::cache::normalize_listing_url;
use crate::error::{Result, ScoutError};
use crate::models::{
    derive_trust_level, Condition, Currency, ListingDetail, ListingSummary, Money, TrustLevel,
    VendorRating, VendorRef,
};
use crate::scrapers::rules::MarketRules;
use crate::scrapers::traits::RenderedPage;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

const MAX_IMAGES: usize = 10;
const MAX_REVIEWS: usize = 5;

fn sel(selector: &'static str) -> Selector {
    // Rule-table selectors are compile-time constants
    Selector::parse(selector).unwrap()
}

fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn first_text(doc: &Html, selector: &'static str) -> Option<String> {
    doc.select(&sel(selector))
        .map(|el| text_of(&el))
        .find(|t| !t.is_empty())
}

/// Deterministic listing identity: digest of the normalized, query-stripped
/// URL, so every fetch of the same listing maps to the same id.
pub fn listing_id(url: &str) -> String {
    let canonical = normalize_listing_url(url);
    let digest = Sha256::digest(canonical.as_bytes());
    let mut id = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        id.push_str(&format!("{:02x}", byte));
    }
    id
}

/// Pull search-result summaries out of a rendered search page, in document
/// order, truncated to `max_results`.
pub fn extract_summaries(
    page: &RenderedPage,
    rules: &MarketRules,
    max_results: usize,
) -> Result<Vec<ListingSummary>> {
    if max_results == 0 {
        return Err(ScoutError::Validation(
            "max_results must be greater than zero".into(),
        ));
    }

    let doc = Html::parse_document(&page.html);
    let mut summaries = Vec::new();

    for card in doc.select(&sel(rules.summary.card)) {
        if summaries.len() >= max_results {
            break;
        }

        let title = card
            .select(&sel(rules.summary.title))
            .map(|el| text_of(&el))
            .find(|t| !t.is_empty());
        let href = card
            .select(&sel(rules.summary.link))
            .find_map(|el| el.value().attr("href"))
            .map(|h| rules.absolute_url(h));

        let (title, url) = match (title, href) {
            (Some(t), Some(u)) => (t, u),
            _ => {
                warn!("Skipped a result card missing title or link");
                continue;
            }
        };

        let price = card
            .select(&sel(rules.summary.price))
            .map(|el| text_of(&el))
            .find(|t| !t.is_empty())
            .map(|t| parse_price(&t).unwrap_or_else(|| Money::unparsed(t)))
            .unwrap_or_else(|| Money::unparsed(""));

        let thumbnail = card
            .select(&sel(rules.summary.thumbnail))
            .find_map(|el| el.value().attr("src"))
            .map(str::to_string);

        summaries.push(ListingSummary {
            id: listing_id(&url),
            title,
            price,
            url,
            marketplace: rules.id.to_string(),
            thumbnail,
        });
    }

    debug!("Extracted {} summaries", summaries.len());
    Ok(summaries)
}

/// Build a full `ListingDetail` from a rendered listing page. Title and
/// price are mandatory; everything else degrades to Unknown or empty.
pub fn extract_detail(page: &RenderedPage, rules: &MarketRules) -> Result<ListingDetail> {
    let doc = Html::parse_document(&page.html);

    let title =
        first_text(&doc, rules.detail.title).ok_or(ScoutError::MissingField { field: "title" })?;

    // Join every price-like element in document order so the label
    // proximity tie-break sees all candidates at once.
    let price_text = doc
        .select(&sel(rules.detail.price))
        .map(|el| text_of(&el))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let price =
        parse_price(&price_text).ok_or(ScoutError::MissingField { field: "price" })?;

    let description = first_text(&doc, rules.detail.description).unwrap_or_default();

    let mut specs = BTreeMap::new();
    for row in doc.select(&sel(rules.detail.spec_rows)) {
        let text = text_of(&row);
        if text.is_empty() {
            continue;
        }
        match text.split_once(':') {
            Some((k, v)) if !k.trim().is_empty() && !v.trim().is_empty() => {
                specs.insert(k.trim().to_string(), v.trim().to_string());
            }
            // Bare category badge with no label
            _ => {
                specs.entry("Category".to_string()).or_insert(text);
            }
        }
    }

    let condition = first_text(&doc, rules.detail.condition)
        .map(|t| Condition::parse(&t))
        .unwrap_or(Condition::Unknown);

    let shipping = first_text(&doc, rules.detail.shipping);

    let images: Vec<String> = doc
        .select(&sel(rules.detail.images))
        .filter_map(|el| el.value().attr("src"))
        .map(str::to_string)
        .take(MAX_IMAGES)
        .collect();

    let vendor = doc.select(&sel(rules.detail.vendor_link)).find_map(|el| {
        el.value()
            .attr("href")
            .or_else(|| {
                el.select(&sel("a"))
                    .find_map(|a| a.value().attr("href"))
            })
            .map(|href| VendorRef {
                url: rules.absolute_url(href),
            })
    });

    let url = page.final_url.clone();
    Ok(ListingDetail {
        summary: ListingSummary {
            id: listing_id(&url),
            title,
            price,
            url,
            marketplace: rules.id.to_string(),
            thumbnail: images.first().cloned(),
        },
        description,
        specs,
        condition,
        shipping,
        images,
        vendor,
    })
}

/// Read a vendor profile page. Nothing here is mandatory; unparseable
/// fields degrade and the trust bucket falls back to the derived value.
pub fn extract_vendor_profile(page: &RenderedPage, rules: &MarketRules) -> VendorRating {
    let doc = Html::parse_document(&page.html);

    let username = first_text(&doc, rules.vendor.username);
    let rating = first_text(&doc, rules.vendor.rating).and_then(|t| parse_rating(&t));
    let trade_count = first_text(&doc, rules.vendor.trades)
        .and_then(|t| parse_first_uint(&t))
        .unwrap_or(0);
    let member_since = first_text(&doc, rules.vendor.member_since);

    let reviews: Vec<String> = doc
        .select(&sel(rules.vendor.reviews))
        .map(|el| text_of(&el))
        .filter(|t| !t.is_empty())
        .take(MAX_REVIEWS)
        .collect();

    // Trust text printed on the page wins over the derived bucket
    let scraped_trust = first_text(&doc, rules.vendor.trust)
        .map(|t| TrustLevel::parse(&t))
        .filter(|t| *t != TrustLevel::Unknown);
    let trust_level = scraped_trust.unwrap_or_else(|| derive_trust_level(rating, trade_count));

    VendorRating {
        username,
        rating,
        trade_count,
        member_since,
        reviews,
        trust_level,
    }
}

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:(?P<presym>[$€])\s*(?P<preamt>\d[\d,]*(?:\.\d+)?))|(?:(?P<postamt>\d[\d,]*(?:\.\d+)?)\s*(?P<postcur>xmr|btc|usd|eur|[$€]))",
        )
        .unwrap()
    })
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(price|cost|asking)\b").unwrap())
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap())
}

/// Among candidate match offsets, pick the one nearest any label; ties go
/// to the earlier token. Without labels the first candidate wins.
fn nearest_to_label(starts: &[usize], labels: &[usize]) -> usize {
    if labels.is_empty() {
        return 0;
    }
    starts
        .iter()
        .enumerate()
        .min_by_key(|(_, start)| {
            let distance = labels
                .iter()
                .map(|l| start.abs_diff(*l))
                .min()
                .unwrap_or(usize::MAX);
            (distance, **start)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Parse a price out of free text. When several price-like tokens appear,
/// the one nearest a price/cost/asking label wins; without any label the
/// first token wins. Both rules are deterministic for a given input.
///
/// A number with no recognizable currency token still parses, as an amount
/// flagged `Currency::Unknown` with the raw text kept, so scoring can
/// reject it explicitly instead of extraction failing.
pub fn parse_price(text: &str) -> Option<Money> {
    let labels: Vec<usize> = label_re().find_iter(text).map(|m| m.start()).collect();

    let candidates: Vec<_> = money_re().captures_iter(text).collect();
    if !candidates.is_empty() {
        let starts: Vec<usize> = candidates
            .iter()
            .map(|cap| cap.get(0).map(|m| m.start()).unwrap_or(0))
            .collect();
        let chosen = &candidates[nearest_to_label(&starts, &labels)];

        let (amount_str, currency_token) = if let Some(amt) = chosen.name("preamt") {
            (amt.as_str(), chosen.name("presym").map(|m| m.as_str()))
        } else {
            (
                chosen.name("postamt").map(|m| m.as_str()).unwrap_or("0"),
                chosen.name("postcur").map(|m| m.as_str()),
            )
        };
        let amount: f64 = amount_str.replace(',', "").parse().ok()?;
        let currency = currency_token.map(Currency::parse).unwrap_or(Currency::Unknown);
        if currency == Currency::Unknown {
            let mut money = Money::unparsed(text.trim());
            money.amount = amount;
            return Some(money);
        }
        return Some(Money::new(amount, currency));
    }

    // No currency token anywhere; fall back to a bare numeric token
    let numbers: Vec<_> = number_re().find_iter(text).collect();
    if numbers.is_empty() {
        return None;
    }
    let starts: Vec<usize> = numbers.iter().map(|m| m.start()).collect();
    let chosen = &numbers[nearest_to_label(&starts, &labels)];
    let amount: f64 = chosen.as_str().replace(',', "").parse().ok()?;
    let mut money = Money::unparsed(text.trim());
    money.amount = amount;
    Some(money)
}

fn parse_rating(text: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());
    let value: f64 = re.find(text)?.as_str().parse().ok()?;
    (0.0..=5.0).contains(&value).then_some(value)
}

fn parse_first_uint(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+").unwrap());
    re.find(text)?.as_str().parse().ok()
}
