use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency of a listed price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Currency {
    Xmr,
    Btc,
    Usd,
    Eur,
    /// Currency token was present but not recognized; the raw text is kept
    /// on the Money so scoring can reject it explicitly.
    Unknown,
}

impl Currency {
    pub fn parse(token: &str) -> Currency {
        match token.trim().to_uppercase().as_str() {
            "XMR" => Currency::Xmr,
            "BTC" => Currency::Btc,
            "USD" | "$" => Currency::Usd,
            "EUR" | "€" => Currency::Eur,
            _ => Currency::Unknown,
        }
    }
}

/// A price: non-negative amount plus currency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Money {
    pub amount: f64,
    pub currency: Currency,
    /// Original price text, kept only when the currency could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Money {
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: amount.max(0.0),
            currency,
            raw: None,
        }
    }

    pub fn unparsed(raw: impl Into<String>) -> Self {
        Self {
            amount: 0.0,
            currency: Currency::Unknown,
            raw: Some(raw.into()),
        }
    }
}

/// Physical condition of a listed item, best first.
/// Ordinal: New > Excellent > Good > Fair > Unknown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Condition {
    New,
    Excellent,
    Good,
    Fair,
    Unknown,
}

impl Condition {
    pub fn parse(text: &str) -> Condition {
        let t = text.trim().to_lowercase();
        if t.contains("like new") || t.contains("excellent") || t.contains("mint") {
            Condition::Excellent
        } else if t.contains("new") {
            Condition::New
        } else if t.contains("good") {
            Condition::Good
        } else if t.contains("fair") || t.contains("used") || t.contains("worn") {
            Condition::Fair
        } else {
            Condition::Unknown
        }
    }

    /// True when this condition is at least as good as `min`.
    pub fn at_least(self, min: Condition) -> bool {
        self <= min
    }
}

/// Coarse seller reputation bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrustLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl TrustLevel {
    pub fn parse(text: &str) -> TrustLevel {
        match text.trim().to_lowercase().as_str() {
            "high" | "trusted" => TrustLevel::High,
            "medium" => TrustLevel::Medium,
            "low" => TrustLevel::Low,
            _ => TrustLevel::Unknown,
        }
    }

    pub fn at_least(self, min: TrustLevel) -> bool {
        self <= min
    }
}

/// One search result row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingSummary {
    /// Deterministic identity derived from the normalized listing URL
    pub id: String,
    pub title: String,
    pub price: Money,
    pub url: String,
    pub marketplace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Non-owning reference to a seller profile page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorRef {
    pub url: String,
}

/// Full listing record scraped from a detail page. Immutable once built;
/// a re-fetch produces a new instance that overwrites the cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingDetail {
    pub summary: ListingSummary,
    pub description: String,
    pub specs: BTreeMap<String, String>,
    pub condition: Condition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<String>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorRef>,
}

/// Seller reputation scraped from a profile page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorRating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Stars in [0, 5]; None when the page had no parseable rating
    pub rating: Option<f64>,
    pub trade_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,
    /// Most recent review texts, newest first, at most five
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<String>,
    pub trust_level: TrustLevel,
}

/// Derive the trust bucket from rating and trade volume. Used only when the
/// profile page does not state a trust level outright.
pub fn derive_trust_level(rating: Option<f64>, trade_count: u32) -> TrustLevel {
    let rating = match rating {
        Some(r) => r,
        None => return TrustLevel::Unknown,
    };
    if trade_count >= 50 && rating >= 4.0 {
        TrustLevel::High
    } else if (5..50).contains(&trade_count) && rating >= 3.5 {
        TrustLevel::Medium
    } else {
        TrustLevel::Low
    }
}

/// Buyer-supplied constraints for match analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Money>,
    #[serde(default)]
    pub required_specs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_vendor_trust: Option<TrustLevel>,
}

/// Categorical match outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Partial,
    Reject,
}

/// Result of scoring one listing against the buyer's requirements.
/// Derived only, never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// Weighted score in [0, 1]
    pub score: f64,
    pub verdict: Verdict,
    /// Explanations in the order the checks ran
    pub reasons: Vec<String>,
}
