//! Marketplace research tools for LLM agents: search listings, fetch item
//! details, check vendor reputation and score listings against buyer
//! requirements. The transport layer that exposes these as callable tools
//! lives elsewhere; this crate is the extraction-and-matching core.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod score;
pub mod scrapers;
pub mod tools;

pub use cache::{Cache, Clock, SystemClock};
pub use config::Config;
pub use error::{FetchKind, Result, ScoutError};
pub use models::{
    Condition, Currency, ListingDetail, ListingSummary, MatchResult, Money, Requirements,
    TrustLevel, VendorRating, VendorRef, Verdict,
};
pub use scrapers::{ChromeRenderer, MarketRules, RenderedPage, Renderer, WaitStrategy, XMRBAZAAR};
pub use tools::{MarketScout, DEFAULT_MAX_RESULTS};
