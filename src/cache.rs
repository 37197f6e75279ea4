use crate::models::{ListingDetail, ListingSummary, VendorRating};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use url::Url;

/// Time source injected into the cache so tests can drive TTL expiry with a
/// fake clock instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Everything the scrape pipeline caches
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Summaries(Vec<ListingSummary>),
    Detail(ListingDetail),
    Vendor(VendorRating),
}

struct CacheEntry {
    value: CachedValue,
    expires_at: DateTime<Utc>,
}

/// Time-bounded store keyed by normalized URL or query. Entries are evicted
/// lazily on read; concurrent puts to the same key overwrite, last one wins.
pub struct Cache {
    entries: DashMap<String, CacheEntry>,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str, clock: &dyn Clock) -> Option<CachedValue> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if clock.now() >= entry.expires_at {
                    true
                } else {
                    return Some(entry.value.clone());
                }
            }
            None => return None,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: String, value: CachedValue, ttl_secs: u64, clock: &dyn Clock) {
        let expires_at = clock.now() + Duration::seconds(ttl_secs as i64);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters that vary per visit without changing page content
const TRACKING_PARAMS: &[&str] = &["ref", "fbclid", "gclid", "mc_cid", "mc_eid"];

/// Canonical cache key for a URL: lowercase scheme and host, tracking query
/// parameters stripped, trailing slash dropped. URLs that normalize the
/// same way hit the same entry. Unparseable input falls back to the raw
/// string so it still caches consistently with itself.
pub fn normalize_url(raw: &str) -> String {
    let mut url = match Url::parse(raw.trim()) {
        Ok(u) => u,
        Err(_) => return raw.trim().to_string(),
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.as_ref()) && !k.starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    // Url already lowercases scheme and host on parse
    let mut out = url.to_string();
    if out.ends_with('/') {
        out.pop();
    }
    out
}

/// Same normalization minus the query string entirely; listing identity must
/// not depend on which search led to the page.
pub fn normalize_listing_url(raw: &str) -> String {
    let mut url = match Url::parse(raw.trim()) {
        Ok(u) => u,
        Err(_) => return raw.trim().to_string(),
    };
    url.set_query(None);
    url.set_fragment(None);
    let mut out = url.to_string();
    if out.ends_with('/') {
        out.pop();
    }
    out
}
