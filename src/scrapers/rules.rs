//! Per-marketplace extraction rules.
//!
//! All site knowledge lives in these tables: CSS selectors per field plus
//! the search URL shape. Supporting another marketplace means adding a
//! `MarketRules` value here, not touching the extractor.

/// Selectors for one search-result card
#[derive(Debug, Clone)]
pub struct SummaryRules {
    /// One element per listing, in document order
    pub card: &'static str,
    pub title: &'static str,
    pub price: &'static str,
    pub link: &'static str,
    pub thumbnail: &'static str,
}

/// Selectors for a listing detail page
#[derive(Debug, Clone)]
pub struct DetailRules {
    pub title: &'static str,
    pub price: &'static str,
    pub description: &'static str,
    /// Key-value spec rows; each match contributes label text → value text
    pub spec_rows: &'static str,
    pub condition: &'static str,
    pub shipping: &'static str,
    pub images: &'static str,
    pub vendor_link: &'static str,
}

/// Selectors for a vendor profile page
#[derive(Debug, Clone)]
pub struct VendorRules {
    pub username: &'static str,
    pub rating: &'static str,
    pub trades: &'static str,
    pub member_since: &'static str,
    pub reviews: &'static str,
    pub trust: &'static str,
}

/// Everything the pipeline needs to know about one marketplace
#[derive(Debug, Clone)]
pub struct MarketRules {
    pub id: &'static str,
    pub base_url: &'static str,
    /// `{query}` placeholder is replaced with the url-encoded search term
    pub search_url: &'static str,
    pub summary: SummaryRules,
    pub detail: DetailRules,
    pub vendor: VendorRules,
}

impl MarketRules {
    pub fn search_url_for(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_url.replace("{query}", &encoded)
    }

    /// Resolve a possibly relative href against the marketplace base
    pub fn absolute_url(&self, href: &str) -> String {
        if href.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), href)
        } else {
            href.to_string()
        }
    }
}

/// XMRBazaar, the marketplace the pipeline was built against
pub const XMRBAZAAR: MarketRules = MarketRules {
    id: "xmrbazaar.com",
    base_url: "https://xmrbazaar.com",
    search_url: "https://xmrbazaar.com/search/?q={query}",
    summary: SummaryRules {
        card: ".listings-product",
        title: ".listing-title-text",
        price: ".listings-product-price-value",
        link: "a",
        thumbnail: ".listings-product-img img",
    },
    detail: DetailRules {
        title: ".listings-product-title, h1, [class*='title']",
        price: ".listings-product-price-value, [class*='price']",
        description: ".listing-description, [class*='description'], .content",
        spec_rows: ".listing-specs li, .listing-category, [class*='category']",
        condition: ".listing-condition, [class*='condition']",
        shipping: ".listing-delivery, [class*='delivery'], .listing-location",
        images: "img[class*='product'], .gallery img",
        vendor_link: ".listings-product-username, [class*='username'], .seller-name",
    },
    vendor: VendorRules {
        username: "h1, [class*='username'], .profile-name",
        rating: "[class*='rating'], .stars",
        trades: "[class*='trades'], .completed",
        member_since: "[class*='joined'], .member-since",
        reviews: ".review-text, [class*='review']",
        trust: "[class*='trust-level'], .trust-badge",
    },
};
