pub mod browser;
pub mod fetcher;
pub mod rules;
pub mod traits;

pub use browser::ChromeRenderer;
pub use fetcher::PageFetcher;
pub use rules::{MarketRules, XMRBAZAAR};
pub use traits::{RenderedPage, Renderer, WaitStrategy};
