use bazaar_scout::{ChromeRenderer, Config, MarketScout, Requirements, DEFAULT_MAX_RESULTS};
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| "laptop".to_string());

    info!("Bazaar Scout - marketplace research");
    info!("===================================");

    let config = Config::default();
    let renderer = Arc::new(ChromeRenderer::new(config.headless)?);
    let scout = MarketScout::new(renderer, config);

    info!("Searching for: {}", query);
    let results = scout.search_market(&query, DEFAULT_MAX_RESULTS).await?;
    info!("Found {} listings", results.len());

    for (i, listing) in results.iter().enumerate() {
        println!(
            "{}. {} ({} {:?})",
            i + 1,
            listing.title,
            listing.price.amount,
            listing.price.currency
        );
        println!("   ID: {}", listing.id);
        println!("   URL: {}", listing.url);
        println!();
    }

    // Deep-dive the first hit and score it against an empty requirement set
    if let Some(first) = results.first() {
        let detail = scout.get_item_details(&first.url).await?;
        let verdict = scout.analyze_match(&detail, &Requirements::default(), None);
        println!(
            "First listing `{}` scores {:.2} -> {:?}",
            detail.summary.title, verdict.score, verdict.verdict
        );

        let json = serde_json::to_string_pretty(&detail)?;
        println!("{}", json);
    }

    Ok(())
}
