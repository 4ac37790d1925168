//! reality-radar CLI entrypoint.
//! Resolves a free-text prompt, harvests the catalog, persists the batch,
//! and prints the results ranked by gross yield. With no argument it drops
//! into an interactive prompt loop.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use reality_radar::config::AppConfig;
use reality_radar::{
    CatalogEngine, IngestionStore, MarketTable, PassthroughEnricher, ScoredListing,
    SearchPipeline, YieldAnalyst,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

fn build_pipeline(cfg: &AppConfig) -> Result<SearchPipeline> {
    let source = CatalogEngine::new(cfg.catalog_base_url.clone())?;
    let table = match &cfg.market_data_path {
        Some(path) => MarketTable::load_or_default(path),
        None => MarketTable::default(),
    };
    let analyst = YieldAnalyst::new(table, cfg.yield_target);
    let store = IngestionStore::open(&cfg.database_path)?;

    Ok(
        SearchPipeline::new(Box::new(source), Box::new(PassthroughEnricher), analyst)
            .with_store(store),
    )
}

fn print_results(results: &[ScoredListing]) {
    if results.is_empty() {
        println!("Nic nenalezeno.");
        return;
    }
    for (i, r) in results.iter().enumerate() {
        let price = r
            .listing
            .listing
            .price
            .map(|p| format!("{p} Kč"))
            .unwrap_or_else(|| "cena neuvedena".to_string());
        println!(
            "{:>3}. {} | {} | výnos {:.2} %{}",
            i + 1,
            r.listing.listing.title,
            price,
            r.metrics.gross_yield_percent,
            if r.metrics.is_good_deal { " ★" } else { "" }
        );
        println!("     {}", r.listing.listing.detail_url);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load();
    let pipeline = build_pipeline(&cfg)?;

    let prompt: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if !prompt.trim().is_empty() {
        let results = pipeline.resolve_and_search(&prompt, cfg.result_limit).await;
        print_results(&results);
        return Ok(());
    }

    // Interactive loop, cli style: one prompt per line, "exit" quits.
    println!("reality-radar — zadej dotaz (např. 'byt 2+kk Brno do 5 mil'), 'exit' končí.");
    let stdin = io::stdin();
    loop {
        print!("hledat > ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit" | "q") {
            break;
        }

        let results = pipeline.resolve_and_search(query, cfg.result_limit).await;
        print_results(&results);
    }

    Ok(())
}
