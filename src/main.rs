use log::{error, info};
use std::env;

use recipe_sync::{RecipeBrowser, SearchOutcome, SyncConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional search keyword from command-line arguments
    let keyword = env::args().skip(1).collect::<Vec<_>>().join(" ");

    let config = SyncConfig::load()?;
    info!("Using meal API at {}", config.api_base_url);
    let browser = RecipeBrowser::builder().config(config).build()?;

    if let Err(e) = browser.initialize().await {
        // The store keeps whatever it had; report and carry on
        error!("Could not load recipes: {}", e);
    }

    if !keyword.trim().is_empty() {
        match browser.search(&keyword).await {
            SearchOutcome::Failed(_) => {
                let message = browser.store().error().unwrap_or_default();
                error!("{}", message);
            }
            outcome => info!("Search for '{}': {:?}", keyword, outcome),
        }
    }

    for recipe in browser.effective_list() {
        println!("{}\t{}\t{}", recipe.id, recipe.title, recipe.category);
        for ingredient in &recipe.ingredients {
            println!("\t- {}", ingredient);
        }
    }

    Ok(())
}
