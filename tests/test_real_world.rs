use recipe_sync::{RecipeBrowser, SearchOutcome};
use std::env;

#[tokio::test]
#[ignore] // This test requires network access
async fn test_themealdb_search() {
    env::set_var("RUST_LOG", "debug");
    let _ = env_logger::try_init();

    let browser = RecipeBrowser::builder().build().unwrap();
    match browser.initialize().await {
        Ok(count) => println!("Loaded {count} recipes"),
        Err(e) => panic!("Failed to load recipes: {e}"),
    }

    assert!(matches!(
        browser.search("Arrabiata").await,
        SearchOutcome::Applied(_)
    ));
    let results = browser.effective_list();
    assert!(results.iter().any(|r| r.title.contains("Arrabiata")));
    assert!(results.iter().all(|r| r
        .ingredients
        .iter()
        .all(|line| !line.trim().is_empty())));
}
