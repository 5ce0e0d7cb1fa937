//! Order history commands: tally a snapshot, or show the persisted tally.

use std::path::Path;
use std::time::Duration;

use pagetally_core::{AggregateResult, AppConfig};
use pagetally_scraper::{
    OrderExtractor, OrderSelectors, Page, PaginationDriver, SnapshotPage, ORDER_HISTORY_KEY,
};
use pagetally_store::FileBlobStore;

/// Replay a saved order history, clicking through every load-more frame,
/// then print the tally.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read, the selectors do not
/// compile, or no order could be extracted.
pub(crate) async fn run_orders(
    config: &AppConfig,
    path: &Path,
    json: bool,
    label: Option<&str>,
    settle_ms: Option<u64>,
) -> anyhow::Result<()> {
    let mut page = SnapshotPage::load(path).await?;

    let driver = PaginationDriver::new(
        label.unwrap_or(&config.show_more_label),
        Duration::from_millis(settle_ms.unwrap_or(config.pagination_settle_ms)),
        config.pagination_max_clicks,
    );
    driver.load_all(&mut page).await;

    let selectors = OrderSelectors {
        delimiters: config.order_delimiters.clone(),
        ..OrderSelectors::default()
    };
    let extractor = OrderExtractor::new(&selectors)?;
    let result = extractor.extract(&page.content().await?);

    if let Some(error) = &result.error {
        anyhow::bail!("{error}");
    }

    print_result(&result, json)
}

/// Print the last tally persisted by a scrape.
///
/// # Errors
///
/// Returns an error if the stored blob cannot be read or decoded.
pub(crate) async fn run_results(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let store = FileBlobStore::new(&config.store_dir);
    let stored: Option<AggregateResult> =
        pagetally_store::get_json(&store, ORDER_HISTORY_KEY).await?;

    match stored {
        Some(result) => print_result(&result, json),
        None => {
            println!(
                "no results stored in {}; run `send '{{\"action\":\"startScraping\"}}'` first",
                store.dir().display()
            );
            Ok(())
        }
    }
}

fn print_result(result: &AggregateResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    for line in render_table(result) {
        println!("{line}");
    }
    Ok(())
}

/// Per-restaurant rows, highest spend first, followed by a total line.
pub(crate) fn render_table(result: &AggregateResult) -> Vec<String> {
    let mut lines = vec![format!("{:<32}{:>8}{:>12}", "RESTAURANT", "VISITS", "TOTAL")];
    for (name, aggregate) in result.restaurants_by_spend() {
        lines.push(format!(
            "{:<32}{:>8}{:>12}",
            truncate(name, 30),
            aggregate.visits,
            format_money(aggregate.total)
        ));
    }
    lines.push(format!(
        "{:<32}{:>8}{:>12}",
        "ALL",
        result.order_count(),
        format_money(result.total)
    ));
    lines
}

fn format_money(amount: rust_decimal::Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        format!("{}...", name.chars().take(max - 3).collect::<String>())
    } else {
        name.to_string()
    }
}
