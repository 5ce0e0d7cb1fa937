use pagetally_core::AppConfig;
use pagetally_scraper::{DirectorySource, Dispatcher, DispatcherSettings, Request};
use pagetally_store::FileBlobStore;

/// Dispatch one protocol message against the configured pages and store,
/// printing the reply exactly as it would go over the wire.
///
/// # Errors
///
/// Returns an error if `raw` is not a valid message or the dispatcher cannot
/// be built. Failure replies are printed, not returned.
pub(crate) async fn run_send(config: &AppConfig, raw: &str) -> anyhow::Result<()> {
    let request: Request = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("invalid message '{raw}': {e}"))?;

    let dispatcher = Dispatcher::new(
        DirectorySource::new(&config.pages_dir),
        FileBlobStore::new(&config.store_dir),
        &DispatcherSettings::from_app_config(config),
    )?;
    let response = dispatcher.handle(request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
