//! Playlist length and chunk commands.

use std::path::Path;

use pagetally_core::{chunk_count, chunk_hints, chunk_message, CoreError, Duration};
use pagetally_scraper::{Page, PlaylistExtractor, PlaylistSelectors, SnapshotPage};

/// Print the total length of a saved playlist page.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read, no duration badge is
/// found, or `chunk_minutes` is not positive.
pub(crate) async fn run_playlist(path: &Path, chunk_minutes: Option<i64>) -> anyhow::Result<()> {
    let page = SnapshotPage::load(path).await?;
    let extractor = PlaylistExtractor::new(&PlaylistSelectors::default())?;
    let total = extractor.measure(&page.content().await?)?;

    println!("Total: {total}");
    match chunk_minutes {
        Some(minutes) => run_chunks(&total, minutes)?,
        None => {
            for hint in chunk_hints(&total) {
                println!("{}", chunk_message(hint.chunks, hint.chunk_minutes));
            }
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if `chunk_minutes` is not positive or `total` has no
/// representable length in seconds.
pub(crate) fn run_chunks(total: &Duration, chunk_minutes: i64) -> anyhow::Result<()> {
    let chunks = chunk_count(total, chunk_minutes).map_err(|e| match e {
        CoreError::InvalidChunkSize(_) => anyhow::anyhow!("Please enter a valid chunk size. ({e})"),
        CoreError::DurationOverflow => anyhow::anyhow!("{e}"),
    })?;
    println!("{}", chunk_message(chunks, chunk_minutes));
    Ok(())
}
