//! Playlist duration badge extraction.

use pagetally_core::{aggregate_timestamps, Duration};
use scraper::{Html, Selector};

use crate::dom::{parse_selector, text_content};
use crate::error::ScraperError;

/// Selectors for the playlist markup. Badge selectors are tried in order
/// and the first one that matches any element wins.
#[derive(Debug, Clone)]
pub struct PlaylistSelectors {
    pub container: String,
    pub badges: Vec<String>,
}

impl Default for PlaylistSelectors {
    fn default() -> Self {
        Self {
            container: "ytd-playlist-video-list-renderer".to_string(),
            badges: vec![
                ".badge-shape-wiz__text".to_string(),
                "ytd-thumbnail-overlay-time-status-renderer span".to_string(),
                "span.ytd-thumbnail-overlay-time-status-renderer".to_string(),
                "span.ytp-time-duration".to_string(),
                ".ytd-thumbnail-overlay-time-status-renderer".to_string(),
            ],
        }
    }
}

#[derive(Debug)]
pub struct PlaylistExtractor {
    container: Selector,
    badges: Vec<Selector>,
}

impl PlaylistExtractor {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if any selector fails to
    /// compile.
    pub fn new(selectors: &PlaylistSelectors) -> Result<Self, ScraperError> {
        Ok(Self {
            container: parse_selector(&selectors.container)?,
            badges: selectors
                .badges
                .iter()
                .map(|css| parse_selector(css))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    /// Raw badge texts that look like timestamps (contain a `:`).
    ///
    /// Searches inside the playlist container when the page has one, the
    /// whole document otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::StructuralNotFound`] when no badge text is
    /// found.
    pub fn extract_timestamps(&self, html: &str) -> Result<Vec<String>, ScraperError> {
        let doc = Html::parse_document(html);
        let scope = doc.select(&self.container).next();

        for (idx, badge) in self.badges.iter().enumerate() {
            let texts: Vec<String> = match scope {
                Some(container) => container.select(badge).map(text_content).collect(),
                None => doc.select(badge).map(text_content).collect(),
            };
            tracing::debug!(selector = idx, found = texts.len(), "badge selector tried");
            if texts.is_empty() {
                continue;
            }

            let stamps: Vec<String> = texts
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| t.contains(':'))
                .collect();
            if stamps.is_empty() {
                break;
            }
            return Ok(stamps);
        }

        Err(ScraperError::StructuralNotFound {
            what: "video durations".to_string(),
        })
    }

    /// Total length of every video on the page.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::extract_timestamps`] failures.
    pub fn measure(&self, html: &str) -> Result<Duration, ScraperError> {
        let stamps = self.extract_timestamps(html)?;
        let total = aggregate_timestamps(&stamps);
        tracing::info!(videos = stamps.len(), total = %total.compact(), "playlist measured");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PlaylistExtractor {
        PlaylistExtractor::new(&PlaylistSelectors::default()).expect("default selectors compile")
    }

    fn badge(text: &str) -> String {
        format!(r#"<div class="badge-shape-wiz__text">{text}</div>"#)
    }

    #[test]
    fn sums_badges_inside_playlist_container() {
        let html = format!(
            "<ytd-playlist-video-list-renderer>{}{}{}</ytd-playlist-video-list-renderer>{}",
            badge("1:30"),
            badge("0:45"),
            badge("61:00"),
            badge("9:99:99"),
        );
        let total = extractor().measure(&html).unwrap();
        assert_eq!(
            total,
            Duration {
                days: 0,
                hours: 1,
                minutes: 3,
                seconds: 15
            }
        );
    }

    #[test]
    fn falls_back_to_later_selectors() {
        let html = r#"
            <ytd-thumbnail-overlay-time-status-renderer><span> 10:00 </span></ytd-thumbnail-overlay-time-status-renderer>
            <ytd-thumbnail-overlay-time-status-renderer><span>1:00:00</span></ytd-thumbnail-overlay-time-status-renderer>
        "#;
        let stamps = extractor().extract_timestamps(html).unwrap();
        assert_eq!(stamps, vec!["10:00".to_string(), "1:00:00".to_string()]);
    }

    #[test]
    fn drops_badges_without_colon() {
        let html = format!("{}{}{}", badge("LIVE"), badge("4:00"), badge("SHORTS"));
        let stamps = extractor().extract_timestamps(&html).unwrap();
        assert_eq!(stamps, vec!["4:00".to_string()]);
    }

    #[test]
    fn no_badges_is_structural_not_found() {
        let err = extractor()
            .extract_timestamps("<html><body><p>Nothing here</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, ScraperError::StructuralNotFound { .. }));
        assert_eq!(err.user_message(), "No video durations found");
    }

    #[test]
    fn only_non_timestamp_badges_is_structural_not_found() {
        let err = extractor().extract_timestamps(&badge("LIVE")).unwrap_err();
        assert!(matches!(err, ScraperError::StructuralNotFound { .. }));
    }

    #[test]
    fn malformed_timestamps_are_skipped_in_total() {
        let html = format!("{}{}", badge("5:00"), badge("a:b"));
        let total = extractor().measure(&html).unwrap();
        assert_eq!(total.total_seconds(), 300);
    }
}
