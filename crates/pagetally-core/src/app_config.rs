use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Root of the saved page snapshots (`orders/` and `playlist/` below it).
    pub pages_dir: PathBuf,
    /// Directory holding the persisted result blobs.
    pub store_dir: PathBuf,
    /// Exact (trimmed) text of the pagination button.
    pub show_more_label: String,
    pub pagination_settle_ms: u64,
    /// `None` keeps clicking until the control disappears.
    pub pagination_max_clicks: Option<usize>,
    pub playlist_settle_ms: u64,
    /// Separators between the "N items for $P" segment and the order date.
    pub order_delimiters: Vec<String>,
}
