use crate::playback::{EmbedTemplate, VisibilityThreshold, DEFAULT_VISIBILITY_THRESHOLD};
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use gloo_storage::{errors::StorageError, LocalStorage, Storage};

/// Error type for database operations on native platforms
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct DbError(String);

#[cfg(not(target_arch = "wasm32"))]
impl DbError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl std::error::Error for DbError {}

#[cfg(target_arch = "wasm32")]
const SITE_CONFIG_KEY: &str = "pagecast.site_config";
#[cfg(not(target_arch = "wasm32"))]
const SITE_CONFIG_ROW: &str = "site_config";

pub const COVER_PROXY_ROUTE: &str = "/api/bilibili/cover";

/// Site configuration read by the widgets and the cover proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub embed: EmbedTemplate,
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f64,
    #[serde(default)]
    pub cover_proxy: CoverProxySettings,
    #[serde(default)]
    pub heatmap: HeatmapSettings,
    #[serde(default)]
    pub featured_videos: Vec<FeaturedVideo>,
}

fn default_title() -> String {
    "pagecast".to_string()
}

fn default_visibility_threshold() -> f64 {
    DEFAULT_VISIBILITY_THRESHOLD
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            embed: EmbedTemplate::default(),
            visibility_threshold: default_visibility_threshold(),
            cover_proxy: CoverProxySettings::default(),
            heatmap: HeatmapSettings::default(),
            featured_videos: Vec::new(),
        }
    }
}

impl SiteConfig {
    pub fn threshold(&self) -> VisibilityThreshold {
        VisibilityThreshold::new(self.visibility_threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverProxySettings {
    /// Where the app reaches the proxy. Empty disables proxied covers.
    pub route: String,
    pub metadata_endpoint: String,
    pub user_agent: String,
    pub referer: String,
    pub cache_max_age_secs: u32,
}

impl Default for CoverProxySettings {
    fn default() -> Self {
        Self {
            route: COVER_PROXY_ROUTE.to_string(),
            metadata_endpoint: "https://api.bilibili.com/x/web-interface/view".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            referer: "https://www.bilibili.com".to_string(),
            cache_max_age_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    pub username: Option<String>,
    pub api_base: String,
    pub block_size: u32,
    pub block_margin: u32,
    /// 0 = Sunday, 1 = Monday.
    pub week_start: u8,
    /// Colors for contribution levels 0 through 4.
    pub theme: Vec<String>,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            username: None,
            api_base: "https://github-contributions-api.jogruber.de/v4".to_string(),
            block_size: 12,
            block_margin: 4,
            week_start: 1,
            theme: ["#161B22", "#0e4429", "#006d32", "#26a641", "#39d353"]
                .iter()
                .map(|color| color.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedVideo {
    pub bvid: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

impl FeaturedVideo {
    /// Explicit cover first, then the proxy route when one is configured.
    pub fn cover_url(&self, proxy: &CoverProxySettings) -> Option<String> {
        if let Some(cover) = self.cover.as_ref().filter(|c| !c.trim().is_empty()) {
            return Some(cover.clone());
        }
        let route = proxy.route.trim();
        if route.is_empty() || self.bvid.trim().is_empty() {
            return None;
        }
        Some(format!("{route}?bvid={}", urlencoding::encode(self.bvid.trim())))
    }
}

// Storage for native platforms

#[cfg(not(target_arch = "wasm32"))]
pub async fn initialize_database() -> Result<(), DbError> {
    let conn = get_db_connection()?;
    create_tables(&conn)
}

#[cfg(target_arch = "wasm32")]
pub async fn initialize_database() -> Result<(), StorageError> {
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn load_site_config() -> Result<SiteConfig, DbError> {
    let conn = get_db_connection()?;
    create_tables(&conn)?;
    read_site_config(&conn)
}

#[cfg(target_arch = "wasm32")]
pub async fn load_site_config() -> Result<SiteConfig, StorageError> {
    match LocalStorage::get(SITE_CONFIG_KEY) {
        Ok(config) => Ok(config),
        Err(_) => Ok(SiteConfig::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_tables(conn: &rusqlite::Connection) -> Result<(), DbError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS site_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DbError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn read_site_config(conn: &rusqlite::Connection) -> Result<SiteConfig, DbError> {
    let result: Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM site_settings WHERE key = ?1",
        [SITE_CONFIG_ROW],
        |row: &rusqlite::Row| row.get(0),
    );

    match result {
        Ok(json) => serde_json::from_str(&json).map_err(|e| DbError::new(e.to_string())),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(SiteConfig::default()),
        Err(e) => Err(DbError::new(e.to_string())),
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
fn write_site_config(conn: &rusqlite::Connection, config: &SiteConfig) -> Result<(), DbError> {
    let json = serde_json::to_string(config).map_err(|e| DbError::new(e.to_string()))?;

    conn.execute(
        "INSERT OR REPLACE INTO site_settings (key, value) VALUES (?1, ?2)",
        [SITE_CONFIG_ROW, json.as_str()],
    )
    .map_err(|e| DbError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn get_db_connection() -> Result<rusqlite::Connection, DbError> {
    let db_path = match std::env::var_os("PAGECAST_DB") {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            let data_dir = dirs::data_dir()
                .map(|dir| dir.join("pagecast"))
                .unwrap_or_else(|| std::path::PathBuf::from(".pagecast"));
            std::fs::create_dir_all(&data_dir)
                .map_err(|e| DbError::new(format!("Failed to create data directory: {}", e)))?;
            data_dir.join("pagecast.db")
        }
    };

    rusqlite::Connection::open(&db_path)
        .map_err(|e| DbError::new(format!("Failed to open database: {}", e)))
}
