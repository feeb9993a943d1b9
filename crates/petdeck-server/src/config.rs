use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use petdeck_catalog::{AssetService, CatalogCache};
use petdeck_store::{AssetLayout, DEFAULT_URL_PREFIX, DEFAULT_USERS_DIR};
use petdeck_types::{AssetLimits, Member};

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::desktop_mode`].
pub const DESKTOP_MODE_ENV: &str = "PETDECK_DESKTOP_MODE";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Single-user desktop install: every caller shares the `offline` bucket.
    pub desktop_mode: bool,
    pub assets: AssetConfig,
    /// Static member table standing in for the external auth subsystem.
    pub members: Vec<MemberRecord>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            desktop_mode: false,
            assets: AssetConfig::default(),
            members: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Load from a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env();
        Ok(config)
    }

    /// Apply `PETDECK_DESKTOP_MODE` if set.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(DESKTOP_MODE_ENV) {
            self.desktop_mode = value.eq_ignore_ascii_case("true");
        }
    }

    /// Construct the asset service described by `[assets]`.
    pub fn build_service(&self) -> ServerResult<AssetService> {
        let assets = &self.assets;
        let layout = AssetLayout::new(&assets.root, &assets.users_dir, &assets.url_prefix)
            .map_err(|e| ServerError::Config(format!("assets.users_dir: {e}")))?;
        if assets.max_levels == 0 {
            return Err(ServerError::Config("assets.max_levels must be at least 1".into()));
        }
        Ok(AssetService::new(
            layout,
            assets.limits(),
            CatalogCache::new(Duration::from_secs(assets.cache_ttl_secs)),
        ))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Global pet library; user layers live beneath it.
    pub root: PathBuf,
    pub users_dir: String,
    /// URL prefix the static server mounts `root` at.
    pub url_prefix: String,
    pub cache_ttl_secs: u64,
    pub max_levels: u8,
    pub max_stage_names: usize,
    pub max_upload_bytes: usize,
}

impl Default for AssetConfig {
    fn default() -> Self {
        let limits = AssetLimits::default();
        Self {
            root: PathBuf::from("assets/pet"),
            users_dir: DEFAULT_USERS_DIR.to_string(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            cache_ttl_secs: 30,
            max_levels: limits.max_levels,
            max_stage_names: limits.max_stage_names,
            max_upload_bytes: limits.max_upload_bytes,
        }
    }
}

impl AssetConfig {
    pub fn limits(&self) -> AssetLimits {
        AssetLimits {
            max_levels: self.max_levels,
            max_stage_names: self.max_stage_names,
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// A member reachable through a session token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemberRecord {
    pub token: String,
    pub id: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl MemberRecord {
    pub fn member(&self) -> Member {
        Member {
            id: self.id,
            is_active: self.active,
            expires_at: self.expires_at,
        }
    }
}
