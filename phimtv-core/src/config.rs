use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub tmdb: TmdbConfig,
    pub backend: BackendConfig,
    pub player: PlayerConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// One upstream catalog endpoint plus the base its relative image paths
/// resolve against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub image_base: String,
}

/// Upstream content providers, in priority order: KKPhim, OPhim, NguonC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub kkphim: ProviderEndpoint,
    pub ophim: ProviderEndpoint,
    pub nguonc: ProviderEndpoint,
    /// Per-provider fetch timeout. One slow upstream must not delay the
    /// merged result beyond this bound.
    pub request_timeout_seconds: u64,
    /// Detail results are cached briefly to absorb repeated opens.
    pub detail_cache_ttl_seconds: u64,
    pub detail_cache_capacity: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            kkphim: ProviderEndpoint {
                base_url: "https://phimapi.com".to_string(),
                image_base: "https://phimimg.com/".to_string(),
            },
            ophim: ProviderEndpoint {
                base_url: "https://ophim1.com".to_string(),
                image_base: "https://img.ophim.live/uploads/movies/".to_string(),
            },
            nguonc: ProviderEndpoint {
                base_url: "https://phim.nguonc.com/api".to_string(),
                // NguonC serves absolute image URLs; base kept for parity.
                image_base: String::new(),
            },
            request_timeout_seconds: 8,
            detail_cache_ttl_seconds: 60,
            detail_cache_capacity: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub image_base: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key: String::new(),
            image_base: "https://image.tmdb.org/t/p".to_string(),
        }
    }
}

/// User-data backend (history, favorites, watchlist). Only the history
/// endpoint's upsert semantics matter to this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

/// Player tuning values. Observed product defaults, configurable rather
/// than hard invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Controls overlay auto-hide delay.
    pub controls_hide_seconds: u64,
    /// Vertical drag pixels per full brightness sweep.
    pub brightness_gesture_divisor: f64,
    /// Playback-rate cycle for the convenience toggle.
    pub playback_rates: Vec<f64>,
    /// Advance to the next episode automatically when playback ends.
    pub auto_advance: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            controls_hide_seconds: 4,
            brightness_gesture_divisor: 3000.0,
            playback_rates: vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0],
            auto_advance: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Minimum playback-position delta between progress reports.
    pub min_report_interval_ms: u64,
    /// Most recent distinct movies retained per user.
    pub history_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_report_interval_ms: 5_000,
            history_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (PHIMTV_BACKEND_BASE_URL, etc.)
        builder = builder.add_source(
            Environment::with_prefix("PHIMTV")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sync.min_report_interval_ms, 5_000);
        assert_eq!(config.sync.history_limit, 100);
        assert_eq!(config.player.controls_hide_seconds, 4);
        assert!(!config.providers.kkphim.base_url.is_empty());
        assert!(config.providers.request_timeout_seconds > 0);
    }

    #[test]
    fn test_rate_cycle_order() {
        let config = PlayerConfig::default();
        let mut sorted = config.playback_rates.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("rates are finite"));
        assert_eq!(config.playback_rates, sorted);
        assert!(config.playback_rates.contains(&1.0));
    }
}
