#![deny(unsafe_code)]

//! Configuration loading and validation for volhud.
//!
//! Loads TOML configuration files and validates them against expected
//! schemas. Provides the [`AppConfig`] type as the central configuration
//! structure shared by the daemon and the notify client.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the daemon socket path.
pub const SOCKET_PATH_ENV: &str = "VOLUME_OVERLAY_SOCKET";

/// Last-resort socket path when no home directory is available.
pub const FALLBACK_SOCKET_PATH: &str = "/tmp/volhud.sock";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket configuration.
    #[serde(default)]
    pub socket: SocketConfig,

    /// Overlay timing and placement configuration.
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Wire-format configuration.
    #[serde(default)]
    pub wire: WireConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Daemon socket configuration.
///
/// When `path` is unset, the socket lives at `$HOME/.cache/volhud.sock`
/// (or `/tmp/volhud.sock` without a home directory). The
/// `VOLUME_OVERLAY_SOCKET` environment variable overrides both.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SocketConfig {
    /// Explicit socket path.
    #[serde(default)]
    pub path: Option<String>,
}

/// Overlay timing and placement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Fade-in duration in milliseconds.
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,

    /// Fade-out duration in milliseconds.
    #[serde(default = "default_fade_out_ms")]
    pub fade_out_ms: u64,

    /// How long the overlay stays visible after the last event, in milliseconds.
    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: u64,

    /// Vertical inset from the bottom edge of the pointer's display, in points.
    #[serde(default = "default_bottom_inset")]
    pub bottom_inset: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: default_fade_in_ms(),
            fade_out_ms: default_fade_out_ms(),
            hide_delay_ms: default_hide_delay_ms(),
            bottom_inset: default_bottom_inset(),
        }
    }
}

fn default_fade_in_ms() -> u64 {
    150
}

fn default_fade_out_ms() -> u64 {
    300
}

fn default_hide_delay_ms() -> u64 {
    2000
}

fn default_bottom_inset() -> u32 {
    80
}

/// Wire-format configuration.
///
/// The canonical format is `"lines"` (`key:value` text lines). `"json"`
/// selects the structured encoding used by older deployments; daemon and
/// client must agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireConfig {
    /// Wire format: "lines" or "json".
    #[serde(default = "default_wire_format")]
    pub format: String,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            format: default_wire_format(),
        }
    }
}

fn default_wire_format() -> String {
    "lines".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.socket.path {
            if path.is_empty() {
                return Err(ConfigError::Validation(
                    "socket.path must not be empty when set".to_string(),
                ));
            }
        }
        if self.overlay.fade_in_ms == 0 {
            return Err(ConfigError::Validation(
                "overlay.fade_in_ms must be non-zero".to_string(),
            ));
        }
        if self.overlay.fade_out_ms == 0 {
            return Err(ConfigError::Validation(
                "overlay.fade_out_ms must be non-zero".to_string(),
            ));
        }
        if self.overlay.hide_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "overlay.hide_delay_ms must be non-zero".to_string(),
            ));
        }
        let valid_formats = ["lines", "json"];
        if !valid_formats.contains(&self.wire.format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "wire.format must be one of {:?}, got {:?}",
                valid_formats, self.wire.format
            )));
        }
        Ok(())
    }

    /// Resolve the daemon socket path.
    ///
    /// Resolution order: `VOLUME_OVERLAY_SOCKET` environment variable,
    /// then `socket.path` from the config file, then a per-user cache
    /// location, then [`FALLBACK_SOCKET_PATH`].
    pub fn resolve_socket_path(&self) -> PathBuf {
        if let Ok(path) = std::env::var(SOCKET_PATH_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        if let Some(path) = &self.socket.path {
            return PathBuf::from(path);
        }
        match std::env::var("HOME") {
            Ok(home) if !home.is_empty() => {
                PathBuf::from(home).join(".cache").join("volhud.sock")
            }
            _ => PathBuf::from(FALLBACK_SOCKET_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.socket.path, None);
        assert_eq!(config.overlay.fade_in_ms, 150);
        assert_eq!(config.overlay.fade_out_ms, 300);
        assert_eq!(config.overlay.hide_delay_ms, 2000);
        assert_eq!(config.overlay.bottom_inset, 80);
        assert_eq!(config.wire.format, "lines");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = "";
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.overlay.hide_delay_ms, 2000);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [socket]
            path = "/run/user/1000/volhud.sock"

            [overlay]
            fade_in_ms = 100
            fade_out_ms = 250
            hide_delay_ms = 1500
            bottom_inset = 64

            [wire]
            format = "json"

            [logging]
            level = "debug"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(
            config.socket.path.as_deref(),
            Some("/run/user/1000/volhud.sock")
        );
        assert_eq!(config.overlay.fade_in_ms, 100);
        assert_eq!(config.overlay.fade_out_ms, 250);
        assert_eq!(config.overlay.hide_delay_ms, 1500);
        assert_eq!(config.overlay.bottom_inset, 64);
        assert_eq!(config.wire.format, "json");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_empty_socket_path() {
        let toml = r#"
            [socket]
            path = ""
        "#;
        let result = AppConfig::parse(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_zero_hide_delay() {
        let toml = r#"
            [overlay]
            hide_delay_ms = 0
        "#;
        let result = AppConfig::parse(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_zero_fade_durations() {
        assert!(AppConfig::parse("[overlay]\nfade_in_ms = 0\n").is_err());
        assert!(AppConfig::parse("[overlay]\nfade_out_ms = 0\n").is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_wire_format() {
        let toml = r#"
            [wire]
            format = "msgpack"
        "#;
        let result = AppConfig::parse(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_socket_path_prefers_config() {
        let mut config = AppConfig::default();
        config.socket.path = Some("/tmp/custom.sock".to_string());
        // Only meaningful when the env override is unset; the env-var
        // branch is covered by the CLI integration tests.
        if std::env::var(SOCKET_PATH_ENV).is_err() {
            assert_eq!(
                config.resolve_socket_path(),
                PathBuf::from("/tmp/custom.sock")
            );
        }
    }

    #[test]
    fn test_resolve_socket_path_defaults_to_cache_dir() {
        let config = AppConfig::default();
        if std::env::var(SOCKET_PATH_ENV).is_err() {
            let path = config.resolve_socket_path();
            let s = path.to_string_lossy();
            assert!(s.ends_with("volhud.sock"), "unexpected path {s}");
        }
    }

    // ── Async file-based loading ──────────────────────────────────────

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("volhud.toml");
        tokio::fs::write(&path, b"[overlay]\nhide_delay_ms = 750\n")
            .await
            .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.overlay.hide_delay_ms, 750);
    }

    #[tokio::test]
    async fn test_load_nonexistent_file() {
        let result = AppConfig::load(Path::new("/nonexistent/file.toml")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_invalid_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        tokio::fs::write(&path, b"not valid toml [[[").await.unwrap();

        let result = AppConfig::load(&path).await;
        assert!(result.is_err());
    }

    // ── Error display ─────────────────────────────────────────────────

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("bad value".to_string());
        assert_eq!(err.to_string(), "validation error: bad value");
    }
}
