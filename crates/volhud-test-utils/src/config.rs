//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values
//! without repeating boilerplate across crate boundaries.

use volhud_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .socket_path("/tmp/volhud-test.sock")
///     .hide_delay_ms(200)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn socket_path(mut self, path: &str) -> Self {
        self.config.socket.path = Some(path.to_string());
        self
    }

    pub fn fade_in_ms(mut self, ms: u64) -> Self {
        self.config.overlay.fade_in_ms = ms;
        self
    }

    pub fn fade_out_ms(mut self, ms: u64) -> Self {
        self.config.overlay.fade_out_ms = ms;
        self
    }

    pub fn hide_delay_ms(mut self, ms: u64) -> Self {
        self.config.overlay.hide_delay_ms = ms;
        self
    }

    pub fn wire_format(mut self, format: &str) -> Self {
        self.config.wire.format = format.to_string();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
