use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

const CONFIG_FILE: &str = "eavesdropper/config";
const ENV_PREFIX: &str = "EAVESDROPPER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mqtt: MqttConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub keep_alive_seconds: u64,
}

impl Config {
    /// Load configuration from the optional `eavesdropper/config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from `path`, if present.
    ///
    /// Built-in defaults come first, then the file, then environment
    /// variables such as `EAVESDROPPER__MQTT__HOST`.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("mqtt.host", "127.0.0.1")?
            .set_default("mqtt.port", 1883_i64)?
            .set_default("mqtt.keep_alive_seconds", 30_i64)?
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

impl MqttConfig {
    /// Get keep alive as Duration
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_seconds)
    }
}
