use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::stream::session::DelayProfile;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackSettings {
    /// Fixture id the replay binary streams
    pub fixture: String,
    pub delay_profile: DelayProfile,
    pub enrich_events: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("playback.fixture", "reasoning-demo")?
            .set_default("playback.delay_profile", "normal")?
            .set_default("playback.enrich_events", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("SSE_REPLAY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_load_with_defaults() {
        let settings = Settings::new().unwrap();
        assert_eq!(settings.playback.fixture, "reasoning-demo");
        assert_eq!(settings.playback.delay_profile, DelayProfile::Normal);
        assert!(settings.playback.enrich_events);
        assert_eq!(settings.logging.level, "info");
    }
}
