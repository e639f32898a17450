use std::env;
use std::path::PathBuf;

/// Runtime configuration loaded from environment variables (`.env` honored
/// by the binaries before this is read).
#[derive(Debug, Clone)]
pub struct Config {
    pub topic: String,
    pub broker_address: String,
    pub group_id: String,
    pub message_interval_secs: u64,
    pub live_data_path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a default suitable for a local single-broker
    /// setup; values that are present but unparsable are an error rather
    /// than a silent fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let topic = env::var("KAFKA_TOPIC").unwrap_or_else(|_| "game_reviews".to_string());
        if topic.is_empty() {
            return Err(ConfigError::InvalidValue(
                "KAFKA_TOPIC cannot be empty".to_string(),
            ));
        }

        let broker_address =
            env::var("KAFKA_BROKER_ADDRESS").unwrap_or_else(|_| "localhost:9092".to_string());
        if broker_address.is_empty() {
            return Err(ConfigError::InvalidValue(
                "KAFKA_BROKER_ADDRESS cannot be empty".to_string(),
            ));
        }

        let group_id = env::var("KAFKA_CONSUMER_GROUP_ID")
            .unwrap_or_else(|_| "game_reviews_group".to_string());

        let message_interval_secs = match env::var("MESSAGE_INTERVAL_SECONDS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "MESSAGE_INTERVAL_SECONDS must be a non-negative integer, got '{}'",
                    raw
                ))
            })?,
            Err(_) => 1,
        };

        let live_data_path = env::var("LIVE_DATA_PATH")
            .unwrap_or_else(|_| "data/live_reviews.jsonl".to_string())
            .into();

        Ok(Self {
            topic,
            broker_address,
            group_id,
            message_interval_secs,
            live_data_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Only meaningful when the variables are unset, which is the normal
        // case for `cargo test`.
        if env::var("KAFKA_TOPIC").is_ok() {
            return;
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.topic, "game_reviews");
        assert_eq!(config.broker_address, "localhost:9092");
        assert_eq!(config.group_id, "game_reviews_group");
        assert_eq!(config.message_interval_secs, 1);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVariable("KAFKA_TOPIC".to_string());
        assert!(err.to_string().contains("KAFKA_TOPIC"));

        let err = ConfigError::InvalidValue("bad interval".to_string());
        assert!(err.to_string().contains("bad interval"));
    }
}
