use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub upload_dir: String,
    pub stock_splits_file: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let upload_dir = env_map
            .get("UPLOAD_DIR")
            .cloned()
            .unwrap_or_else(|| "./uploads".to_string());

        let stock_splits_file = env_map.get("STOCK_SPLITS_FILE").cloned();

        Ok(Config {
            port,
            database_path,
            upload_dir,
            stock_splits_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/test.db".to_string());
        map
    }

    #[test]
    fn test_missing_database_path() {
        let env_map = HashMap::new();
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, "./uploads");
        assert!(config.stock_splits_file.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "9090".to_string());
        env_map.insert("UPLOAD_DIR".to_string(), "/var/staging".to_string());
        env_map.insert(
            "STOCK_SPLITS_FILE".to_string(),
            "/etc/splits.json".to_string(),
        );
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.upload_dir, "/var/staging");
        assert_eq!(config.stock_splits_file.as_deref(), Some("/etc/splits.json"));
    }
}
