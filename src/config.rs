//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === MongoDB Connection ===
    /// MongoDB connection string.
    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,

    /// Database name.
    #[serde(default = "default_mongo_db")]
    pub mongo_db: String,

    /// Collection holding sample documents.
    #[serde(default = "default_samples_collection")]
    pub samples_collection: String,

    /// Collection holding test documents.
    #[serde(default = "default_tests_collection")]
    pub tests_collection: String,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017/".to_string()
}

fn default_mongo_db() -> String {
    "lab_db".to_string()
}

fn default_samples_collection() -> String {
    "samples".to_string()
}

fn default_tests_collection() -> String {
    "tests".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.mongo_uri.starts_with("mongodb://") && !self.mongo_uri.starts_with("mongodb+srv://")
        {
            return Err("MONGO_URI must start with mongodb:// or mongodb+srv://".to_string());
        }

        if self.mongo_db.is_empty() {
            return Err("MONGO_DB must not be empty".to_string());
        }

        if self.samples_collection.is_empty() || self.tests_collection.is_empty() {
            return Err("collection names must not be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongo_uri: default_mongo_uri(),
            mongo_db: default_mongo_db(),
            samples_collection: default_samples_collection(),
            tests_collection: default_tests_collection(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}
