use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// What to do when two distinct names in one seeding run collapse to the same slug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugCollisionPolicy {
    /// Abort the run with a slug collision error before anything is written
    Reject,
    /// Treat the second name as the member already planned for that slug
    Merge,
}

impl SlugCollisionPolicy {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(SlugCollisionPolicy::Reject),
            "merge" => Ok(SlugCollisionPolicy::Merge),
            _ => Err(format!(
                "Invalid SLUG_COLLISION_POLICY: {}. Must be one of: [\"reject\", \"merge\"]",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlugCollisionPolicy::Reject => "reject",
            SlugCollisionPolicy::Merge => "merge",
        }
    }
}

impl Default for SlugCollisionPolicy {
    fn default() -> Self {
        SlugCollisionPolicy::Reject
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub log_level: String,
    pub log_format: LogFormat,
    pub http_port: u16,
    pub environment: String,
    /// Public base URL embedded in generated links
    pub base_url: String,
    /// Directory receiving generated_links.txt / generated_links.csv
    pub links_output_dir: PathBuf,
    pub slug_collision_policy: SlugCollisionPolicy,
    pub enable_cors: bool,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/secret_santa".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let mut config = Self::from_env_without_database()?;
        config.database = database;
        Ok(config)
    }

    /// Everything except the database section; used by commands that never connect
    pub fn from_env_without_database() -> Result<Self, String> {
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(format!(
                    "Invalid LOG_FORMAT: {}. Must be one of: [\"pretty\", \"json\"]",
                    other
                ))
            }
        };

        let http_port = env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let base_url = env::var("BASE_URL")
            .or_else(|_| env::var("APP_BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let links_output_dir = env::var("LINKS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let slug_collision_policy = match env::var("SLUG_COLLISION_POLICY") {
            Ok(value) => SlugCollisionPolicy::from_str(&value)?,
            Err(_) => SlugCollisionPolicy::default(),
        };

        let enable_cors = env::var("ENABLE_CORS")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(false);

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        url::Url::parse(&base_url).map_err(|e| format!("Invalid BASE_URL {}: {}", base_url, e))?;

        Ok(Self {
            database: DatabaseConfig::default(),
            log_level: log_level.to_lowercase(),
            log_format,
            http_port,
            environment: environment.to_lowercase(),
            base_url: base_url.trim_end_matches('/').to_string(),
            links_output_dir,
            slug_collision_policy,
            enable_cors,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            http_port: 3000,
            environment: "development".to_string(),
            base_url: "http://localhost:3000".to_string(),
            links_output_dir: PathBuf::from("."),
            slug_collision_policy: SlugCollisionPolicy::Reject,
            enable_cors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.slug_collision_policy, SlugCollisionPolicy::Reject);
        assert!(config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    fn test_slug_collision_policy_parsing() {
        assert_eq!(SlugCollisionPolicy::from_str("MERGE").unwrap(), SlugCollisionPolicy::Merge);
        assert_eq!(SlugCollisionPolicy::from_str(" reject ").unwrap(), SlugCollisionPolicy::Reject);
        assert!(SlugCollisionPolicy::from_str("ignore").is_err());
        assert_eq!(SlugCollisionPolicy::Merge.as_str(), "merge");
    }
}
