use serde::Deserialize;
use std::env;

/// Countdown length for one round, in seconds, unless overridden in config.
pub const DEFAULT_ROUND_SECONDS: u32 = 10;

/// Streak value at which boss-variant feedback kicks in. The check uses the
/// post-increment streak on success and the pre-reset streak on failure.
pub const BOSS_STREAK_THRESHOLD: u32 = 5;

/// Streak thresholds for the difficulty ramp (Easy below MEDIUM, Hard at HARD).
pub const MEDIUM_TIER_STREAK: u32 = 10;
pub const HARD_TIER_STREAK: u32 = 20;

/// Absolute tolerance when comparing a numeric answer to the correct one.
/// Absorbs floating-point noise from division results.
pub const ANSWER_TOLERANCE: f64 = 0.001;

/// Number of entries returned by a leaderboard read.
pub const LEADERBOARD_SIZE: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// MongoDB connection string. Absent means the persistence layer is
    /// unconfigured and leaderboard/suggestions/votes run in degraded mode.
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    /// Base URL of the feedback generation service.
    pub generator_url: String,
    pub round_seconds: u32,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            // Fallback to current directory .env for backward compatibility
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            // Load base config from TOML file
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        // Persistence is optional: without a URI the API still serves the
        // game loop and degrades leaderboard/suggestions/votes.
        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .ok();
        if mongo_uri.is_none() {
            eprintln!("WARNING: MONGO_URI not set, persistence runs in degraded mode");
        }

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "savagemath".to_string());

        let generator_url = settings
            .get_string("generator.url")
            .or_else(|_| env::var("GENERATOR_URL"))
            .unwrap_or_else(|_| "http://localhost:9400".to_string());

        let round_seconds = settings
            .get_string("game.round_seconds")
            .or_else(|_| env::var("ROUND_SECONDS"))
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_ROUND_SECONDS);

        Ok(Config {
            mongo_uri,
            mongo_database,
            generator_url,
            round_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn round_seconds_falls_back_to_default() {
        std::env::set_var("SKIP_ROOT_ENV", "1");
        std::env::remove_var("ROUND_SECONDS");
        let config = Config::load().unwrap();
        assert_eq!(config.round_seconds, DEFAULT_ROUND_SECONDS);
        std::env::remove_var("SKIP_ROOT_ENV");
    }

    #[test]
    #[serial]
    fn round_seconds_rejects_zero() {
        std::env::set_var("SKIP_ROOT_ENV", "1");
        std::env::set_var("ROUND_SECONDS", "0");
        let config = Config::load().unwrap();
        assert_eq!(config.round_seconds, DEFAULT_ROUND_SECONDS);
        std::env::remove_var("ROUND_SECONDS");
        std::env::remove_var("SKIP_ROOT_ENV");
    }

    #[test]
    #[serial]
    fn missing_mongo_uri_means_degraded_mode() {
        std::env::set_var("SKIP_ROOT_ENV", "1");
        std::env::remove_var("MONGO_URI");
        let config = Config::load().unwrap();
        assert!(config.mongo_uri.is_none());
        std::env::remove_var("SKIP_ROOT_ENV");
    }
}
