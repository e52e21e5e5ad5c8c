//! Service configuration from environment variables

use std::env;

/// Service-level configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Cron expression for the inactive-user deactivation job
    pub deactivation_schedule: String,
    /// Days without a login before a user is flagged inactive
    pub inactivity_days: i64,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    pub fn from_env() -> Self {
        AppConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            // Default to 03:00 UTC every day
            deactivation_schedule: env::var("DEACTIVATION_SCHEDULE")
                .unwrap_or_else(|_| "0 0 3 * * *".to_string()),
            inactivity_days: env::var("INACTIVITY_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_without_environment() {
        unsafe {
            env::remove_var("BIND_ADDR");
            env::remove_var("DEACTIVATION_SCHEDULE");
            env::remove_var("INACTIVITY_DAYS");
        }
        let config = AppConfig::from_env();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.inactivity_days, 30);
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        unsafe {
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
            env::set_var("INACTIVITY_DAYS", "14");
        }
        let config = AppConfig::from_env();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.inactivity_days, 14);
        unsafe {
            env::remove_var("BIND_ADDR");
            env::remove_var("INACTIVITY_DAYS");
        }
    }
}
