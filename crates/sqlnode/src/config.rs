use crate::error::{OrmError, OrmResult};
use serde::Deserialize;
use std::env;

/// How pooled connections are checked before reuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recycling {
    /// Reuse without a round trip.
    #[default]
    Fast,
    /// Run a test query before reuse.
    Verified,
}

/// Database configuration for [`bind`](crate::bind).
///
/// Deserializable from any serde format; missing optional fields take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    /// Primary (read/write) connection URL.
    pub url: String,
    /// Optional read replica; read statements are routed here when set.
    #[serde(default)]
    pub replica_url: Option<String>,
    /// Maximum connections per pool. Default 16.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    #[serde(default)]
    pub recycling: Recycling,
    /// Truncate logged SQL to this many bytes. `None` logs it whole.
    #[serde(default)]
    pub log_sql_max_len: Option<usize>,
}

fn default_max_size() -> usize {
    16
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            replica_url: None,
            max_size: default_max_size(),
            recycling: Recycling::default(),
            log_sql_max_len: None,
        }
    }

    /// Read `DATABASE_URL` (required), `DATABASE_REPLICA_URL` and
    /// `DATABASE_POOL_SIZE` from the environment.
    pub fn from_env() -> OrmResult<Self> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| OrmError::config("DATABASE_URL is not set"))?;
        let mut config = Self::new(url);

        if let Ok(replica) = env::var("DATABASE_REPLICA_URL") {
            if !replica.trim().is_empty() {
                config.replica_url = Some(replica);
            }
        }
        if let Ok(size) = env::var("DATABASE_POOL_SIZE") {
            config.max_size = size.trim().parse().map_err(|_| {
                OrmError::config(format!("DATABASE_POOL_SIZE must be a number, got `{size}`"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn replica(mut self, url: impl Into<String>) -> Self {
        self.replica_url = Some(url.into());
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn recycling(mut self, recycling: Recycling) -> Self {
        self.recycling = recycling;
        self
    }

    pub fn log_sql_max_len(mut self, len: usize) -> Self {
        self.log_sql_max_len = Some(len);
        self
    }

    /// Check the configuration before any pool is created.
    pub fn validate(&self) -> OrmResult<()> {
        if self.url.trim().is_empty() {
            return Err(OrmError::config("database url is empty"));
        }
        if self.replica_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(OrmError::config("replica url is empty"));
        }
        if self.max_size == 0 {
            return Err(OrmError::config("pool max_size must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = DbConfig::new("postgres://localhost/app");
        assert_eq!(config.max_size, 16);
        assert_eq!(config.recycling, Recycling::Fast);
        assert!(config.replica_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(matches!(
            DbConfig::new(" ").validate(),
            Err(OrmError::Config(_))
        ));
        assert!(
            DbConfig::new("postgres://localhost/app")
                .max_size(0)
                .validate()
                .is_err()
        );
        assert!(
            DbConfig::new("postgres://localhost/app")
                .replica("")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: DbConfig = serde_json::from_str(
            r#"{"url": "postgres://localhost/app", "recycling": "verified"}"#,
        )
        .unwrap();
        assert_eq!(config.max_size, 16);
        assert_eq!(config.recycling, Recycling::Verified);
        assert_eq!(config.log_sql_max_len, None);
    }
}
