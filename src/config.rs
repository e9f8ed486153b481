//! Configuration for the media browser

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::pagination::{DEFAULT_LIMIT, DEFAULT_MAX_LIMIT};

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default number of directories previewed by the stats endpoint
pub const DEFAULT_STATS_PREVIEW: usize = 10;

/// Configuration for the browser
#[derive(Debug, Clone)]
pub struct BrowseConfig {
    /// Media root every request is scoped to
    pub root: PathBuf,

    /// Address the HTTP server listens on
    pub bind: SocketAddr,

    /// Page size when the request does not give a valid one
    pub default_limit: usize,

    /// Upper bound on the page size
    pub max_limit: usize,

    /// Number of directory entries included in the stats preview
    pub stats_preview: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            bind: default_bind(),
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            stats_preview: DEFAULT_STATS_PREVIEW,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

impl BrowseConfig {
    /// Create a config builder
    pub fn builder() -> BrowseConfigBuilder {
        BrowseConfigBuilder::new()
    }
}

/// Builder for BrowseConfig
#[derive(Debug, Default)]
pub struct BrowseConfigBuilder {
    config: BrowseConfig,
}

impl BrowseConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the media root
    pub fn root(mut self, root: PathBuf) -> Self {
        self.config.root = root;
        self
    }

    /// Set the listen address
    pub fn bind(mut self, bind: SocketAddr) -> Self {
        self.config.bind = bind;
        self
    }

    /// Set the default page size; zero keeps the built-in default
    pub fn default_limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.config.default_limit = limit;
        }
        self
    }

    /// Set the maximum page size; zero keeps the built-in default
    pub fn max_limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.config.max_limit = limit;
        }
        self
    }

    /// Set the number of directories in the stats preview
    pub fn stats_preview(mut self, count: usize) -> Self {
        self.config.stats_preview = count;
        self
    }

    /// Build the config. The default page size never exceeds the maximum.
    pub fn build(mut self) -> BrowseConfig {
        self.config.default_limit = self.config.default_limit.min(self.config.max_limit);
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowseConfig::default();
        assert_eq!(config.default_limit, DEFAULT_LIMIT);
        assert_eq!(config.max_limit, DEFAULT_MAX_LIMIT);
        assert_eq!(config.stats_preview, DEFAULT_STATS_PREVIEW);
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn test_config_builder() {
        let config = BrowseConfig::builder()
            .root(PathBuf::from("/photos"))
            .bind("0.0.0.0:8080".parse().unwrap())
            .default_limit(50)
            .max_limit(200)
            .stats_preview(3)
            .build();

        assert_eq!(config.root, PathBuf::from("/photos"));
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.max_limit, 200);
        assert_eq!(config.stats_preview, 3);
    }

    #[test]
    fn test_builder_keeps_limits_consistent() {
        let config = BrowseConfig::builder().default_limit(0).max_limit(20).build();
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_limit, 20);
    }
}
