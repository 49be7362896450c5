//! Client configuration

use std::path::PathBuf;

use shared::models::AssetResolver;

/// Client configuration for connecting to the site server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:5000"), also the API base
    /// stored image paths are resolved against
    pub base_url: String,

    /// JWT token for authentication (admin only)
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory holding the local settings cache
    pub cache_dir: PathBuf,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            cache_dir: std::env::temp_dir().join("site-client"),
        }
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Resolver for image references served by this server
    pub fn asset_resolver(&self) -> AssetResolver {
        AssetResolver::new(self.base_url.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://api.example.com/")
            .with_token("abc")
            .with_timeout(5)
            .with_cache_dir("/tmp/site-cache");

        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, 5);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/site-cache"));
        assert_eq!(config.asset_resolver().api_base(), "https://api.example.com");
    }
}
