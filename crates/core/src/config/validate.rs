use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - Server port is not 0
/// - Header auth has a non-empty header name
/// - Provider URLs are non-empty
/// - Browse sizes and caps are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::Header && config.auth.identity_header.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.identity_header cannot be empty when auth.method is \"header\"".to_string(),
        ));
    }

    if config.provider.app_list_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "provider.app_list_url cannot be empty".to_string(),
        ));
    }
    if config.provider.detail_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "provider.detail_url cannot be empty".to_string(),
        ));
    }

    if config.browse.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "browse.page_size cannot be 0".to_string(),
        ));
    }
    if config.browse.fetch_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "browse.fetch_batch_size cannot be 0".to_string(),
        ));
    }
    if config.browse.search_pool_cap == 0 || config.browse.browse_pool_cap == 0 {
        return Err(ConfigError::ValidationError(
            "browse pool caps cannot be 0".to_string(),
        ));
    }
    if config.browse.suggest_limit == 0 {
        return Err(ConfigError::ValidationError(
            "browse.suggest_limit cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, BrowseConfig, CacheConfig, DatabaseConfig, ProviderConfig, ServerConfig,
    };
    use std::net::IpAddr;

    fn base_config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::None,
                identity_header: "x-user-id".to_string(),
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            provider: ProviderConfig::default(),
            browse: BrowseConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let config = base_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_header_auth_requires_header_name() {
        let mut config = base_config();
        config.auth = AuthConfig {
            method: AuthMethod::Header,
            identity_header: "  ".to_string(),
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_provider_url_fails() {
        let mut config = base_config();
        config.provider.detail_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_page_size_fails() {
        let mut config = base_config();
        config.browse.page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_batch_size_fails() {
        let mut config = base_config();
        config.browse.fetch_batch_size = 0;
        assert!(validate_config(&config).is_err());
    }
}
