use crate::config::types::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_extraction_config(&config.extraction)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.rate_limit_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_ms must be <= 60000ms, got {}ms",
            config.rate_limit_ms
        )));
    }

    if config.timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "timeout_ms must be >= 1000ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.max_sitemap_depth < 1 {
        return Err(ConfigError::Validation(
            "max_sitemap_depth must be >= 1".to_string(),
        ));
    }

    let patterns = [
        ("include_patterns", &config.include_patterns),
        ("exclude_patterns", &config.exclude_patterns),
    ];
    for (field, list) in patterns {
        if list.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{field} cannot contain empty patterns"
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    if let Some(email) = &config.contact_email {
        validate_email(email)?;
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.max_description_chars < 20 {
        return Err(ConfigError::Validation(format!(
            "max_description_chars must be >= 20, got {}",
            config.max_description_chars
        )));
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_crawler_bounds() {
        let mut config = Config::default();
        config.crawler.max_pages = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.max_concurrent_fetches = 101;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.timeout_ms = 10;
        assert!(validate(&config).is_err());

        // zero spacing is allowed for local runs and tests
        let mut config = Config::default();
        config.crawler.rate_limit_ms = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_url_patterns() {
        let mut config = Config::default();
        config.crawler.include_patterns = vec!["/docs/".to_string()];
        config.crawler.exclude_patterns = vec!["/blog/".to_string()];
        assert!(validate(&config).is_ok());

        config.crawler.exclude_patterns.push(" ".to_string());
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        let mut config = Config::default();
        config.crawler.include_patterns = vec![String::new()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "Bad Name!".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_contact_url() {
        let mut config = Config::default();
        config.user_agent.contact_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_output_directory() {
        let mut config = Config::default();
        config.output.directory = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
