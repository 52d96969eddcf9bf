use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use endpoint_ripple::config::load_config;
///
/// let config = load_config(Path::new("ripple.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses the `--headers` argument
///
/// The value must be a JSON object whose values are all strings, for example
/// `{"User-Agent": "CustomBot", "Authorization": "Bearer abc"}`. Anything else
/// (arrays, nested objects, numbers, trailing garbage) is rejected. The text is
/// only ever deserialized as data.
///
/// # Returns
///
/// * `Ok(BTreeMap)` - Header names mapped to values
/// * `Err(ConfigError::Headers)` - The argument is not a flat string object
///
/// # Example
///
/// ```
/// use endpoint_ripple::config::parse_headers;
///
/// let headers = parse_headers(r#"{"User-Agent": "CustomBot"}"#).unwrap();
/// assert_eq!(headers["User-Agent"], "CustomBot");
///
/// assert!(parse_headers("__import__('os')").is_err());
/// ```
pub fn parse_headers(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::Headers(
            "expected a JSON object, got an empty string".to_string(),
        ));
    }

    serde_json::from_str::<BTreeMap<String, String>>(raw)
        .map_err(|e| ConfigError::Headers(format!("expected a JSON object of strings: {}", e)))
}

/// Merges command-line headers over the headers from the config file
///
/// Names are compared case-insensitively, so `user-agent` on the command line
/// replaces `User-Agent` from the file.
pub fn merge_headers(config: &mut Config, overrides: BTreeMap<String, String>) {
    for (name, value) in overrides {
        config
            .headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        config.headers.insert(name, value);
    }
}
