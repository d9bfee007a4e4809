//! Configuration builder for flexible configuration loading

use crate::{Config, ConfigError, ConfigResult};
use config::{ConfigBuilder as ConfigBuilderInner, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration builder for loading configuration from multiple sources
#[derive(Debug)]
pub struct ConfigBuilder {
    inner: ConfigBuilderInner<config::builder::DefaultState>,
    sources: Vec<ConfigSource>,
    env_separator: String,
}

#[derive(Debug, Clone)]
enum ConfigSource {
    File { path: PathBuf, format: FileFormat },
    Environment { prefix: String },
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            inner: config::Config::builder(),
            sources: Vec::new(),
            env_separator: "__".to_string(),
        }
    }

    /// Add a configuration file source; missing files are ignored
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = Self::detect_format(&path);
        self.sources.push(ConfigSource::File { path, format });
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.sources.push(ConfigSource::Environment {
            prefix: prefix.into(),
        });
        self
    }

    /// Set environment variable separator (default: "__")
    pub fn env_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.env_separator = separator.into();
        self
    }

    /// Build the configuration
    pub fn build(mut self) -> ConfigResult<Config> {
        // Defaults are always the base layer
        let defaults_value = serde_yaml::to_value(Config::default())
            .map_err(|e| ConfigError::other(format!("Failed to serialize defaults: {}", e)))?;
        self.inner = self
            .inner
            .add_source(config::Config::try_from(&defaults_value)?);

        for source in &self.sources {
            match source {
                ConfigSource::File { path, format } => {
                    if path.exists() {
                        self.inner = self
                            .inner
                            .add_source(File::from(path.clone()).format(*format));
                    }
                }
                ConfigSource::Environment { prefix } => {
                    self.inner = self.inner.add_source(
                        Environment::with_prefix(prefix).separator(&self.env_separator),
                    );
                }
            }
        }

        let config = self.inner.build()?;
        let result: Config = config.try_deserialize()?;

        Self::validate(&result)?;

        Ok(result)
    }

    /// Detect file format from extension
    fn detect_format(path: &Path) -> FileFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }

    /// Validate the configuration
    pub fn validate(config: &Config) -> ConfigResult<()> {
        Self::validate_url("Remote base URL", &config.remote.base_url)?;
        Self::validate_url("Header service URL", &config.header.base_url)?;

        if config.remote.connect_timeout_secs == 0 || config.remote.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "Remote timeouts must be greater than 0",
            ));
        }

        if config.scan.max_concurrent_reads == 0 {
            return Err(ConfigError::validation(
                "Maximum concurrent reads must be greater than 0",
            ));
        }

        if config.scan.reserved_manifest_file.trim().is_empty() {
            return Err(ConfigError::validation(
                "Reserved manifest file name must not be empty",
            ));
        }

        if config.header.marker.trim().is_empty() || config.header.search_lines == 0 {
            return Err(ConfigError::validation(
                "Header marker must not be empty and search_lines must be greater than 0",
            ));
        }

        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::validation(
                "Log level must be one of: trace, debug, info, warn, error",
            ));
        }

        Ok(())
    }

    fn validate_url(name: &str, url: &str) -> ConfigResult<()> {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::validation(format!(
                "{} must start with http:// or https://, got '{}'",
                name, url
            )))
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_builder_yaml_file() {
        let mut temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            temp_file,
            r#"
remote:
  base_url: "http://graph.internal:8080/api/graph"
  request_timeout_secs: 30
scan:
  excluded_dirs: ["node_modules", "target"]
  max_concurrent_reads: 4
"#
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .add_source_file(temp_file.path())
            .build()
            .unwrap();

        assert_eq!(config.remote.base_url, "http://graph.internal:8080/api/graph");
        assert_eq!(config.remote.request_timeout_secs, 30);
        assert_eq!(config.remote.connect_timeout_secs, 10);
        assert_eq!(config.scan.excluded_dirs, vec!["node_modules", "target"]);
        assert_eq!(config.scan.max_concurrent_reads, 4);
        assert_eq!(config.scan.reserved_manifest_file, ".graphrag-manifest.json");
    }

    #[test]
    fn test_builder_toml_file() {
        let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            temp_file,
            r#"
[logging]
level = "debug"
json_format = true
"#
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .add_source_file(temp_file.path())
            .build()
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let config = ConfigBuilder::new()
            .add_source_file("/definitely/not/here/graphsync.yaml")
            .build()
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_builder_validation() {
        let mut temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            temp_file,
            r#"
scan:
  max_concurrent_reads: 0
"#
        )
        .unwrap();

        let result = ConfigBuilder::new()
            .add_source_file(temp_file.path())
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Maximum concurrent reads must be greater than 0"));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = Config::default();
        config.remote.base_url = "ftp://example.com".to_string();
        assert!(ConfigBuilder::validate(&config).is_err());

        let mut config = Config::default();
        config.header.base_url = "localhost:8000".to_string();
        let error = ConfigBuilder::validate(&config).unwrap_err();
        assert!(error.to_string().contains("Header service URL"));
    }

    #[test]
    fn test_rejects_empty_header_marker() {
        let mut config = Config::default();
        config.header.marker = "  ".to_string();
        assert!(ConfigBuilder::validate(&config).is_err());

        let mut config = Config::default();
        config.header.search_lines = 0;
        assert!(ConfigBuilder::validate(&config).is_err());
    }

    #[test]
    fn test_header_section_from_file() {
        let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            temp_file,
            r#"
[header]
base_url = "http://docs.internal:8000"
marker = "DocStamp"
"#
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .add_source_file(temp_file.path())
            .build()
            .unwrap();

        assert_eq!(config.header.base_url, "http://docs.internal:8000");
        assert_eq!(config.header.marker, "DocStamp");
        assert_eq!(config.header.search_lines, 20);
    }
}
