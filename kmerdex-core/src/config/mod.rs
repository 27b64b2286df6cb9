//! Configuration types for kmerdex

use crate::{KmerdexError, KmerdexResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding `index.url`
pub const INDEX_URL_ENV: &str = "KMERDEX_INDEX_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub partition: PartitionConfig,
    #[serde(default)]
    pub kmer: KmerConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub split: SplitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionConfig {
    /// Number of partitions to plan
    #[serde(default = "default_partitions")]
    pub partitions: usize,
    /// Number of independent planning trials
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    /// Width of the k-mer suffix used as routing key
    #[serde(default = "default_suffix_length")]
    pub suffix_length: usize,
    /// Base seed for the shuffle step; random when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_info_file")]
    pub info_file: String,
    #[serde(default = "default_membership_file")]
    pub membership_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KmerConfig {
    #[serde(default = "default_kmer_length")]
    pub length: usize,
    /// Zero padding applied to sample ids inside index documents
    #[serde(default = "default_sample_id_width")]
    pub sample_id_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexConfig {
    /// Root URL of the document index cluster
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Maximum partition queries in flight for one sequence lookup
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_shards")]
    pub shards: u32,
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    #[serde(default = "default_alias")]
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitConfig {
    /// K-mers observed fewer times than this are skipped
    #[serde(default = "default_min_count")]
    pub min_count: u64,
}

// Default value functions
fn default_partitions() -> usize { 10 }
fn default_repetitions() -> usize { 1 }
fn default_suffix_length() -> usize { 7 }
fn default_info_file() -> String { "partition.info".to_string() }
fn default_membership_file() -> String { "partition.txt".to_string() }
fn default_kmer_length() -> usize { 31 }
fn default_sample_id_width() -> usize { 8 }
fn default_url() -> String { "http://localhost:9200".to_string() }
fn default_doc_type() -> String { "kmer".to_string() }
fn default_index_prefix() -> String { "kmer".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_connect_timeout_secs() -> u64 { 5 }
fn default_concurrency() -> usize { 8 }
fn default_shards() -> u32 { 5 }
fn default_replicas() -> u32 { 1 }
fn default_alias() -> String { "kmers".to_string() }
fn default_min_count() -> u64 { 2 }

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            repetitions: default_repetitions(),
            suffix_length: default_suffix_length(),
            seed: None,
            info_file: default_info_file(),
            membership_file: default_membership_file(),
        }
    }
}

impl Default for KmerConfig {
    fn default() -> Self {
        Self {
            length: default_kmer_length(),
            sample_id_width: default_sample_id_width(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            doc_type: default_doc_type(),
            index_prefix: default_index_prefix(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            concurrency: default_concurrency(),
            shards: default_shards(),
            replicas: default_replicas(),
            alias: default_alias(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            min_count: default_min_count(),
        }
    }
}

impl Config {
    /// Check cross-field constraints that serde defaults cannot express
    pub fn validate(&self) -> KmerdexResult<()> {
        if self.partition.partitions == 0 {
            return Err(KmerdexError::Configuration(
                "partition.partitions must be at least 1".to_string(),
            ));
        }
        if self.partition.repetitions == 0 {
            return Err(KmerdexError::Configuration(
                "partition.repetitions must be at least 1".to_string(),
            ));
        }
        if self.partition.suffix_length == 0 {
            return Err(KmerdexError::Configuration(
                "partition.suffix_length must be at least 1".to_string(),
            ));
        }
        if self.kmer.length < self.partition.suffix_length {
            return Err(KmerdexError::Configuration(format!(
                "kmer.length ({}) is shorter than partition.suffix_length ({})",
                self.kmer.length, self.partition.suffix_length
            )));
        }
        if self.index.concurrency == 0 {
            return Err(KmerdexError::Configuration(
                "index.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(INDEX_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Using index url from {}: {}", INDEX_URL_ENV, url);
                self.index.url = url;
            }
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> KmerdexResult<Config> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| KmerdexError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

/// Load the config at `path` when it exists, defaults otherwise.
/// Environment overrides are applied and the result validated.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> KmerdexResult<Config> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        tracing::debug!("Loading config from {}", path.display());
        load_config(path)?
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        Config::default()
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> KmerdexResult<()> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| KmerdexError::Configuration(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.partition.partitions, 10);
        assert_eq!(config.partition.repetitions, 1);
        assert_eq!(config.partition.suffix_length, 7);
        assert_eq!(config.partition.seed, None);
        assert_eq!(config.partition.info_file, "partition.info");
        assert_eq!(config.partition.membership_file, "partition.txt");

        assert_eq!(config.kmer.length, 31);
        assert_eq!(config.kmer.sample_id_width, 8);

        assert_eq!(config.index.url, "http://localhost:9200");
        assert_eq!(config.index.doc_type, "kmer");
        assert_eq!(config.index.concurrency, 8);
        assert_eq!(config.index.alias, "kmers");

        assert_eq!(config.split.min_count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
[partition]
partitions = 64
seed = 7

[index]
url = "http://es.internal:9200"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.partition.partitions, 64);
        assert_eq!(config.partition.seed, Some(7));
        assert_eq!(config.index.url, "http://es.internal:9200");

        // Unspecified fields fall back to defaults
        assert_eq!(config.partition.repetitions, 1);
        assert_eq!(config.kmer.length, 31);
        assert_eq!(config.index.timeout_secs, 30);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "this is not valid TOML {{").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            KmerdexError::Configuration(msg) => assert!(msg.contains("Failed to parse config")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config("/nonexistent/path/to/config.toml");
        assert!(matches!(result, Err(KmerdexError::Io(_))));
    }

    #[test]
    fn test_validate_rejects_zero_partitions() {
        let mut config = Config::default();
        config.partition.partitions = 0;
        assert!(matches!(config.validate(), Err(KmerdexError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_short_kmer() {
        let mut config = Config::default();
        config.kmer.length = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shorter than"));
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.partition.partitions = 3;
        config.partition.seed = Some(99);
        config.index.alias = "kmers_v2".to_string();

        let temp_file = NamedTempFile::new().unwrap();
        save_config(temp_file.path(), &config).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(config, loaded);
    }

    #[test]
    #[serial]
    fn test_env_override_index_url() {
        std::env::set_var(INDEX_URL_ENV, "http://override:9200");
        let mut config = Config::default();
        config.apply_env_overrides();
        std::env::remove_var(INDEX_URL_ENV);

        assert_eq!(config.index.url, "http://override:9200");
    }

    #[test]
    #[serial]
    fn test_load_or_default_missing_file() {
        std::env::remove_var(INDEX_URL_ENV);
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
