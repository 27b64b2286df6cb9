//! Configuration files on disk

use kmerdex_core::config::INDEX_URL_ENV;
use kmerdex_core::{load_or_default, save_config, Config, KmerdexError};
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_saved_config_round_trips() {
    std::env::remove_var(INDEX_URL_ENV);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/config.toml");

    let mut config = Config::default();
    config.partition.partitions = 64;
    config.partition.seed = Some(99);
    config.index.url = "http://search.internal:9200".to_string();
    save_config(&path, &config).unwrap();

    assert_eq!(load_or_default(&path).unwrap(), config);
}

#[test]
#[serial]
fn test_partial_file_uses_defaults() {
    std::env::remove_var(INDEX_URL_ENV);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[kmer]\nlength = 25\n").unwrap();

    let config = load_or_default(&path).unwrap();
    assert_eq!(config.kmer.length, 25);
    assert_eq!(config.partition.partitions, 10);
    assert_eq!(config.index.concurrency, 8);
}

#[test]
#[serial]
fn test_invalid_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[partition]\npartitions = 0\n").unwrap();

    let err = load_or_default(&path).unwrap_err();
    assert!(matches!(err, KmerdexError::Configuration(_)));
    assert_eq!(err.exit_code(), 2);
}
