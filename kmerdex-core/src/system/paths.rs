use std::path::PathBuf;
use std::sync::OnceLock;

// Cache the home directory to avoid repeated environment lookups
static KMERDEX_HOME: OnceLock<PathBuf> = OnceLock::new();

/// Get the kmerdex home directory
/// Checks KMERDEX_HOME environment variable, falls back to ${HOME}/.kmerdex
pub fn kmerdex_home() -> PathBuf {
    KMERDEX_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("KMERDEX_HOME") {
                PathBuf::from(path)
            } else {
                let home = std::env::var("HOME").unwrap_or_else(|_| {
                    std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string())
                });
                PathBuf::from(home).join(".kmerdex")
            }
        })
        .clone()
}

/// Default configuration file location
/// Returns: KMERDEX_HOME/config.toml
pub fn config_path() -> PathBuf {
    kmerdex_home().join("config.toml")
}

/// Check if running with a custom home directory
pub fn is_custom_home() -> bool {
    std::env::var("KMERDEX_HOME").is_ok()
}

/// Get a human-readable description of the current path configuration
pub fn describe_paths() -> String {
    format!(
        "kmerdex Paths:\n  \
        Home: {}\n  \
        Config: {}\n  \
        Custom: {}",
        kmerdex_home().display(),
        config_path().display(),
        if is_custom_home() { "Yes" } else { "No (using defaults)" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_under_home() {
        let config = config_path();
        assert!(config.starts_with(kmerdex_home()));
        assert_eq!(config.file_name().unwrap(), "config.toml");
    }

    #[test]
    fn test_describe_paths_mentions_config() {
        let description = describe_paths();
        assert!(description.contains("Home:"));
        assert!(description.contains("config.toml"));
    }
}
