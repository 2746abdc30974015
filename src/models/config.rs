use serde::{Deserialize, Serialize};

/// Portal configuration loaded from `portal.yaml` and `PORTAL__*` environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub security: SecuritySettings,

    #[serde(default)]
    pub events: EventSettings,

    #[serde(default)]
    pub theme: ThemeSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// JSON document holding every persisted key.
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Account that can never be demoted or deleted.
    #[serde(default = "default_bootstrap_admin")]
    pub bootstrap_admin: String,

    /// Admin secret used until one has been stored.
    #[serde(default = "default_admin_secret")]
    pub default_admin_secret: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            bootstrap_admin: default_bootstrap_admin(),
            default_admin_secret: default_admin_secret(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    /// Stand-in for the host's color-scheme preference.
    #[serde(default)]
    pub prefers_dark: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_log_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            prefix: default_log_prefix(),
            debug: false,
            console: true,
        }
    }
}

fn default_data_file() -> String {
    "portal-data.json".to_string()
}

fn default_bootstrap_admin() -> String {
    "admin".to_string()
}

fn default_admin_secret() -> String {
    "MANDEMS SKIES".to_string()
}

fn default_event_capacity() -> usize {
    100
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "admin-portal".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_config_defaults() {
        let config = PortalConfig::default();
        assert_eq!(config.security.bootstrap_admin, "admin");
        assert_eq!(config.security.default_admin_secret, "MANDEMS SKIES");
        assert_eq!(config.events.capacity, 100);
        assert!(!config.theme.prefers_dark);
        assert!(config.logging.console);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: PortalConfig =
            serde_yaml_ng::from_str("security:\n  bootstrap_admin: root\n").unwrap();
        assert_eq!(config.security.bootstrap_admin, "root");
        assert_eq!(config.security.default_admin_secret, "MANDEMS SKIES");
        assert_eq!(config.storage.data_file, "portal-data.json");
    }
}
