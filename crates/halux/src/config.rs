//! Configuration loading and types

use std::path::{Path, PathBuf};

use eyre::{WrapErr, bail};
use halux_api::Topics;
use halux_core::{Registry, ScriptConfig, StateConfig, check_name};
use serde::{Deserialize, Serialize};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "HALUX_CONFIG";

/// Top-level configuration for the halux daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Broker connection and device identity
    pub mqtt: MqttConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
    /// States exposed as selects
    #[serde(default)]
    pub states: Vec<StateConfig>,
    /// Scripts exposed as buttons
    #[serde(default)]
    pub scripts: Vec<ScriptConfig>,
}

/// Broker connection and device identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Device name, second topic level
    pub name: String,
    /// Stable unique id used by Home Assistant
    pub id: String,
    /// Root topic
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_topic() -> String {
    "halux".to_string()
}

fn default_host() -> String {
    "mqtt".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file, picking the format from its extension
    ///
    /// # Errors
    /// Returns error if file cannot be read, parsed or is invalid
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yml" | "yaml") => Self::from_yaml(&content),
            _ => Self::from_toml(&content),
        }
        .wrap_err_with(|| format!("invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns error on syntax, missing keys or invalid values
    pub fn from_toml(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    /// Returns error on syntax, missing keys or invalid values
    pub fn from_yaml(content: &str) -> eyre::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load the configuration file.
    ///
    /// `explicit` wins, then `$HALUX_CONFIG`, then the usual locations.
    ///
    /// # Errors
    /// Returns error if no file is found or it fails to load
    pub fn locate(explicit: Option<&Path>) -> eyre::Result<(PathBuf, Self)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match std::env::var(CONFIG_ENV) {
                Ok(path) => PathBuf::from(path),
                Err(_) => first_existing(&default_paths())
                    .ok_or_else(|| eyre::eyre!("no config file found, pass --config or set {CONFIG_ENV}"))?,
            },
        };

        let config = Self::load(&path)?;
        Ok((path, config))
    }

    /// Build the validated registry of states and scripts
    ///
    /// # Errors
    /// Returns error on duplicate, reserved or malformed names and empty states
    pub fn registry(&self) -> eyre::Result<Registry> {
        Ok(Registry::from_config(&self.states, &self.scripts)?)
    }

    /// Topic scheme for this device
    #[must_use]
    pub fn topics(&self) -> Topics {
        Topics::new(&self.mqtt.topic, &self.mqtt.name, &self.mqtt.id)
    }

    fn validate(&self) -> eyre::Result<()> {
        check_name("device", &self.mqtt.name)?;
        check_name("device id", &self.mqtt.id)?;
        if self.mqtt.topic.trim().is_empty() || self.mqtt.topic.contains(['+', '#']) {
            bail!("mqtt.topic must be non-empty without '+' or '#'");
        }
        self.registry()?;
        Ok(())
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("halux.toml"),
        PathBuf::from("/etc/halux/halux.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("halux/halux.toml"));
    }
    paths
}

fn first_existing(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|path| path.exists()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[mqtt]
name = "server"
id = "srv1"

[[states]]
name = "power"

[[states.options]]
name = "on"
test = { type = "shell", command = "check-on", return_code = 0 }
"#;

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.mqtt.topic, "halux");
        assert_eq!(config.mqtt.host, "mqtt");
        assert_eq!(config.mqtt.port, 1883);
        assert!(config.mqtt.username.is_none());
        assert_eq!(config.log.level, "info");
        assert!(config.scripts.is_empty());
        assert_eq!(config.states.len(), 1);
    }

    #[test]
    fn test_topics_from_mqtt_section() {
        let config = Config::from_toml(MINIMAL).unwrap();
        let topics = config.topics();

        assert_eq!(topics.state_activate("power"), "halux/server/power/activate");
        assert_eq!(topics.id(), "srv1");
    }

    #[test]
    fn test_missing_device_name_rejected() {
        let source = MINIMAL.replace("name = \"server\"\n", "");
        assert!(Config::from_toml(&source).is_err());
    }

    #[test]
    fn test_unknown_command_type_rejected() {
        let source = MINIMAL.replace("type = \"shell\"", "type = \"ssh\"");
        assert!(Config::from_toml(&source).is_err());
    }

    #[test]
    fn test_reserved_option_name_rejected() {
        let source = MINIMAL.replace("name = \"on\"", "name = \"broken\"");
        assert!(Config::from_toml(&source).is_err());
    }

    #[test]
    fn test_state_name_with_wildcard_rejected() {
        let source = MINIMAL.replace("name = \"power\"", "name = \"a+b\"");
        let err = Config::from_toml(&source).unwrap_err();

        assert!(format!("{err:?}").contains("invalid state name"));
    }

    #[test]
    fn test_device_name_with_separator_rejected() {
        let source = MINIMAL.replace("name = \"server\"", "name = \"rack/server\"");
        assert!(Config::from_toml(&source).is_err());
    }

    #[test]
    fn test_script_name_with_separator_rejected() {
        let source = format!(
            "{MINIMAL}
[[scripts]]
name = \"cache/clear\"
type = \"shell\"
command = \"true\"
return_code = 0
"
        );
        assert!(Config::from_toml(&source).is_err());
    }

    #[test]
    fn test_duplicate_script_rejected() {
        let source = format!(
            "{MINIMAL}
[[scripts]]
name = \"reboot\"
type = \"shell\"
command = \"reboot\"
return_code = 0

[[scripts]]
name = \"reboot\"
type = \"shell\"
command = \"reboot -f\"
return_code = 0
"
        );
        assert!(Config::from_toml(&source).is_err());
    }

    #[test]
    fn test_yaml_config() {
        let source = r#"
mqtt:
  name: server
  id: srv1
  host: broker.local
states:
  - name: power
    options:
      - name: "on"
        test: { type: shell, command: check-on, return_code: 0 }
        activate: { type: shell, command: turn-on, return_code: 0, timeout_secs: 10 }
scripts:
  - name: reboot
    type: shell
    command: reboot
    return_code: 0
"#;
        let config = Config::from_yaml(source).unwrap();

        assert_eq!(config.mqtt.host, "broker.local");
        assert_eq!(config.scripts[0].name, "reboot");
        let registry = config.registry().unwrap();
        assert_eq!(registry.state_names().collect::<Vec<_>>(), vec!["power"]);
    }

    #[test]
    fn test_load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("halux.toml");
        std::fs::write(&toml_path, MINIMAL).unwrap();
        assert!(Config::load(&toml_path).is_ok());

        let yaml_path = dir.path().join("halux.yml");
        std::fs::write(&yaml_path, "mqtt:\n  name: server\n  id: srv1\n").unwrap();
        let config = Config::load(&yaml_path).unwrap();
        assert!(config.states.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let (found, config) = Config::locate(Some(&path)).unwrap();

        assert_eq!(found, path);
        assert_eq!(config.mqtt.name, "server");
    }

    #[test]
    fn test_first_existing_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.toml");
        std::fs::write(&present, MINIMAL).unwrap();

        let paths = vec![dir.path().join("missing.toml"), present.clone()];
        assert_eq!(first_existing(&paths), Some(present));
        assert_eq!(first_existing(&[dir.path().join("missing.toml")]), None);
    }
}
