//! MQTT address scheme
//!
//! Every address the bridge publishes to or subscribes on is built here so
//! that the inbound router and the publishers cannot drift apart.

/// Prefix Home Assistant watches for discovery messages
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// State names whose addresses would collide with the scripts addresses
pub const RESERVED_STATE_NAMES: [&str; 2] = ["scripts", "scripts_status"];

/// Address builder for one bridge instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    root: String,
    device: String,
    id: String,
}

impl Topics {
    /// Create a builder from the configured root, device name and unique id
    pub fn new(root: impl Into<String>, device: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            device: device.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    fn base(&self) -> String {
        format!("{}/{}", self.root, self.device)
    }

    /// Inbound: payload is the option to activate
    #[must_use]
    pub fn state_activate(&self, state: &str) -> String {
        format!("{}/{state}/activate", self.base())
    }

    /// Outbound: current option name or `broken`
    #[must_use]
    pub fn state_value(&self, state: &str) -> String {
        format!("{}/{state}/state", self.base())
    }

    /// Outbound: `ON` while the state is broken
    #[must_use]
    pub fn state_problem(&self, state: &str) -> String {
        format!("{}/{state}-status/state", self.base())
    }

    /// Inbound: any payload runs the script
    #[must_use]
    pub fn script_activate(&self, script: &str) -> String {
        format!("{}/scripts/{script}/activate", self.base())
    }

    /// Outbound: running script name, `idle` or `broken`
    #[must_use]
    pub fn scripts_value(&self) -> String {
        format!("{}/scripts/state", self.base())
    }

    /// Outbound: `ON` after a failed script run
    #[must_use]
    pub fn scripts_problem(&self) -> String {
        format!("{}/scripts_status/state", self.base())
    }

    #[must_use]
    pub fn state_select_config(&self, state: &str) -> String {
        format!(
            "{DISCOVERY_PREFIX}/select/{}/{}-{}-{state}/config",
            self.root, self.id, self.device
        )
    }

    #[must_use]
    pub fn state_problem_config(&self, state: &str) -> String {
        format!(
            "{DISCOVERY_PREFIX}/binary_sensor/{}/{}-{}-{state}-status/config",
            self.root, self.id, self.device
        )
    }

    #[must_use]
    pub fn script_button_config(&self, script: &str) -> String {
        format!(
            "{DISCOVERY_PREFIX}/button/{}/{}-{}-{script}-script/config",
            self.root, self.id, self.device
        )
    }

    #[must_use]
    pub fn scripts_problem_config(&self) -> String {
        format!(
            "{DISCOVERY_PREFIX}/binary_sensor/{}/{}-{}-scripts-status/config",
            self.root, self.id, self.device
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics() -> Topics {
        Topics::new("halux", "server", "srv1")
    }

    #[test]
    fn test_state_addresses() {
        let t = topics();
        assert_eq!(t.state_activate("power"), "halux/server/power/activate");
        assert_eq!(t.state_value("power"), "halux/server/power/state");
        assert_eq!(t.state_problem("power"), "halux/server/power-status/state");
    }

    #[test]
    fn test_script_addresses() {
        let t = topics();
        assert_eq!(
            t.script_activate("reboot"),
            "halux/server/scripts/reboot/activate"
        );
        assert_eq!(t.scripts_value(), "halux/server/scripts/state");
        assert_eq!(t.scripts_problem(), "halux/server/scripts_status/state");
    }

    #[test]
    fn test_discovery_addresses() {
        let t = topics();
        assert_eq!(
            t.state_select_config("power"),
            "homeassistant/select/halux/srv1-server-power/config"
        );
        assert_eq!(
            t.state_problem_config("power"),
            "homeassistant/binary_sensor/halux/srv1-server-power-status/config"
        );
        assert_eq!(
            t.script_button_config("reboot"),
            "homeassistant/button/halux/srv1-server-reboot-script/config"
        );
        assert_eq!(
            t.scripts_problem_config(),
            "homeassistant/binary_sensor/halux/srv1-server-scripts-status/config"
        );
    }
}
