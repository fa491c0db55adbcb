//! Home Assistant MQTT discovery descriptors
//!
//! Each state becomes a `select` entity plus a `problem` binary sensor, each
//! script becomes a `button`, and all of them hang off one device entry.

use serde::{Deserialize, Serialize};

use crate::status::BROKEN;
use crate::topics::Topics;

const MODEL: &str = "Halux";
const PROBLEM_CLASS: &str = "problem";

/// Device block shared by every entity of one bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub ids: String,
}

impl DeviceInfo {
    #[must_use]
    pub fn new(topics: &Topics) -> Self {
        Self {
            name: format!("{} {MODEL}", title_case(topics.device())),
            manufacturer: title_case(topics.root()),
            model: MODEL.to_string(),
            ids: topics.id().to_string(),
        }
    }
}

/// `select` entity for a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectDiscovery {
    pub name: String,
    pub command_topic: String,
    pub state_topic: String,
    pub options: Vec<String>,
    pub unique_id: String,
    pub device: DeviceInfo,
}

impl SelectDiscovery {
    /// Build the descriptor; `broken` is appended to the offered options
    pub fn for_state<'a>(
        topics: &Topics,
        state: &str,
        options: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut options: Vec<String> = options.into_iter().map(str::to_string).collect();
        options.push(BROKEN.to_string());

        Self {
            name: format!(
                "{} {MODEL} {}",
                title_case(topics.device()),
                title_case(state)
            ),
            command_topic: topics.state_activate(state),
            state_topic: topics.state_value(state),
            options,
            unique_id: format!("{}-{state}", topics.id()),
            device: DeviceInfo::new(topics),
        }
    }
}

/// `binary_sensor` with the `problem` device class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarySensorDiscovery {
    pub name: String,
    pub state_topic: String,
    pub unique_id: String,
    pub device_class: String,
    pub device: DeviceInfo,
}

impl BinarySensorDiscovery {
    #[must_use]
    pub fn for_state(topics: &Topics, state: &str) -> Self {
        Self {
            name: format!(
                "{} {MODEL} {} Status",
                title_case(topics.device()),
                title_case(state)
            ),
            state_topic: topics.state_problem(state),
            unique_id: format!("{}-{state}-status", topics.id()),
            device_class: PROBLEM_CLASS.to_string(),
            device: DeviceInfo::new(topics),
        }
    }

    #[must_use]
    pub fn for_scripts(topics: &Topics) -> Self {
        Self {
            name: format!("{} {MODEL} Scripts Status", title_case(topics.device())),
            state_topic: topics.scripts_problem(),
            unique_id: format!("{}-scripts-status", topics.id()),
            device_class: PROBLEM_CLASS.to_string(),
            device: DeviceInfo::new(topics),
        }
    }
}

/// `button` entity for a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonDiscovery {
    pub name: String,
    pub command_topic: String,
    pub unique_id: String,
    pub device: DeviceInfo,
}

impl ButtonDiscovery {
    #[must_use]
    pub fn for_script(topics: &Topics, script: &str) -> Self {
        Self {
            name: format!(
                "{} {MODEL} {} Script",
                title_case(topics.device()),
                title_case(&script.replace('-', " "))
            ),
            command_topic: topics.script_activate(script),
            unique_id: format!("{}-{script}-script", topics.id()),
            device: DeviceInfo::new(topics),
        }
    }
}

/// Uppercase the first letter of every word, lowercase the rest.
///
/// A word starts after any non-alphabetic character, so `"web-server"`
/// becomes `"Web-Server"`.
#[must_use]
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn topics() -> Topics {
        Topics::new("halux", "server", "srv1")
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("server"), "Server");
        assert_eq!(title_case("web-server"), "Web-Server");
        assert_eq!(title_case("HOME lab"), "Home Lab");
        assert_eq!(title_case("vm2go"), "Vm2Go");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_select_lists_broken_last() {
        let select = SelectDiscovery::for_state(&topics(), "power", ["on", "off"]);

        assert_eq!(select.options, vec!["on", "off", "broken"]);
        assert_eq!(select.name, "Server Halux Power");
        assert_eq!(select.unique_id, "srv1-power");
    }

    #[test]
    fn test_select_json_shape() {
        let select = SelectDiscovery::for_state(&topics(), "power", ["on"]);
        let value = serde_json::to_value(&select).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "Server Halux Power",
                "command_topic": "halux/server/power/activate",
                "state_topic": "halux/server/power/state",
                "options": ["on", "broken"],
                "unique_id": "srv1-power",
                "device": {
                    "name": "Server Halux",
                    "manufacturer": "Halux",
                    "model": "Halux",
                    "ids": "srv1"
                }
            })
        );
    }

    #[test]
    fn test_button_name_replaces_dashes() {
        let button = ButtonDiscovery::for_script(&topics(), "clear-cache");

        assert_eq!(button.name, "Server Halux Clear Cache Script");
        assert_eq!(button.command_topic, "halux/server/scripts/clear-cache/activate");
        assert_eq!(button.unique_id, "srv1-clear-cache-script");
    }

    #[test]
    fn test_problem_sensors() {
        let state = BinarySensorDiscovery::for_state(&topics(), "power");
        assert_eq!(state.device_class, "problem");
        assert_eq!(state.state_topic, "halux/server/power-status/state");

        let scripts = BinarySensorDiscovery::for_scripts(&topics());
        assert_eq!(scripts.name, "Server Halux Scripts Status");
        assert_eq!(scripts.unique_id, "srv1-scripts-status");
    }
}
