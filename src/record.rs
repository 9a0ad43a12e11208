//! The alert payload forwarded to OpsGenie or the Marid relay.

use serde::{Deserialize, Serialize};

/// A single Zabbix alert, flattened into the fields the integration expects.
///
/// Every field is always present; attributes Zabbix did not supply are empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub api_key: String,
    pub trigger_name: String,
    pub trigger_id: String,
    pub trigger_status: String,
    pub trigger_severity: String,
    pub trigger_description: String,
    pub trigger_url: String,
    pub trigger_value: String,
    pub host_name: String,
    pub ip_address: String,
    pub date: String,
    pub time: String,
    pub item_key: String,
    pub item_value: String,
    pub event_id: String,
}

impl AlertRecord {
    /// Builds the record to deliver from the explicit alert attributes.
    ///
    /// The `api_key` of `overrides` wins when it is non-empty; otherwise the
    /// configured default is used. All other fields are taken as given.
    pub fn assemble(default_api_key: &str, overrides: AlertRecord) -> Self {
        let api_key = if overrides.api_key.is_empty() {
            default_api_key.to_string()
        } else {
            overrides.api_key
        };
        Self {
            api_key,
            ..overrides
        }
    }

    /// The record as `(key, value)` pairs, keyed the same way as the JSON form.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("apiKey", self.api_key.as_str()),
            ("triggerName", self.trigger_name.as_str()),
            ("triggerId", self.trigger_id.as_str()),
            ("triggerStatus", self.trigger_status.as_str()),
            ("triggerSeverity", self.trigger_severity.as_str()),
            ("triggerDescription", self.trigger_description.as_str()),
            ("triggerUrl", self.trigger_url.as_str()),
            ("triggerValue", self.trigger_value.as_str()),
            ("hostName", self.host_name.as_str()),
            ("ipAddress", self.ip_address.as_str()),
            ("date", self.date.as_str()),
            ("time", self.time.as_str()),
            ("itemKey", self.item_key.as_str()),
            ("itemValue", self.item_value.as_str()),
            ("eventId", self.event_id.as_str()),
        ]
    }
}
