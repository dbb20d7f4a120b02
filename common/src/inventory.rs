//! The grouped host document consumed by Ansible's dynamic inventory protocol.
//!
//! Serialises to `{ "<group>": {...}, ..., "_meta": { "hostvars": {...} } }`.
//! Maps are ordered so the same input always renders the same bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Variable name -> value.
pub type Vars = BTreeMap<String, Value>;

/// Host identifier -> per-host variables.
pub type HostVars = BTreeMap<String, Vars>;

pub const LOCALHOST: &str = "localhost";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vars::is_empty")]
    pub vars: Vars,
}

impl InventoryGroup {
    pub fn with_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: Some(hosts.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_children<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            children: Some(children.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn var(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub hostvars: HostVars,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(flatten)]
    pub groups: BTreeMap<String, InventoryGroup>,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

impl InventoryDocument {
    pub fn group(&self, name: &str) -> Option<&InventoryGroup> {
        self.groups.get(name)
    }

    /// Hosts listed directly by `name`, empty when the group is absent.
    pub fn hosts_of(&self, name: &str) -> &[String] {
        self.groups
            .get(name)
            .and_then(|group| group.hosts.as_deref())
            .unwrap_or(&[])
    }

    pub fn hostvars(&self, host: &str) -> Option<&Vars> {
        self.meta.hostvars.get(host)
    }
}
