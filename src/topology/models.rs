//! Topology record types.

use serde::{Deserialize, Serialize};

/// A host probed by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub id: i32,
    /// Address handed to the probing command.
    pub host: String,
    pub isp_id: i16,
    pub isp_name: String,
    pub province_id: i16,
    pub province_name: String,
    pub city_id: i16,
    pub city_name: String,
    pub name_tag: String,
}

/// The agent running the probes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    pub id: i32,
    pub name: String,
    pub isp_id: i16,
    pub isp_name: String,
    pub province_id: i16,
    pub province_name: String,
    pub city_id: i16,
    pub city_name: String,
}
