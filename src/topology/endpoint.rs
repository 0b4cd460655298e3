//! Id-only projection of topology records used in aggregate tags.

use super::{Agent, Target};

/// Name tag id reported when no name tag is known.
const UNKNOWN_NAME_TAG_ID: i32 = -1;

/// Identifier fields of one side (agent or target) of a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub id: String,
    pub isp_id: String,
    pub province_id: String,
    pub city_id: String,
    pub name_tag_id: String,
}

impl EndpointDescriptor {
    fn new(id: i32, isp_id: i16, province_id: i16, city_id: i16) -> Self {
        Self {
            id: id.to_string(),
            isp_id: isp_id.to_string(),
            province_id: province_id.to_string(),
            city_id: city_id.to_string(),
            name_tag_id: UNKNOWN_NAME_TAG_ID.to_string(),
        }
    }
}

impl From<&Agent> for EndpointDescriptor {
    fn from(agent: &Agent) -> Self {
        Self::new(agent.id, agent.isp_id, agent.province_id, agent.city_id)
    }
}

impl From<&Target> for EndpointDescriptor {
    fn from(target: &Target) -> Self {
        Self::new(target.id, target.isp_id, target.province_id, target.city_id)
    }
}
