//! Tag string assembly.
//!
//! Two vocabularies exist and are kept apart: scalar metrics carry display
//! names for dashboards, the aggregate record carries ids for the
//! aggregation backend. Both orders are part of the wire format.

use crate::probe::ProbeStatistics;
use crate::topology::{Agent, EndpointDescriptor, Target};

/// Join `key=value` pairs with `,`. Values are not escaped.
fn join_tags<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut tags = String::new();
    for (key, value) in pairs {
        if !tags.is_empty() {
            tags.push(',');
        }
        tags.push_str(key);
        tags.push('=');
        tags.push_str(value);
    }
    tags
}

/// Id-keyed tags for the `nqm-metrics` record: agent ids, target ids, then
/// the seven statistics.
pub fn assemble_tags(
    target: &EndpointDescriptor,
    agent: &EndpointDescriptor,
    stats: &ProbeStatistics,
) -> String {
    let endpoints = [
        ("agent-id", agent.id.as_str()),
        ("agent-isp-id", agent.isp_id.as_str()),
        ("agent-province-id", agent.province_id.as_str()),
        ("agent-city-id", agent.city_id.as_str()),
        ("agent-name-tag-id", agent.name_tag_id.as_str()),
        ("target-id", target.id.as_str()),
        ("target-isp-id", target.isp_id.as_str()),
        ("target-province-id", target.province_id.as_str()),
        ("target-city-id", target.city_id.as_str()),
        ("target-name-tag-id", target.name_tag_id.as_str()),
    ];
    join_tags(endpoints.into_iter().chain(stats.fields()))
}

/// Name-keyed tags for the scalar metrics.
pub fn scalar_tags(target: &Target, agent: &Agent) -> String {
    join_tags([
        ("nqm-agent-isp", agent.isp_name.as_str()),
        ("nqm-agent-province", agent.province_name.as_str()),
        ("nqm-agent-city", agent.city_name.as_str()),
        ("target-ip", target.host.as_str()),
        ("target-isp", target.isp_name.as_str()),
        ("target-province", target.province_name.as_str()),
        ("target-city", target.city_name.as_str()),
        ("target-name-tag", target.name_tag.as_str()),
    ])
}
