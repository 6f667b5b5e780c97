use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What to do with an inbound call that matches a routing rule (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAction {
    VoiceAi,
    Reject,
    Forward,
}

/// One ordered routing rule (spec §6 `routing_rules[]`). Patterns support
/// `*` (any run of characters) and `?` (any single character) wildcards;
/// an absent pattern matches anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRuleConfig {
    #[serde(default)]
    pub caller_pattern: Option<String>,
    #[serde(default)]
    pub called_pattern: Option<String>,
    #[serde(default)]
    pub trunk_pattern: Option<String>,
    #[serde(default)]
    pub header_conditions: HashMap<String, String>,
    pub action: RoutingAction,
}
