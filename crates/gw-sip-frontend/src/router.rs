//! Ordered routing-rule evaluation (spec §4.6 step 2: "first match wins").

use gw_domain::config::{RoutingAction, RoutingRuleConfig};

use crate::patterns;

/// Evaluate `rules` in order against one inbound call, returning the first
/// rule whose caller/called/trunk/header conditions all match.
///
/// An absent pattern matches anything; all configured header conditions on
/// a rule must match for the rule to match. Falls back to `Reject` with no
/// matched rule if nothing matches — callers should treat `None` as a
/// reject with reason `no_matching_rule`.
pub fn evaluate<'a>(
    rules: &'a [RoutingRuleConfig],
    caller: &str,
    called: &str,
    trunk: &str,
    headers: &std::collections::HashMap<String, String>,
) -> Option<&'a RoutingRuleConfig> {
    rules.iter().find(|rule| rule_matches(rule, caller, called, trunk, headers))
}

fn rule_matches(
    rule: &RoutingRuleConfig,
    caller: &str,
    called: &str,
    trunk: &str,
    headers: &std::collections::HashMap<String, String>,
) -> bool {
    patterns::matches(rule.caller_pattern.as_deref(), caller)
        && patterns::matches(rule.called_pattern.as_deref(), called)
        && patterns::matches(rule.trunk_pattern.as_deref(), trunk)
        && rule
            .header_conditions
            .iter()
            .all(|(key, expected)| headers.get(key).is_some_and(|actual| actual == expected))
}

/// Convenience used by [`evaluate`]'s callers when they already hold the
/// matched rule and only need its disposition.
pub fn action_of(rule: &RoutingRuleConfig) -> RoutingAction {
    rule.action
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn rule(caller: Option<&str>, called: Option<&str>, trunk: Option<&str>, action: RoutingAction) -> RoutingRuleConfig {
        RoutingRuleConfig {
            caller_pattern: caller.map(String::from),
            called_pattern: called.map(String::from),
            trunk_pattern: trunk.map(String::from),
            header_conditions: HashMap::new(),
            action,
        }
    }

    #[test]
    fn first_match_wins() {
        let rules = vec![
            rule(Some("+1555*"), None, None, RoutingAction::Reject),
            rule(None, None, None, RoutingAction::VoiceAi),
        ];
        let headers = HashMap::new();
        let matched = evaluate(&rules, "+15551234567", "+18005551212", "novofon", &headers).unwrap();
        assert_eq!(matched.action, RoutingAction::Reject);

        let matched2 = evaluate(&rules, "+14041234567", "+18005551212", "novofon", &headers).unwrap();
        assert_eq!(matched2.action, RoutingAction::VoiceAi);
    }

    #[test]
    fn no_match_returns_none() {
        let rules = vec![rule(Some("+1555*"), None, None, RoutingAction::Reject)];
        let headers = HashMap::new();
        assert!(evaluate(&rules, "+14041234567", "anything", "novofon", &headers).is_none());
    }

    #[test]
    fn header_conditions_must_all_match() {
        let mut r = rule(None, None, None, RoutingAction::Forward);
        r.header_conditions.insert("X-Priority".into(), "high".into());

        let mut headers = HashMap::new();
        headers.insert("X-Priority".to_string(), "low".to_string());
        assert!(evaluate(&[r.clone()], "c", "d", "t", &headers).is_none());

        headers.insert("X-Priority".to_string(), "high".to_string());
        assert!(evaluate(&[r], "c", "d", "t", &headers).is_some());
    }
}
