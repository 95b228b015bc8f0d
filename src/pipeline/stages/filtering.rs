//! Channel filtering stage
//!
//! Channels are curated by a declarative rule table. A [`ChannelRule`] is a
//! list of required groups, each group a list of alternative substrings; the
//! rule matches a display name when every group has at least one
//! alternative in the lower-cased name. Rules are OR-ed together. The table
//! is plain configuration data, so editors change the rules without touching
//! [`ChannelClassifier::keep_channel`].

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// One keep rule: all groups must match, any alternative within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRule {
    /// Label used in logs and validation errors
    pub name: String,
    pub groups: Vec<Vec<String>>,
}

impl ChannelRule {
    pub fn new(name: &str, groups: &[&[&str]]) -> Self {
        Self {
            name: name.to_string(),
            groups: groups
                .iter()
                .map(|group| group.iter().map(|alt| alt.to_string()).collect())
                .collect(),
        }
    }

    /// Expects `name` already lower-cased
    fn matches(&self, name: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|alternative| name.contains(alternative.as_str())))
    }
}

/// Decides whether a channel belongs in the curated output
#[derive(Debug, Clone)]
pub struct ChannelClassifier {
    rules: Vec<ChannelRule>,
}

impl ChannelClassifier {
    /// Build a classifier, rejecting rules that would match every channel
    pub fn new(rules: Vec<ChannelRule>) -> AppResult<Self> {
        let mut normalized = Vec::with_capacity(rules.len());

        for rule in rules {
            if rule.groups.is_empty() {
                return Err(AppError::configuration(format!(
                    "Channel rule '{}' has no groups",
                    rule.name
                )));
            }
            let mut groups = Vec::with_capacity(rule.groups.len());
            for group in rule.groups {
                if group.is_empty() {
                    return Err(AppError::configuration(format!(
                        "Channel rule '{}' has an empty group",
                        rule.name
                    )));
                }
                if group.iter().any(|alternative| alternative.is_empty()) {
                    return Err(AppError::configuration(format!(
                        "Channel rule '{}' has an empty alternative",
                        rule.name
                    )));
                }
                groups.push(group.iter().map(|alternative| alternative.to_lowercase()).collect());
            }
            normalized.push(ChannelRule {
                name: rule.name,
                groups,
            });
        }

        Ok(Self { rules: normalized })
    }

    pub fn rules(&self) -> &[ChannelRule] {
        &self.rules
    }

    /// Case-insensitive keep decision for a display name
    pub fn keep_channel(&self, display_name: &str) -> bool {
        self.matching_rule(display_name).is_some()
    }

    /// First rule that keeps the display name, if any
    pub fn matching_rule(&self, display_name: &str) -> Option<&ChannelRule> {
        let name = display_name.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&name))
    }
}
