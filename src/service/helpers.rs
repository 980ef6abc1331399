//! Helpers over lists of shortcut configs

use std::collections::BTreeMap;

use super::types::{ServiceError, ShortcutCategory, ShortcutConfig};

/// Reject configs with an empty id or key.
pub fn validate_config(config: &ShortcutConfig) -> Result<(), ServiceError> {
    if config.id.trim().is_empty() {
        return Err(ServiceError::InvalidConfig("empty shortcut id".to_string()));
    }
    if config.keys.key().is_empty() {
        return Err(ServiceError::InvalidConfig(format!(
            "shortcut '{}' has no key",
            config.id
        )));
    }
    Ok(())
}

/// Pairs of configs bound to the same chord. Reported only; both still fire.
pub fn find_conflicts(configs: &[ShortcutConfig]) -> Vec<(&ShortcutConfig, &ShortcutConfig)> {
    let mut conflicts = Vec::new();
    for (i, a) in configs.iter().enumerate() {
        for b in &configs[i + 1..] {
            if a.keys.to_canonical_string() == b.keys.to_canonical_string() {
                conflicts.push((a, b));
            }
        }
    }
    conflicts
}

pub fn filter_by_category(
    configs: &[ShortcutConfig],
    category: ShortcutCategory,
) -> Vec<&ShortcutConfig> {
    configs.iter().filter(|c| c.category == category).collect()
}

pub fn group_by_category(
    configs: &[ShortcutConfig],
) -> BTreeMap<ShortcutCategory, Vec<&ShortcutConfig>> {
    let mut groups: BTreeMap<ShortcutCategory, Vec<&ShortcutConfig>> = BTreeMap::new();
    for config in configs {
        groups.entry(config.category).or_default().push(config);
    }
    groups
}

pub fn format_shortcut(config: &ShortcutConfig) -> String {
    config.keys.display()
}
