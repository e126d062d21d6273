use serde::Deserialize;
use std::env;

const NAME_VAR: &str = "BMCS_CORE_NAME";
const TRACE_HOOKS_VAR: &str = "BMCS_CORE_TRACE_HOOKS";

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Label attached to log events and notices
    pub name: String,
    /// Log every individual hook at debug level
    pub trace_hooks: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            name: "bmcs-core".to_string(),
            trace_hooks: true,
        }
    }
}

impl CoordinatorConfig {
    /// Load from `BMCS_CORE_NAME` and `BMCS_CORE_TRACE_HOOKS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Missing or malformed values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(NAME_VAR).filter(|v| !v.trim().is_empty()) {
            config.name = name.trim().to_string();
        }

        if let Some(raw) = lookup(TRACE_HOOKS_VAR) {
            match parse_bool(&raw) {
                Some(value) => config.trace_hooks = value,
                None => tracing::warn!(
                    "Ignoring {}={:?}: expected a boolean",
                    TRACE_HOOKS_VAR,
                    raw
                ),
            }
        }

        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CoordinatorConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CoordinatorConfig::default());
    }

    #[test]
    fn test_reads_values() {
        let config = CoordinatorConfig::from_lookup(lookup(&[
            ("BMCS_CORE_NAME", " storefront "),
            ("BMCS_CORE_TRACE_HOOKS", "off"),
        ]));
        assert_eq!(config.name, "storefront");
        assert!(!config.trace_hooks);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = CoordinatorConfig::from_lookup(lookup(&[
            ("BMCS_CORE_NAME", "   "),
            ("BMCS_CORE_TRACE_HOOKS", "sometimes"),
        ]));
        assert_eq!(config, CoordinatorConfig::default());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CoordinatorConfig =
            serde_json::from_str(r#"{ "name": "worker" }"#).unwrap();
        assert_eq!(config.name, "worker");
        assert!(config.trace_hooks);
    }
}
