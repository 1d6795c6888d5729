//! Layered parameter merging.
//!
//! The effective configuration of an application is assembled from three
//! layers, applied in order: the core defaults, each installed module's
//! defaults (in install order), and finally the caller's overrides. Mapping
//! values merge key by key; every other value, sequences included, is
//! replaced wholesale by the later layer.

use serde_json::{Map, Value};

/// Option name to value mapping.
pub type Configuration = Map<String, Value>;

/// A module default that tried to change the JSON type of a core key.
///
/// Conflicts never abort a merge: the offending key is skipped, the core
/// value survives, and the conflict is returned for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("module '{module}' declares '{key}' as {offered}, but the core defines it as {expected}")]
pub struct ConfigConflict {
    pub module: String,
    pub key: String,
    pub expected: &'static str,
    pub offered: &'static str,
}

/// Result of [`ParamStore::merge`].
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub config: Configuration,
    pub conflicts: Vec<ConfigConflict>,
}

/// Holds the core defaults and the set of keys modules may not retype.
#[derive(Debug, Clone)]
pub struct ParamStore {
    core: Configuration,
    reserved: &'static [&'static str],
}

impl ParamStore {
    pub fn new(core: Configuration, reserved: &'static [&'static str]) -> Self {
        Self { core, reserved }
    }

    pub fn core(&self) -> &Configuration {
        &self.core
    }

    /// Merge `defaults` (module name, module params) and then `overrides` on
    /// top of the core defaults.
    pub fn merge<'a, I>(&self, defaults: I, overrides: &Configuration) -> MergeOutcome
    where
        I: IntoIterator<Item = (&'a str, &'a Configuration)>,
    {
        let mut config = self.core.clone();
        let mut conflicts = Vec::new();

        for (module, params) in defaults {
            let mut accepted = Configuration::new();
            for (key, value) in params {
                if let Some(conflict) = self.check_reserved(module, key, value) {
                    log::warn!("{}", conflict);
                    conflicts.push(conflict);
                    continue;
                }
                accepted.insert(key.clone(), value.clone());
            }
            deep_merge(&mut config, &accepted);
        }

        deep_merge(&mut config, overrides);
        MergeOutcome { config, conflicts }
    }

    fn check_reserved(&self, module: &str, key: &str, value: &Value) -> Option<ConfigConflict> {
        if !self.reserved.contains(&key) {
            return None;
        }
        let core = self.core.get(key)?;
        let (expected, offered) = (json_type(core), json_type(value));
        (expected != offered).then(|| ConfigConflict {
            module: module.to_string(),
            key: key.to_string(),
            expected,
            offered,
        })
    }
}

/// Recursively merge `source` into `target`; `source` wins on every leaf.
pub fn deep_merge(target: &mut Configuration, source: &Configuration) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => deep_merge(existing, incoming),
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Look up a dotted path such as `"panel.swipeThreshold"`.
pub fn get_path<'a>(config: &'a Configuration, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = config.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
