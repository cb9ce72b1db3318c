//! Store configuration from environment-style key lookups.
//!
//! | Key | Default | Meaning |
//! |---|---|---|
//! | `TODO_BASE_URL` | `http://localhost:3000` | Collection endpoint |
//! | `TODO_OWNER` | unset | Identity bound at startup |
//! | `TODO_SCOPED` | `true` if `TODO_OWNER` is set | Enable owner scoping |
//! | `TODO_RECONCILE` | `reload` | `reload` or `keep-local` |

use crate::error::ConfigError;
use crate::store::{Reconcile, Scope};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub owner: Option<String>,
    pub scoped: bool,
    pub reconcile: Reconcile,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            owner: None,
            scoped: false,
            reconcile: Reconcile::Reload,
        }
    }
}

impl StoreConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which returns the raw value
    /// of a key or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup("TODO_BASE_URL") {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::Empty {
                    key: "TODO_BASE_URL",
                })
            }
            Some(url) => url.trim().to_string(),
            None => DEFAULT_BASE_URL.to_string(),
        };

        let owner = lookup("TODO_OWNER")
            .map(|owner| owner.trim().to_string())
            .filter(|owner| !owner.is_empty());

        let scoped = match lookup("TODO_SCOPED") {
            Some(raw) => parse_bool("TODO_SCOPED", &raw)?,
            None => owner.is_some(),
        };

        let reconcile = match lookup("TODO_RECONCILE") {
            Some(raw) => parse_reconcile(&raw)?,
            None => Reconcile::default(),
        };

        Ok(Self {
            base_url,
            owner,
            scoped,
            reconcile,
        })
    }

    /// Scope for a store built from this configuration. The owner is ignored
    /// when scoping is off.
    pub fn scope(&self) -> Scope {
        if self.scoped {
            Scope::Owner(self.owner.clone())
        } else {
            Scope::Shared
        }
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "true|false|1|0",
        }),
    }
}

fn parse_reconcile(raw: &str) -> Result<Reconcile, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "reload" => Ok(Reconcile::Reload),
        "keep-local" => Ok(Reconcile::KeepLocal),
        _ => Err(ConfigError::InvalidValue {
            key: "TODO_RECONCILE",
            value: raw.to_string(),
            expected: "reload|keep-local",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.scope(), Scope::Shared);
    }

    #[test]
    fn owner_enables_scoping_by_default() {
        let config = load(&[("TODO_OWNER", " alice ")]).unwrap();
        assert_eq!(config.owner.as_deref(), Some("alice"));
        assert!(config.scoped);
        assert_eq!(config.scope(), Scope::Owner(Some("alice".to_string())));
    }

    #[test]
    fn scoping_without_owner_starts_unbound() {
        let config = load(&[("TODO_SCOPED", "1")]).unwrap();
        assert_eq!(config.scope(), Scope::Owner(None));
    }

    #[test]
    fn scoping_can_be_turned_off_explicitly() {
        let config = load(&[("TODO_OWNER", "alice"), ("TODO_SCOPED", "false")]).unwrap();
        assert_eq!(config.scope(), Scope::Shared);
    }

    #[test]
    fn reconcile_is_parsed() {
        let config = load(&[("TODO_RECONCILE", "Keep-Local")]).unwrap();
        assert_eq!(config.reconcile, Reconcile::KeepLocal);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("TODO_SCOPED", "maybe")]),
            Err(ConfigError::InvalidValue {
                key: "TODO_SCOPED",
                ..
            })
        ));
        assert!(matches!(
            load(&[("TODO_RECONCILE", "retry")]),
            Err(ConfigError::InvalidValue {
                key: "TODO_RECONCILE",
                ..
            })
        ));
        assert_eq!(
            load(&[("TODO_BASE_URL", "  ")]),
            Err(ConfigError::Empty {
                key: "TODO_BASE_URL"
            })
        );
    }
}
