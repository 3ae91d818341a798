//! Namespaced identifiers.
//!
//! Every block, item, entity type and entity event the host exposes is named
//! by a `namespace:path` identifier (`minecraft:coal_ore`,
//! `miner:backpack_red`). Keys are validated once on parse and serialize as
//! their plain string form so configs and snapshots stay readable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RegistryKeyError {
    message: String,
}

impl RegistryKeyError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse a registry key.
    ///
    /// Accepts either:
    /// - `namespace:path`
    /// - `path` (uses [`DEFAULT_NAMESPACE`])
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a registry key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::new("RegistryKey cannot be empty"));
        }

        let (namespace, path) = match input.split_once(':') {
            Some((ns, p)) => (ns, p),
            None => (default_namespace, input),
        };

        Self::new(namespace.trim(), path.trim())
    }

    /// Build a key from already separated parts.
    pub fn new(namespace: &str, path: &str) -> Result<Self, RegistryKeyError> {
        validate_namespace(namespace)?;
        validate_path(path)?;
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Build a key from compile-time constants known to be valid.
    pub(crate) fn from_static(namespace: &'static str, path: &'static str) -> Self {
        debug_assert!(validate_namespace(namespace).is_ok() && validate_path(path).is_ok());
        Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        }
    }

    /// The empty block (`minecraft:air`).
    pub fn air() -> Self {
        Self::from_static(DEFAULT_NAMESPACE, "air")
    }

    /// True for the empty block.
    pub fn is_air(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE && self.path == "air"
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the full `namespace:path` form starts with `prefix`.
    ///
    /// Item families are configured as identifier prefixes (`miner:backpack`
    /// matches `miner:backpack` and `miner:backpack_red`).
    pub fn starts_with(&self, prefix: &str) -> bool {
        match prefix.split_once(':') {
            Some((ns, path)) => self.namespace == ns && self.path.starts_with(path),
            None => self.namespace.starts_with(prefix),
        }
    }

    /// Last `_`-delimited token of the full identifier.
    ///
    /// `miner:backpack_red` yields `red`. A path with no underscore yields
    /// the whole path (`miner:backpack` yields `backpack`).
    pub fn last_token(&self) -> &str {
        match self.path.rsplit_once('_') {
            Some((_, token)) => token,
            None => &self.path,
        }
    }

    /// Same namespace, with `prefix` prepended to the path.
    pub fn with_path_prefix(&self, prefix: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            path: format!("{prefix}{}", self.path),
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

fn validate_namespace(ns: &str) -> Result<(), RegistryKeyError> {
    if ns.is_empty() {
        return Err(RegistryKeyError::new("RegistryKey namespace cannot be empty"));
    }
    if ns.len() > 64 {
        return Err(RegistryKeyError::new(
            "RegistryKey namespace too long (max 64)",
        ));
    }
    if !ns
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err(RegistryKeyError::new(
            "RegistryKey namespace has invalid characters (allowed: a-z0-9_.-)",
        ));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), RegistryKeyError> {
    if path.is_empty() {
        return Err(RegistryKeyError::new("RegistryKey path cannot be empty"));
    }
    if path.len() > 128 {
        return Err(RegistryKeyError::new("RegistryKey path too long (max 128)"));
    }
    if !path
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err(RegistryKeyError::new(
            "RegistryKey path has invalid characters (allowed: a-z0-9_./-)",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("miner:oreradar").unwrap();
        assert_eq!(key.namespace(), "miner");
        assert_eq!(key.path(), "oreradar");
        assert_eq!(key.to_string(), "miner:oreradar");
    }

    #[test]
    fn parses_with_default_namespace() {
        let key = RegistryKey::parse("coal_ore").unwrap();
        assert_eq!(key.to_string(), "minecraft:coal_ore");
    }

    #[test]
    fn rejects_invalid() {
        assert!(RegistryKey::parse("").is_err());
        assert!(RegistryKey::parse("   ").is_err());
        assert!(RegistryKey::parse("minecraft:Coal").is_err());
        assert!(RegistryKey::parse("minecraft:").is_err());
        assert!(RegistryKey::parse(":coal").is_err());
    }

    #[test]
    fn prefix_matching_spans_namespace_and_path() {
        let red = RegistryKey::parse("miner:backpack_red").unwrap();
        assert!(red.starts_with("miner:backpack"));
        assert!(red.starts_with("miner"));
        assert!(!red.starts_with("minecraft:backpack"));

        let chest = RegistryKey::parse("minecraft:iron_chestplate").unwrap();
        assert!(!chest.starts_with("miner:backpack"));
    }

    #[test]
    fn last_token_splits_on_final_underscore() {
        assert_eq!(RegistryKey::parse("miner:backpack_red").unwrap().last_token(), "red");
        assert_eq!(
            RegistryKey::parse("miner:backpack_big_purple").unwrap().last_token(),
            "purple"
        );
        assert_eq!(RegistryKey::parse("miner:backpack").unwrap().last_token(), "backpack");
    }

    #[test]
    fn deep_variant_keeps_namespace() {
        let ore = RegistryKey::parse("minecraft:coal_ore").unwrap();
        assert_eq!(
            ore.with_path_prefix("deepslate_").to_string(),
            "minecraft:deepslate_coal_ore"
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = RegistryKey::parse("minecraft:diamond").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"minecraft:diamond\"");
        let back: RegistryKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<RegistryKey>("\"Bad Key\"").is_err());
    }
}
