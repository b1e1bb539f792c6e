//! Attribute store.
//!
//! Attributes are free-form string pairs. Every attribute is declared per object kind with a
//! default value; objects only store the values that were explicitly set on them.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
    Graph,
    Node,
    Edge,
}

impl std::fmt::Display for AttrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AttrKind::Graph => "graph",
            AttrKind::Node => "node",
            AttrKind::Edge => "edge",
        })
    }
}

/// Declared attributes and their defaults, one table per object kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttrDefaults {
    graph: IndexMap<String, String>,
    node: IndexMap<String, String>,
    edge: IndexMap<String, String>,
}

impl AttrDefaults {
    fn table(&self, kind: AttrKind) -> &IndexMap<String, String> {
        match kind {
            AttrKind::Graph => &self.graph,
            AttrKind::Node => &self.node,
            AttrKind::Edge => &self.edge,
        }
    }

    fn table_mut(&mut self, kind: AttrKind) -> &mut IndexMap<String, String> {
        match kind {
            AttrKind::Graph => &mut self.graph,
            AttrKind::Node => &mut self.node,
            AttrKind::Edge => &mut self.edge,
        }
    }

    /// Declares `name` for `kind` (or replaces its default).
    pub fn declare(&mut self, kind: AttrKind, name: &str, default: &str) -> Result<()> {
        validate_name(name)?;
        self.table_mut(kind)
            .insert(name.to_string(), default.to_string());
        Ok(())
    }

    /// Declares `name` with `default` unless it is already declared.
    pub fn declare_if_missing(&mut self, kind: AttrKind, name: &str, default: &str) -> Result<()> {
        validate_name(name)?;
        self.table_mut(kind)
            .entry(name.to_string())
            .or_insert_with(|| default.to_string());
        Ok(())
    }

    pub fn is_declared(&self, kind: AttrKind, name: &str) -> bool {
        self.table(kind).contains_key(name)
    }

    pub fn get(&self, kind: AttrKind, name: &str) -> Option<&str> {
        self.table(kind).get(name).map(String::as_str)
    }

    pub fn iter(&self, kind: AttrKind) -> impl Iterator<Item = (&str, &str)> {
        self.table(kind)
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Values explicitly set on one graph, node or edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrValues(IndexMap<String, String>);

impl AttrValues {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub(crate) fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().any(char::is_control) {
        return Err(Error::InvalidAttributeName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Parses a Graphviz boolean (`true`/`yes`/non-zero integer).
pub fn parse_bool(value: &str) -> bool {
    let v = value.trim();
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") {
        return true;
    }
    v.parse::<i64>().is_ok_and(|n| n != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_rejects_empty_names() {
        let mut defaults = AttrDefaults::default();
        assert!(defaults.declare(AttrKind::Node, "", "x").is_err());
        assert!(defaults.declare(AttrKind::Node, "  ", "x").is_err());
        assert!(!defaults.is_declared(AttrKind::Node, ""));
    }

    #[test]
    fn declare_if_missing_keeps_existing_default() {
        let mut defaults = AttrDefaults::default();
        defaults.declare(AttrKind::Edge, "color", "red").unwrap();
        defaults
            .declare_if_missing(AttrKind::Edge, "color", "")
            .unwrap();
        assert_eq!(defaults.get(AttrKind::Edge, "color"), Some("red"));
        assert_eq!(defaults.get(AttrKind::Node, "color"), None);
    }

    #[test]
    fn graphviz_booleans() {
        assert!(parse_bool("true"));
        assert!(parse_bool("Yes"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
