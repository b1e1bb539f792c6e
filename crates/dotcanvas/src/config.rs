//! Construction-time canvas settings.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Ordered `(name, value)` pairs passed verbatim to the layout engine as attribute defaults.
pub type NameValueList = Vec<(String, String)>;

pub const DEFAULT_LAYOUT_ENGINE: &str = "dot";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub graph_attributes: NameValueList,
    pub node_attributes: NameValueList,
    pub edge_attributes: NameValueList,
    pub layout_engine: String,
    /// Overrides the display device's logical DPI when set.
    pub dpi: Option<f64>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            graph_attributes: Vec::new(),
            node_attributes: Vec::new(),
            edge_attributes: Vec::new(),
            layout_engine: DEFAULT_LAYOUT_ENGINE.to_string(),
            dpi: None,
        }
    }
}

impl CanvasSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn graph_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.graph_attributes.push((name.into(), value.into()));
        self
    }

    pub fn node_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_attributes.push((name.into(), value.into()));
        self
    }

    pub fn edge_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.edge_attributes.push((name.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = CanvasSettings::from_json(
            r#"{ "node_attributes": [["shape", "box"], ["style", "filled"]] }"#,
        )
        .unwrap();
        assert_eq!(settings.layout_engine, "dot");
        assert_eq!(settings.dpi, None);
        assert_eq!(
            settings.node_attributes,
            vec![
                ("shape".to_string(), "box".to_string()),
                ("style".to_string(), "filled".to_string()),
            ]
        );
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let settings = CanvasSettings::default()
            .graph_attribute("rankdir", "LR")
            .graph_attribute("nodesep", "0.5");
        let back = CanvasSettings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CanvasSettings::from_json("{ nope").is_err());
    }
}
