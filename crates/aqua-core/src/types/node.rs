//! Speed-test node catalogue types
//!
//! The catalogue is a JSON object keyed by node id. Every node names the
//! test server, how many threads to drive it with, and how much data a
//! single test pass transfers.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Localized text with Chinese and English variants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub zh: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    /// True when neither variant carries text
    pub fn is_blank(&self) -> bool {
        self.zh.is_empty() && self.en.is_empty()
    }

    /// Preferred display text, falling back to English
    pub fn display(&self) -> &str {
        if self.zh.is_empty() {
            &self.en
        } else {
            &self.zh
        }
    }
}

/// Test payload size in megabytes
///
/// Accepts either a bare number or an object of the form `{"value": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Size(pub u64);

impl Size {
    /// Traffic consumed by a full test run in bytes (four passes)
    pub fn required_traffic_bytes(&self) -> u64 {
        self.0.saturating_mul(1000 * 1000 * 4)
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawSize {
            Number(i64),
            Object { value: i64 },
        }

        let value = match RawSize::deserialize(deserializer)? {
            RawSize::Number(v) => v,
            RawSize::Object { value } => value,
        };

        if value < 0 {
            return Err(serde::de::Error::custom(format!(
                "size value cannot be negative: {}",
                value
            )));
        }

        Ok(Size(value as u64))
    }
}

/// Geographic placement of a node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Placement category (e.g. domestic, overseas)
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl GeoInfo {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.country_code.is_empty() {
            return Err("countryCode cannot be empty".to_string());
        }
        if self.country_code.chars().count() != 2 {
            return Err(format!(
                "countryCode must be 2 characters: {}",
                self.country_code
            ));
        }
        if self.kind.is_empty() {
            return Err("type cannot be empty".to_string());
        }
        Ok(())
    }
}

/// A single speed-test node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub isp: LocalizedText,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub threads: u8,
    /// Test protocol passed through to the speed-test binary
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub geo_info: GeoInfo,
}

impl Node {
    /// Validate the node's fields
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(|reason| Error::invalid_node(&self.id, reason))
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.id.is_empty() {
            return Err("id cannot be empty".to_string());
        }
        if self.name.is_blank() {
            return Err("at least one name (zh or en) must be provided".to_string());
        }
        if self.size.0 == 0 {
            return Err("size must be positive".to_string());
        }
        if self.isp.is_blank() {
            return Err("at least one ISP name (zh or en) must be provided".to_string());
        }
        if !self.url.is_empty() && !self.url.starts_with("http") {
            return Err(format!("invalid URL format: {}", self.url));
        }
        if self.threads == 0 {
            return Err("threads cannot be zero".to_string());
        }
        if self.kind.is_empty() {
            return Err("type cannot be empty".to_string());
        }
        self.geo_info
            .validate()
            .map_err(|e| format!("invalid geoInfo: {}", e))
    }
}

/// Node catalogue keyed by node id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeList(BTreeMap<String, Node>);

impl NodeList {
    /// Parse and validate a catalogue from JSON bytes
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let list: NodeList = serde_json::from_slice(data)?;
        list.validate()?;
        Ok(list)
    }

    /// Validate every node and the key/id correspondence
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::EmptyNodeList);
        }

        for (id, node) in &self.0 {
            if id.is_empty() {
                return Err(Error::invalid_node(id, "empty node ID found"));
            }
            if *id != node.id {
                return Err(Error::invalid_node(
                    id,
                    format!("map key '{}' != node ID '{}'", id, node.id),
                ));
            }
            node.validate()?;
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.0.get(id)
    }

    /// All node ids in key order
    pub fn ids(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Nodes in display order: placement type, then ISP, then id
    pub fn sorted(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.0.values().collect();
        nodes.sort_by(|a, b| {
            a.geo_info
                .kind
                .cmp(&b.geo_info.kind)
                .then_with(|| a.isp.display().cmp(b.isp.display()))
                .then_with(|| a.id.cmp(&b.id))
        });
        nodes
    }

    /// Resolve a node by id, or by 1-based index into [`NodeList::sorted`]
    pub fn resolve(&self, target: &str) -> Option<&Node> {
        if let Some(node) = self.0.get(target) {
            return Some(node);
        }

        let index: usize = target.parse().ok()?;
        if index == 0 {
            return None;
        }
        self.sorted().into_iter().nth(index - 1)
    }
}

impl FromIterator<Node> for NodeList {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        NodeList(iter.into_iter().map(|n| (n.id.clone(), n)).collect())
    }
}
