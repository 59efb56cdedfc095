//! Persisted flow mappings

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Ref;
use crate::namespaces;

/// One side of a mapping entry.
///
/// Every nested reference is optional because documents loaded from the
/// mapping service are not validated; incomplete entries are skipped during
/// lookup instead of failing the whole map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMapRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_property: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Ref>,
}

impl FlowMapRef {
    pub fn flow_id(&self) -> Option<&str> {
        self.flow
            .as_ref()
            .map(|f| f.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// A persisted association from a described flow to a catalog flow.
///
/// Entries are never edited after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<FlowMapRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<FlowMapRef>,
    #[serde(default = "default_factor")]
    pub conversion_factor: f64,
}

fn default_factor() -> f64 {
    1.0
}

impl MappingEntry {
    pub fn new(from: FlowMapRef, to: FlowMapRef, conversion_factor: f64) -> Self {
        MappingEntry {
            from: Some(from),
            to: Some(to),
            conversion_factor,
        }
    }

    /// Id of the source query, if the entry is well formed.
    pub fn source_id(&self) -> Option<&str> {
        self.from.as_ref().and_then(FlowMapRef::flow_id)
    }

    /// The mapped catalog flow.
    pub fn target_flow(&self) -> Option<&Ref> {
        self.to.as_ref().and_then(|t| t.flow.as_ref())
    }

    pub fn provider(&self) -> Option<&Ref> {
        self.to.as_ref().and_then(|t| t.provider.as_ref())
    }

    /// Both sides carry a flow reference.
    pub fn is_complete(&self) -> bool {
        self.source_id().is_some() && self.target_flow().is_some()
    }

    /// Convert an amount given in the source unit into the target unit.
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.conversion_factor
    }
}

/// A named, ordered table of mapping entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMap {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
}

impl FlowMap {
    /// An empty map whose id is derived from its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = Uuid::new_v5(&namespaces::FLOW_MAP, name.as_bytes()).to_string();
        FlowMap {
            id,
            name,
            mappings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// All well-formed entries whose source has the given id.
    pub fn entries_for<'a>(&'a self, flow_id: &'a str) -> impl Iterator<Item = &'a MappingEntry> + 'a {
        self.mappings
            .iter()
            .filter(move |e| e.source_id() == Some(flow_id) && e.target_flow().is_some())
    }

    /// Number of entries that lack a source or target flow.
    pub fn malformed_count(&self) -> usize {
        self.mappings.iter().filter(|e| !e.is_complete()).count()
    }

    pub fn push(&mut self, entry: MappingEntry) {
        self.mappings.push(entry);
    }
}
