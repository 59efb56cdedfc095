//! Normalized descriptions of wanted flows

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::mapping::{FlowMap, FlowMapRef, MappingEntry};
use crate::model::{FlowType, ModelType, Ref};

/// An immutable description of a flow as a human would name it, e.g.
/// `Carbon dioxide, g, air/unspecified`.
///
/// The category is a `/` separated list of path fragments which are matched
/// as substrings against catalog category paths.
#[derive(Debug, Clone)]
pub struct FlowQuery {
    flow_type: FlowType,
    name: String,
    unit: String,
    category: String,
    location: String,
    id: OnceLock<String>,
}

fn normalize<'a>(value: impl Into<Option<&'a str>>) -> String {
    value.into().map(str::trim).unwrap_or_default().to_string()
}

impl FlowQuery {
    pub fn new<'a>(flow_type: FlowType, name: impl Into<Option<&'a str>>) -> Self {
        FlowQuery {
            flow_type,
            name: normalize(name),
            unit: String::new(),
            category: String::new(),
            location: String::new(),
            id: OnceLock::new(),
        }
    }

    pub fn elementary<'a>(name: impl Into<Option<&'a str>>) -> Self {
        Self::new(FlowType::Elementary, name)
    }

    pub fn product<'a>(name: impl Into<Option<&'a str>>) -> Self {
        Self::new(FlowType::Product, name)
    }

    pub fn waste<'a>(name: impl Into<Option<&'a str>>) -> Self {
        Self::new(FlowType::Waste, name)
    }

    pub fn with_unit<'a>(mut self, unit: impl Into<Option<&'a str>>) -> Self {
        self.unit = normalize(unit);
        self.id = OnceLock::new();
        self
    }

    pub fn with_category<'a>(mut self, category: impl Into<Option<&'a str>>) -> Self {
        self.category = normalize(category);
        self.id = OnceLock::new();
        self
    }

    pub fn with_location<'a>(mut self, location: impl Into<Option<&'a str>>) -> Self {
        self.location = normalize(location);
        self.id = OnceLock::new();
        self
    }

    pub fn flow_type(&self) -> FlowType {
        self.flow_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Non-empty fragments of the category path.
    pub fn category_path(&self) -> Vec<String> {
        self.category
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Stable identifier of this query: the MD5 digest of the canonical
    /// string read as a little-endian GUID, so ids match flow maps written by
    /// .NET clients. Computed on first access.
    pub fn flow_id(&self) -> &str {
        self.id.get_or_init(|| {
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(&Md5::digest(self.to_string().as_bytes()));
            Uuid::from_bytes_le(bytes).to_string()
        })
    }

    /// Projection into the `from` side of a mapping entry.
    pub fn to_mapping_ref(&self) -> FlowMapRef {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let flow = Ref {
            id: self.flow_id().to_string(),
            name: self.name.clone(),
            model_type: Some(ModelType::Flow),
            flow_type: Some(self.flow_type),
            ref_unit: non_empty(&self.unit),
            category_path: self.category_path(),
            location: non_empty(&self.location),
        };
        FlowMapRef {
            flow: Some(flow),
            unit: non_empty(&self.unit).map(|u| Ref::new(u.clone(), u)),
            ..Default::default()
        }
    }

    /// Rebuild a query from the `from` side of a stored entry.
    pub fn from_mapping_ref(mapping_ref: &FlowMapRef) -> Option<Self> {
        let flow = mapping_ref.flow.as_ref()?;
        let flow_type = flow.flow_type?;
        let category = flow.category();
        Some(
            FlowQuery::new(flow_type, flow.name.as_str())
                .with_unit(flow.ref_unit.as_deref())
                .with_category(category.as_str())
                .with_location(flow.location.as_deref()),
        )
    }

    /// Linear scan for an entry created from an identical query. Entries with
    /// missing references are skipped.
    pub fn find_entry_in<'a>(&self, flow_map: &'a FlowMap) -> Option<&'a MappingEntry> {
        let id = self.flow_id();
        flow_map
            .mappings
            .iter()
            .find(|e| e.target_flow().is_some() && e.source_id() == Some(id))
    }
}

impl fmt::Display for FlowQuery {
    /// `Type - Name - Unit - Location - Category`, empty fields omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            self.flow_type.as_str(),
            self.name.as_str(),
            self.unit.as_str(),
            self.location.as_str(),
            self.category.as_str(),
        ];
        let mut first = true;
        for part in parts.iter().filter(|p| !p.is_empty()) {
            if !first {
                f.write_str(" - ")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

impl PartialEq for FlowQuery {
    fn eq(&self, other: &Self) -> bool {
        self.flow_type == other.flow_type
            && self.name == other.name
            && self.unit == other.unit
            && self.category == other.category
            && self.location == other.location
    }
}

impl Eq for FlowQuery {}

impl Hash for FlowQuery {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.flow_type.hash(state);
        self.name.hash(state);
        self.unit.hash(state);
        self.category.hash(state);
        self.location.hash(state);
    }
}
