//! Core data structures shared with the reference catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// The kind of flow a query or catalog record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowType {
    /// Exchanged directly with the environment (emissions, resources).
    #[serde(rename = "ElementaryFlow")]
    Elementary,
    /// A product produced by some provider process.
    #[serde(rename = "ProductFlow")]
    Product,
    /// A waste stream treated by some process.
    #[serde(rename = "WasteFlow")]
    Waste,
}

impl FlowType {
    /// Canonical name used in identifiers and persisted documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Elementary => "ElementaryFlow",
            FlowType::Product => "ProductFlow",
            FlowType::Waste => "WasteFlow",
        }
    }

    /// Product and waste flows are linked to provider processes.
    pub fn has_providers(&self) -> bool {
        matches!(self, FlowType::Product | FlowType::Waste)
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "e" | "elementary" | "elementaryflow" => Ok(FlowType::Elementary),
            "p" | "product" | "productflow" => Ok(FlowType::Product),
            "w" | "waste" | "wasteflow" => Ok(FlowType::Waste),
            other => Err(ParseError::UnknownFlowType(other.to_string())),
        }
    }
}

/// Discriminates the record types held by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelType {
    Flow,
    Process,
    UnitGroup,
    FlowProperty,
    Location,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Flow => "Flow",
            ModelType::Process => "Process",
            ModelType::UnitGroup => "UnitGroup",
            ModelType::FlowProperty => "FlowProperty",
            ModelType::Location => "Location",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "flow" => Ok(ModelType::Flow),
            "process" => Ok(ModelType::Process),
            "unitgroup" => Ok(ModelType::UnitGroup),
            "flowproperty" => Ok(ModelType::FlowProperty),
            "location" => Ok(ModelType::Location),
            other => Err(ParseError::UnknownModelType(other.to_string())),
        }
    }
}

/// A descriptor of a catalog record.
///
/// Search results, provider lists and mapping targets are all expressed as
/// refs; only the fields relevant to the record type are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<FlowType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Ref {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Ref {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// The category path joined with `/`.
    pub fn category(&self) -> String {
        self.category_path.join("/")
    }
}

/// A single unit of measurement inside a unit group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub name: String,
    /// Factor relative to the reference unit of the group.
    pub conversion_factor: f64,
    #[serde(default)]
    pub reference_unit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

/// A set of mutually convertible units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_change: String,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_flow_property: Option<Ref>,
}

impl UnitGroup {
    pub fn default_flow_property_id(&self) -> Option<&str> {
        self.default_flow_property
            .as_ref()
            .map(|r| r.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// The unit flagged as reference unit, falling back to the unit with a
    /// conversion factor of exactly 1.
    pub fn reference_unit(&self) -> Option<&Unit> {
        self.units
            .iter()
            .find(|u| u.reference_unit)
            .or_else(|| self.units.iter().find(|u| u.conversion_factor == 1.0))
    }
}

/// A physical quantity such as mass or energy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowProperty {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_change: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_group: Option<Ref>,
}

impl FlowProperty {
    pub fn unit_group_id(&self) -> Option<&str> {
        self.unit_group
            .as_ref()
            .map(|r| r.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Links a flow to one of the quantities it can be measured in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPropertyFactor {
    pub flow_property: Ref,
    pub conversion_factor: f64,
    #[serde(default)]
    pub reference_flow_property: bool,
}

/// A full flow record as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_change: String,
    pub flow_type: FlowType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub flow_properties: Vec<FlowPropertyFactor>,
}

impl Flow {
    /// The flow property marked as reference quantity of this flow.
    pub fn reference_property(&self) -> Option<&Ref> {
        self.flow_properties
            .iter()
            .find(|f| f.reference_flow_property)
            .map(|f| &f.flow_property)
    }

    /// Descriptor of this flow with the given reference unit.
    pub fn to_ref(&self, ref_unit: Option<&str>) -> Ref {
        Ref {
            id: self.id.clone(),
            name: self.name.clone(),
            model_type: Some(ModelType::Flow),
            flow_type: Some(self.flow_type),
            ref_unit: ref_unit.map(str::to_string),
            category_path: self.category_path.clone(),
            location: self.location.clone(),
        }
    }
}

/// A geographic location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_change: String,
    #[serde(default)]
    pub code: String,
}

/// A process record; only the identity and location matter here. The
/// location ref carries the location code in its own `location` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_change: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Ref>,
}

/// A category record as delivered by the catalog: flat, with a parent pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Any record that can be written to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "record")]
pub enum DataSet {
    Flow(Flow),
    UnitGroup(UnitGroup),
    FlowProperty(FlowProperty),
    Location(Location),
    Process(Process),
}

impl DataSet {
    pub fn model_type(&self) -> ModelType {
        match self {
            DataSet::Flow(_) => ModelType::Flow,
            DataSet::UnitGroup(_) => ModelType::UnitGroup,
            DataSet::FlowProperty(_) => ModelType::FlowProperty,
            DataSet::Location(_) => ModelType::Location,
            DataSet::Process(_) => ModelType::Process,
        }
    }

    /// Minimal descriptor of the wrapped record.
    pub fn to_ref(&self) -> Ref {
        let mut r = match self {
            DataSet::Flow(f) => return f.to_ref(None),
            DataSet::UnitGroup(g) => Ref::new(&g.id, &g.name),
            DataSet::FlowProperty(p) => Ref::new(&p.id, &p.name),
            DataSet::Location(l) => {
                let mut r = Ref::new(&l.id, &l.name);
                r.location = (!l.code.is_empty()).then(|| l.code.clone());
                r
            }
            DataSet::Process(p) => {
                let mut r = Ref::new(&p.id, &p.name);
                r.location = p
                    .location
                    .as_ref()
                    .map(|l| l.location.clone().unwrap_or_else(|| l.name.clone()));
                r
            }
        };
        r.model_type = Some(self.model_type());
        r
    }
}
