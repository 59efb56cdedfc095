//! Unit index: unit symbol -> quantity, unit group and conversion factor

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{FlowProperty, Ref, UnitGroup};

/// Everything known about one unit symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEntry {
    /// Default flow property (quantity) of the unit's group.
    pub flow_property: Ref,
    pub unit_group: Ref,
    /// The unit name; for synonyms this is the primary name, not the synonym.
    pub unit: String,
    /// Name of the group's reference unit.
    pub reference_unit: String,
    /// Factor relative to the reference unit of the group.
    pub conversion_factor: f64,
}

/// In-memory lookup table for unit symbols and their synonyms.
///
/// Built once from the complete unit group and flow property catalogs; read
/// only afterwards.
#[derive(Debug, Clone, Default)]
pub struct UnitIndex {
    entries: HashMap<String, UnitEntry>,
    duplicates: usize,
}

impl UnitIndex {
    /// Build the index in two phases: first all unit groups are collected by
    /// id, then each flow property that is the designated default property of
    /// its group registers the units of that group.
    ///
    /// The first registration of a symbol wins; later collisions are logged
    /// and dropped.
    pub fn build<G, P>(groups: G, properties: P) -> Self
    where
        G: IntoIterator<Item = UnitGroup>,
        P: IntoIterator<Item = FlowProperty>,
    {
        let mut group_map: HashMap<String, UnitGroup> = HashMap::new();
        let mut group_order = Vec::new();
        for group in groups {
            if group_map.contains_key(&group.id) {
                warn!("Duplicate unit group id {} ({}); keeping the first", group.id, group.name);
                continue;
            }
            group_order.push(group.id.clone());
            group_map.insert(group.id.clone(), group);
        }

        let mut index = UnitIndex::default();
        let mut indexed_groups = HashSet::new();
        for prop in properties {
            let Some(group) = prop.unit_group_id().and_then(|id| group_map.get(id)) else {
                debug!("Flow property {} has no known unit group", prop.name);
                continue;
            };
            if group.default_flow_property_id() != Some(prop.id.as_str()) {
                continue;
            }
            if !indexed_groups.insert(group.id.clone()) {
                continue;
            }
            index.register_group(group, &prop);
        }

        for id in &group_order {
            if !indexed_groups.contains(id) {
                if let Some(group) = group_map.get(id) {
                    warn!("Unit group {} has no default flow property; its units are not indexed", group.name);
                }
            }
        }

        debug!(
            "Unit index built: {} symbols from {} unit groups ({} duplicates dropped)",
            index.entries.len(),
            indexed_groups.len(),
            index.duplicates
        );
        index
    }

    fn register_group(&mut self, group: &UnitGroup, prop: &FlowProperty) {
        let reference_unit = group
            .reference_unit()
            .map(|u| u.name.clone())
            .unwrap_or_default();
        let group_ref = Ref::new(&group.id, &group.name);
        let prop_ref = Ref::new(&prop.id, &prop.name);

        for unit in &group.units {
            let entry = UnitEntry {
                flow_property: prop_ref.clone(),
                unit_group: group_ref.clone(),
                unit: unit.name.clone(),
                reference_unit: reference_unit.clone(),
                conversion_factor: unit.conversion_factor,
            };
            let symbols = std::iter::once(&unit.name).chain(unit.synonyms.iter());
            for symbol in symbols {
                let symbol = symbol.trim();
                if symbol.is_empty() {
                    continue;
                }
                if let Some(existing) = self.entries.get(symbol) {
                    warn!(
                        "Duplicate unit symbol '{}' in unit group {}; already registered for {}",
                        symbol, group.name, existing.unit_group.name
                    );
                    self.duplicates += 1;
                    continue;
                }
                self.entries.insert(symbol.to_string(), entry.clone());
            }
        }
    }

    /// Look up a unit symbol or synonym.
    pub fn entry_of(&self, symbol: &str) -> Option<&UnitEntry> {
        self.entries.get(symbol.trim())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entry_of(symbol).is_some()
    }

    /// True iff both symbols are known and belong to the same unit group.
    pub fn are_convertible(&self, a: &str, b: &str) -> bool {
        match (self.entry_of(a), self.entry_of(b)) {
            (Some(ea), Some(eb)) => ea.unit_group.id == eb.unit_group.id,
            _ => false,
        }
    }

    /// Factor that converts an amount in `from` into an amount in `to`.
    pub fn conversion_factor(&self, from: &str, to: &str) -> Option<f64> {
        if !self.are_convertible(from, to) {
            return None;
        }
        let from = self.entry_of(from)?.conversion_factor;
        let to = self.entry_of(to)?.conversion_factor;
        if to == 0.0 {
            return None;
        }
        Some(from / to)
    }

    pub fn property_of(&self, symbol: &str) -> Option<&Ref> {
        self.entry_of(symbol).map(|e| &e.flow_property)
    }

    pub fn factor_of(&self, symbol: &str) -> Option<f64> {
        self.entry_of(symbol).map(|e| e.conversion_factor)
    }

    pub fn reference_unit_of(&self, symbol: &str) -> Option<&str> {
        self.entry_of(symbol)
            .map(|e| e.reference_unit.as_str())
            .filter(|u| !u.is_empty())
    }

    /// Number of indexed symbols, synonyms included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many symbol registrations were dropped as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
