//! Test utilities for Flowmap Core

use crate::entity::{flow_property_of, unit_group_of, unit_of};
use crate::model::{Category, FlowProperty, ModelType, Ref, UnitGroup};

/// Mass (kg, g, t) and energy (MJ, kWh) unit groups with their default
/// flow properties.
pub fn sample_units() -> (Vec<UnitGroup>, Vec<FlowProperty>) {
    let mut mass_units = unit_group_of("Units of mass", Some(unit_of("kg", 1.0)));
    mass_units.units.push(unit_of("g", 0.001));
    let mut t = unit_of("t", 1000.0);
    t.synonyms.push("tonne".to_string());
    mass_units.units.push(t);

    let mut energy_units = unit_group_of("Units of energy", Some(unit_of("MJ", 1.0)));
    energy_units.units.push(unit_of("kWh", 3.6));

    let mass = flow_property_of("Mass", Some(&mass_units));
    let energy = flow_property_of("Energy", Some(&energy_units));
    mass_units.default_flow_property = Some(Ref::new(&mass.id, &mass.name));
    energy_units.default_flow_property = Some(Ref::new(&energy.id, &energy.name));

    (vec![mass_units, energy_units], vec![mass, energy])
}

pub fn category(id: &str, name: &str, model_type: ModelType, parent: Option<&str>) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        model_type,
        parent_id: parent.map(str::to_string),
    }
}

/// Flow categories `Elementary flows/{emission/{air, water}, resource}` given
/// in scrambled order, plus one process category.
pub fn sample_categories() -> Vec<Category> {
    vec![
        category("c-water", "water", ModelType::Flow, Some("c-emission")),
        category("c-root", "Elementary flows", ModelType::Flow, None),
        category("c-resource", "Resource", ModelType::Flow, Some("c-root")),
        category("c-air", "Air", ModelType::Flow, Some("c-emission")),
        category("c-emission", "emission", ModelType::Flow, Some("c-root")),
        category("c-proc", "Metals", ModelType::Process, Some("")),
    ]
}
