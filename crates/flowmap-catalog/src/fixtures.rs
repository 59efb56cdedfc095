//! A small seeded catalog for tests and demos

use flowmap_core::entity::{
    flow_of, flow_property_of, location_of, process_of, unit_group_of, unit_of,
};
use flowmap_core::{Category, DataSet, Entity, Flow, FlowType, ModelType, Ref};

use crate::providers::memory::{InMemoryCatalog, ProviderLink, Snapshot};

pub const CO2_AIR_ID: &str = "f0a3a9d2-2a51-4b1e-9a1c-0000000000c1";
pub const CO2_WATER_ID: &str = "f0a3a9d2-2a51-4b1e-9a1c-0000000000c2";
pub const METHANE_ID: &str = "f0a3a9d2-2a51-4b1e-9a1c-0000000000c3";
pub const ELECTRICITY_ID: &str = "f0a3a9d2-2a51-4b1e-9a1c-0000000000e1";
pub const STEEL_ID: &str = "f0a3a9d2-2a51-4b1e-9a1c-0000000000e2";
pub const MSW_ID: &str = "f0a3a9d2-2a51-4b1e-9a1c-0000000000e3";

fn category(id: &str, name: &str, model_type: ModelType, parent: Option<&str>) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        model_type,
        parent_id: parent.map(str::to_string),
    }
}

fn flow(id: &str, name: &str, flow_type: FlowType, property: &Ref, path: &[&str]) -> Flow {
    let mut flow = flow_of(name, flow_type, Some(property)).with_id(id);
    flow.category_path = path.iter().map(|s| s.to_string()).collect();
    flow
}

fn provider(flow_id: &str, name: &str, location: &str) -> (ProviderLink, DataSet) {
    let process = process_of(name, Some(&location_of(location, None)));
    let record = DataSet::Process(process);
    let link = ProviderLink {
        flow_id: flow_id.to_string(),
        process: record.to_ref(),
    };
    (link, record)
}

/// Content of the seeded catalog.
///
/// Units: Mass (kg, g, t), Energy (MJ, kWh), Number of items (Item(s)).
/// Flows: two "Carbon dioxide" emissions (air and water), methane, and three
/// products/wastes with providers at different locations.
pub fn sample_snapshot() -> Snapshot {
    let mut mass_units = unit_group_of("Units of mass", Some(unit_of("kg", 1.0)));
    mass_units.units.push(unit_of("g", 0.001));
    let mut tonne = unit_of("t", 1000.0);
    tonne.synonyms.push("tonne".to_string());
    mass_units.units.push(tonne);

    let mut energy_units = unit_group_of("Units of energy", Some(unit_of("MJ", 1.0)));
    energy_units.units.push(unit_of("kWh", 3.6));

    let mut item_units = unit_group_of("Units of items", Some(unit_of("Item(s)", 1.0)));

    let mass = flow_property_of("Mass", Some(&mass_units));
    let energy = flow_property_of("Energy", Some(&energy_units));
    let items = flow_property_of("Number of items", Some(&item_units));
    mass_units.default_flow_property = Some(Entity::to_ref(&mass));
    energy_units.default_flow_property = Some(Entity::to_ref(&energy));
    item_units.default_flow_property = Some(Entity::to_ref(&items));

    let mass_ref = Entity::to_ref(&mass);
    let energy_ref = Entity::to_ref(&energy);

    let categories = vec![
        category("cat-elem", "Elementary flows", ModelType::Flow, None),
        category("cat-emission", "emission", ModelType::Flow, Some("cat-elem")),
        category("cat-air", "air", ModelType::Flow, Some("cat-emission")),
        category("cat-air-unspec", "unspecified", ModelType::Flow, Some("cat-air")),
        category("cat-air-urban", "urban", ModelType::Flow, Some("cat-air")),
        category("cat-water", "water", ModelType::Flow, Some("cat-emission")),
        category("cat-products", "Products", ModelType::Flow, None),
        category("cat-energy", "Energy carriers", ModelType::Flow, Some("cat-products")),
        category("cat-metals", "Metals", ModelType::Flow, Some("cat-products")),
        category("cat-waste", "Waste", ModelType::Flow, None),
        category("cat-proc-energy", "Electricity", ModelType::Process, None),
        category("cat-proc-waste", "Waste treatment", ModelType::Process, None),
    ];

    let flows = vec![
        flow(CO2_AIR_ID, "Carbon dioxide", FlowType::Elementary, &mass_ref, &["emission", "air", "unspecified"]),
        flow(CO2_WATER_ID, "Carbon dioxide", FlowType::Elementary, &mass_ref, &["emission", "water"]),
        flow(METHANE_ID, "Methane", FlowType::Elementary, &mass_ref, &["emission", "air", "unspecified"]),
        flow(ELECTRICITY_ID, "Electricity, high voltage", FlowType::Product, &energy_ref, &["Products", "Energy carriers"]),
        flow(STEEL_ID, "Steel, low-alloyed", FlowType::Product, &mass_ref, &["Products", "Metals"]),
        flow(MSW_ID, "Municipal solid waste", FlowType::Waste, &mass_ref, &["Waste"]),
    ];

    let mut providers = Vec::new();
    let mut entities = Vec::new();
    for (flow_id, name, location) in [
        (ELECTRICITY_ID, "electricity production, hard coal", "DE"),
        (ELECTRICITY_ID, "electricity production, nuclear", "FR"),
        (STEEL_ID, "steel production, converter", "GLO"),
        (MSW_ID, "treatment of municipal solid waste, incineration", "CH"),
    ] {
        let (link, record) = provider(flow_id, name, location);
        providers.push(link);
        entities.push(record);
    }
    for code in ["DE", "FR", "GLO", "CH"] {
        entities.push(DataSet::Location(location_of(code, None)));
    }

    Snapshot {
        unit_groups: vec![mass_units, energy_units, item_units],
        flow_properties: vec![mass, energy, items],
        categories,
        flows,
        providers,
        entities,
        mappings: Vec::new(),
    }
}

/// An in-memory catalog seeded with [`sample_snapshot`].
pub fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_snapshot("sample", sample_snapshot())
}
