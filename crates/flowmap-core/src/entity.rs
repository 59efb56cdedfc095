//! Common identity fields of catalog records and constructors for new ones

use uuid::Uuid;

use crate::model::{
    Flow, FlowProperty, FlowPropertyFactor, FlowType, Location, ModelType, Process, Ref, Unit,
    UnitGroup,
};
use crate::namespaces;

/// Version assigned to records created here.
pub const INITIAL_VERSION: &str = "00.00.000";

/// Setters for the identity fields every stored record carries.
pub trait Entity: Sized {
    fn model_type(&self) -> ModelType;
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn set_name(&mut self, name: String);
    fn set_version(&mut self, version: String);
    fn set_last_change(&mut self, last_change: String);

    fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id.into());
        self
    }

    fn to_ref(&self) -> Ref {
        let mut r = Ref::new(self.id(), self.name());
        r.model_type = Some(self.model_type());
        r
    }
}

macro_rules! impl_entity {
    ($ty:ty, $model_type:expr) => {
        impl Entity for $ty {
            fn model_type(&self) -> ModelType {
                $model_type
            }
            fn id(&self) -> &str {
                &self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn set_id(&mut self, id: String) {
                self.id = id;
            }
            fn set_name(&mut self, name: String) {
                self.name = name;
            }
            fn set_version(&mut self, version: String) {
                self.version = version;
            }
            fn set_last_change(&mut self, last_change: String) {
                self.last_change = last_change;
            }
        }
    };
}

impl_entity!(Flow, ModelType::Flow);
impl_entity!(UnitGroup, ModelType::UnitGroup);
impl_entity!(FlowProperty, ModelType::FlowProperty);
impl_entity!(Location, ModelType::Location);
impl_entity!(Process, ModelType::Process);

/// Name-based id for a new record of the given type.
pub fn entity_id(model_type: ModelType, name: &str) -> String {
    let key = format!("{}/{}", model_type, name);
    Uuid::new_v5(&namespaces::ENTITY, key.as_bytes()).to_string()
}

fn init<E: Entity>(mut entity: E, name: &str) -> E {
    entity.set_id(entity_id(entity.model_type(), name));
    entity.set_name(name.to_string());
    entity.set_version(INITIAL_VERSION.to_string());
    entity.set_last_change(
        chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
    );
    entity
}

pub fn unit_of(name: &str, conversion_factor: f64) -> Unit {
    Unit {
        id: Uuid::new_v5(&namespaces::ENTITY, format!("Unit/{}", name).as_bytes()).to_string(),
        name: name.to_string(),
        conversion_factor,
        reference_unit: false,
        synonyms: Vec::new(),
    }
}

/// A unit group; the given unit becomes its reference unit.
pub fn unit_group_of(name: &str, reference_unit: Option<Unit>) -> UnitGroup {
    let mut group = init(UnitGroup::default(), name);
    if let Some(mut unit) = reference_unit {
        unit.reference_unit = true;
        group.units.push(unit);
    }
    group
}

pub fn flow_property_of(name: &str, unit_group: Option<&UnitGroup>) -> FlowProperty {
    let mut property = init(FlowProperty::default(), name);
    property.unit_group = unit_group.map(Entity::to_ref);
    property
}

/// A flow whose reference quantity is the given flow property.
pub fn flow_of(name: &str, flow_type: FlowType, property: Option<&Ref>) -> Flow {
    let flow = Flow {
        id: String::new(),
        name: String::new(),
        version: String::new(),
        last_change: String::new(),
        flow_type,
        category_path: Vec::new(),
        location: None,
        flow_properties: property
            .map(|p| FlowPropertyFactor {
                flow_property: Ref::new(&p.id, &p.name),
                conversion_factor: 1.0,
                reference_flow_property: true,
            })
            .into_iter()
            .collect(),
    };
    init(flow, name)
}

/// A location; the code defaults to the name.
pub fn location_of(name: &str, code: Option<&str>) -> Location {
    let mut location = init(Location::default(), name);
    location.code = code.unwrap_or(name).to_string();
    location
}

pub fn process_of(name: &str, location: Option<&Location>) -> Process {
    let mut process = init(Process::default(), name);
    process.location = location.map(|l| {
        let mut r = l.to_ref();
        r.location = Some(l.code.clone());
        r
    });
    process
}
