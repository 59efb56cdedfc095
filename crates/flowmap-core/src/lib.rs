//! Flowmap Core: flow queries, unit index, category tree and mapping model

pub mod categories;
pub mod entity;
pub mod error;
pub mod mapping;
pub mod matching;
pub mod model;
pub mod query;
pub mod units;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use categories::{CategoryNode, CategoryTree};
pub use entity::Entity;
pub use error::ParseError;
pub use mapping::{FlowMap, FlowMapRef, MappingEntry};
pub use matching::MatchScore;
pub use model::{
    Category, DataSet, Flow, FlowProperty, FlowPropertyFactor, FlowType, Location, ModelType,
    Process, Ref, Unit, UnitGroup,
};
pub use query::FlowQuery;
pub use units::{UnitEntry, UnitIndex};

/// Namespaces for deterministic UUIDs (v5)
pub mod namespaces {
    use uuid::Uuid;
    /// Namespace for flows synthesized by the resolver
    pub const NEW_FLOW: Uuid = Uuid::from_u128(0x6f3c1a52_8d0e_4b7a_9c21_5e4f0a7b1d02);
    /// Namespace for flow map ids derived from the map name
    pub const FLOW_MAP: Uuid = Uuid::from_u128(0x6f3c1a52_8d0e_4b7a_9c21_5e4f0a7b1d03);
    /// Namespace for records built by the entity factory
    pub const ENTITY: Uuid = Uuid::from_u128(0x6f3c1a52_8d0e_4b7a_9c21_5e4f0a7b1d04);
}
