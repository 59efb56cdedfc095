//! Flowmap resolver
//!
//! Maps loosely described flows (type, name, unit, category, location) to
//! canonical catalog flows, creating missing flows and recording every
//! resolution in a persisted flow map.

pub mod config;
pub mod error;
pub mod resolver;


pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use resolver::{new_flow_id, FlowResolver, ResolverStats};
