//! In-process catalog for tests and for the local snapshot provider

use dashmap::{DashMap, DashSet};
use flowmap_core::{
    Category, DataSet, Flow, FlowMap, FlowProperty, ModelType, Ref, UnitGroup,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::catalog::{CatalogStream, DataCatalog, EntityStore, MappingService};
use crate::error::{CatalogError, Result};

/// Catalog operations, used for call counting and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SearchFlows,
    ProvidersFor,
    UnitGroups,
    FlowProperties,
    Categories,
    Descriptors,
    CreateFlow,
    CreateEntity,
    GetMapping,
    PutMapping,
    MappingNames,
}

/// A process that provides (or treats) a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLink {
    pub flow_id: String,
    pub process: Ref,
}

/// The complete content of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub unit_groups: Vec<UnitGroup>,
    #[serde(default)]
    pub flow_properties: Vec<FlowProperty>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub flows: Vec<Flow>,
    #[serde(default)]
    pub providers: Vec<ProviderLink>,
    #[serde(default)]
    pub entities: Vec<DataSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<FlowMap>,
}

impl Snapshot {
    /// Name of the reference unit of a flow's reference quantity.
    pub fn ref_unit_of(&self, flow: &Flow) -> Option<String> {
        let property_id = &flow.reference_property()?.id;
        let group_id = self
            .flow_properties
            .iter()
            .find(|p| &p.id == property_id)?
            .unit_group_id()?;
        let group = self.unit_groups.iter().find(|g| g.id == group_id)?;
        group.reference_unit().map(|u| u.name.clone())
    }

    pub fn flow_ref(&self, flow: &Flow) -> Ref {
        flow.to_ref(self.ref_unit_of(flow).as_deref())
    }

    fn upsert_flow(&mut self, flow: Flow) {
        match self.flows.iter_mut().find(|f| f.id == flow.id) {
            Some(existing) => *existing = flow,
            None => self.flows.push(flow),
        }
    }

    fn upsert_entity(&mut self, record: DataSet) {
        let id = record.to_ref().id;
        match self.entities.iter_mut().find(|e| e.to_ref().id == id) {
            Some(existing) => *existing = record,
            None => self.entities.push(record),
        }
    }
}

/// A catalog held entirely in memory.
///
/// Counts every call per operation and can be told to fail the next call of
/// an operation with a transport error; streaming operations then fail after
/// their first item.
pub struct InMemoryCatalog {
    name: String,
    state: RwLock<Snapshot>,
    mappings: DashMap<String, FlowMap>,
    calls: DashMap<Operation, usize>,
    failures: DashSet<Operation>,
}

impl InMemoryCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_snapshot(name, Snapshot::default())
    }

    pub fn from_snapshot(name: impl Into<String>, mut snapshot: Snapshot) -> Self {
        let mappings = DashMap::new();
        for map in snapshot.mappings.drain(..) {
            mappings.insert(map.name.to_lowercase(), map);
        }
        Self {
            name: name.into(),
            state: RwLock::new(snapshot),
            mappings,
            calls: DashMap::new(),
            failures: DashSet::new(),
        }
    }

    /// Copy of the current content, stored maps included.
    pub async fn snapshot(&self) -> Snapshot {
        let mut snapshot = self.state.read().await.clone();
        let mut maps: Vec<FlowMap> = self.mappings.iter().map(|m| m.value().clone()).collect();
        maps.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot.mappings = maps;
        snapshot
    }

    /// How many times an operation was called.
    pub fn calls(&self, op: Operation) -> usize {
        self.calls.get(&op).map(|c| *c.value()).unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.calls.clear();
    }

    /// Make the next call of `op` fail with a transport error.
    pub fn fail_next(&self, op: Operation) {
        self.failures.insert(op);
    }

    /// Count the call; true if it should fail.
    fn enter(&self, op: Operation) -> bool {
        *self.calls.entry(op).or_insert(0) += 1;
        self.failures.remove(&op).is_some()
    }

    fn unary(&self, op: Operation) -> Result<()> {
        if self.enter(op) {
            return Err(CatalogError::Transport(format!("injected failure in {:?}", op)));
        }
        Ok(())
    }

    fn stream_of<T: Send + 'static>(&self, op: Operation, items: Vec<T>) -> CatalogStream<T> {
        if self.enter(op) {
            let error = CatalogError::Transport(format!("stream {:?} interrupted", op));
            let head: Vec<Result<T>> = items.into_iter().take(1).map(Ok).collect();
            return stream::iter(head).chain(stream::once(async move { Err(error) })).boxed();
        }
        stream::iter(items.into_iter().map(Ok)).boxed()
    }
}

#[async_trait::async_trait]
impl DataCatalog for InMemoryCatalog {
    async fn search_flows(&self, query: &str) -> Result<CatalogStream<Ref>> {
        let matcher = SkimMatcherV2::default().ignore_case();
        let words: Vec<&str> = query.split_whitespace().collect();
        let state = self.state.read().await;
        let hits: Vec<Ref> = state
            .flows
            .iter()
            .filter(|f| words.iter().any(|w| matcher.fuzzy_match(&f.name, w).is_some()))
            .map(|f| state.flow_ref(f))
            .collect();
        debug!("Search '{}' in {}: {} flows", query, self.name, hits.len());
        Ok(self.stream_of(Operation::SearchFlows, hits))
    }

    async fn providers_for(&self, flow: &Ref) -> Result<CatalogStream<Ref>> {
        let state = self.state.read().await;
        let providers: Vec<Ref> = state
            .providers
            .iter()
            .filter(|link| link.flow_id == flow.id)
            .map(|link| link.process.clone())
            .collect();
        Ok(self.stream_of(Operation::ProvidersFor, providers))
    }

    async fn unit_groups(&self) -> Result<CatalogStream<UnitGroup>> {
        let groups = self.state.read().await.unit_groups.clone();
        Ok(self.stream_of(Operation::UnitGroups, groups))
    }

    async fn flow_properties(&self) -> Result<CatalogStream<FlowProperty>> {
        let properties = self.state.read().await.flow_properties.clone();
        Ok(self.stream_of(Operation::FlowProperties, properties))
    }

    async fn categories(&self) -> Result<CatalogStream<Category>> {
        let categories = self.state.read().await.categories.clone();
        Ok(self.stream_of(Operation::Categories, categories))
    }

    async fn descriptors(&self, model_type: ModelType) -> Result<CatalogStream<Ref>> {
        let state = self.state.read().await;
        let mut refs: Vec<Ref> = match model_type {
            ModelType::Flow => state.flows.iter().map(|f| state.flow_ref(f)).collect(),
            ModelType::UnitGroup => state
                .unit_groups
                .iter()
                .map(|g| Ref::new(&g.id, &g.name))
                .collect(),
            ModelType::FlowProperty => state
                .flow_properties
                .iter()
                .map(|p| Ref::new(&p.id, &p.name))
                .collect(),
            _ => state
                .entities
                .iter()
                .filter(|e| e.model_type() == model_type)
                .map(DataSet::to_ref)
                .collect(),
        };
        if model_type == ModelType::Process {
            for link in &state.providers {
                if !refs.iter().any(|r| r.id == link.process.id) {
                    refs.push(link.process.clone());
                }
            }
        }
        for r in refs.iter_mut() {
            r.model_type = Some(model_type);
        }
        Ok(self.stream_of(Operation::Descriptors, refs))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait::async_trait]
impl EntityStore for InMemoryCatalog {
    async fn create_flow(&self, flow: Flow) -> Result<Ref> {
        self.unary(Operation::CreateFlow)?;
        if flow.id.is_empty() {
            return Err(CatalogError::Invalid(format!("flow '{}' has no id", flow.name)));
        }
        let mut state = self.state.write().await;
        let flow_ref = state.flow_ref(&flow);
        state.upsert_flow(flow);
        debug!("Stored flow {} in {}", flow_ref.id, self.name);
        Ok(flow_ref)
    }

    async fn create_entity(&self, record: DataSet) -> Result<Ref> {
        if let DataSet::Flow(flow) = record {
            return self.create_flow(flow).await;
        }
        self.unary(Operation::CreateEntity)?;
        let r = record.to_ref();
        if r.id.is_empty() {
            return Err(CatalogError::Invalid(format!("{} '{}' has no id", record.model_type(), r.name)));
        }
        let mut state = self.state.write().await;
        match record {
            DataSet::UnitGroup(group) => match state.unit_groups.iter_mut().find(|g| g.id == group.id) {
                Some(existing) => *existing = group,
                None => state.unit_groups.push(group),
            },
            DataSet::FlowProperty(prop) => match state.flow_properties.iter_mut().find(|p| p.id == prop.id) {
                Some(existing) => *existing = prop,
                None => state.flow_properties.push(prop),
            },
            other => state.upsert_entity(other),
        }
        Ok(r)
    }
}

#[async_trait::async_trait]
impl MappingService for InMemoryCatalog {
    async fn get_mapping(&self, name: &str) -> Result<Option<FlowMap>> {
        self.unary(Operation::GetMapping)?;
        Ok(self
            .mappings
            .get(&name.to_lowercase())
            .map(|m| m.value().clone()))
    }

    async fn put_mapping(&self, map: &FlowMap) -> Result<()> {
        self.unary(Operation::PutMapping)?;
        self.mappings.insert(map.name.to_lowercase(), map.clone());
        Ok(())
    }

    async fn mapping_names(&self) -> Result<Vec<String>> {
        self.unary(Operation::MappingNames)?;
        let mut names: Vec<String> = self.mappings.iter().map(|m| m.value().name.clone()).collect();
        names.sort();
        Ok(names)
    }
}
