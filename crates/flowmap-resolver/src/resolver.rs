//! Flow resolution: cache lookup, unit validation, search, creation,
//! provider selection and persistence of the flow map

use std::sync::Arc;

use flowmap_catalog::{load_unit_index, Catalog, DataCatalog, EntityStore, MappingService};
use flowmap_core::entity::{flow_of, location_of};
use flowmap_core::matching::location_matches;
use flowmap_core::{
    namespaces, DataSet, Entity, FlowMap, FlowMapRef, FlowQuery, MappingEntry, MatchScore,
    ModelType, Ref, UnitEntry, UnitIndex,
};
use futures_util::TryStreamExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};

/// Counters of what the resolver did so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub cache_hits: usize,
    pub searches: usize,
    pub matched: usize,
    pub created_flows: usize,
    pub failures: usize,
}

/// Id of a flow synthesized for a query that had no catalog match. The same
/// flow type, name and quantity always give the same id.
pub fn new_flow_id(query: &FlowQuery, unit: &UnitEntry) -> String {
    let key = format!(
        "{}/{}/{}/{}",
        query.flow_type(),
        query.name(),
        unit.unit_group.id,
        unit.flow_property.id
    );
    Uuid::new_v5(&namespaces::NEW_FLOW, key.as_bytes()).to_string()
}

/// Resolves flow queries against a catalog and records every resolution in
/// a flow map.
///
/// The flow map is owned by the resolver; resolutions take `&mut self` so
/// they are serialized by construction.
pub struct FlowResolver {
    catalog: Arc<dyn Catalog>,
    config: ResolverConfig,
    units: UnitIndex,
    flow_map: FlowMap,
    stats: ResolverStats,
}

impl FlowResolver {
    /// Build the unit index and load (or start) the configured flow map.
    pub async fn open(catalog: Arc<dyn Catalog>, config: ResolverConfig) -> Result<Self> {
        let units = load_unit_index(catalog.as_ref()).await?;
        let flow_map = match catalog.get_mapping(&config.mapping_name).await? {
            Some(map) => {
                let malformed = map.malformed_count();
                if malformed > 0 {
                    warn!(
                        "Flow map '{}' has {} malformed entries; they are ignored",
                        map.name, malformed
                    );
                }
                info!("Loaded flow map '{}' with {} entries", map.name, map.len());
                map
            }
            None => {
                info!("Flow map '{}' does not exist; starting a new one", config.mapping_name);
                FlowMap::new(config.mapping_name.as_str())
            }
        };
        Ok(Self {
            catalog,
            config,
            units,
            flow_map,
            stats: ResolverStats::default(),
        })
    }

    pub fn flow_map(&self) -> &FlowMap {
        &self.flow_map
    }

    pub fn units(&self) -> &UnitIndex {
        &self.units
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Map a query to a catalog flow.
    ///
    /// A query resolved before is answered from the flow map without any
    /// catalog call. Otherwise the result is appended to the flow map and the
    /// whole map is written back; on any failure the map is left unchanged.
    pub async fn resolve(&mut self, query: &FlowQuery) -> Result<MappingEntry> {
        if let Some(entry) = query.find_entry_in(&self.flow_map) {
            self.stats.cache_hits += 1;
            info!("Found mapping for {}", query);
            return Ok(entry.clone());
        }

        let result = self.resolve_new(query).await;
        if result.is_err() {
            self.stats.failures += 1;
        }
        result
    }

    async fn resolve_new(&mut self, query: &FlowQuery) -> Result<MappingEntry> {
        let Some(unit) = self.units.entry_of(query.unit()).cloned() else {
            error!("Unknown unit '{}' in {}", query.unit(), query);
            return Err(ResolveError::UnknownUnit(query.unit().to_string()));
        };

        let (target, target_unit, factor) = match self.search(query).await? {
            Some(candidate) => {
                let ref_unit = candidate.ref_unit.clone().unwrap_or_default();
                let factor = self
                    .units
                    .conversion_factor(query.unit(), &ref_unit)
                    .unwrap_or(1.0);
                info!("Found matching flow {} for {}", candidate.id, query);
                self.stats.matched += 1;
                (candidate, ref_unit, factor)
            }
            None if self.config.create_missing && !query.name().is_empty() => {
                let created = self.create_flow(query, &unit).await?;
                (created, unit.reference_unit.clone(), unit.conversion_factor)
            }
            None => {
                info!("Found no matching flow for {}", query);
                return Err(ResolveError::NoCandidate(query.to_string()));
            }
        };

        let provider = if self.config.resolve_providers && query.flow_type().has_providers() {
            self.find_provider(query, &target).await?
        } else {
            None
        };

        let flow_property = self
            .units
            .property_of(&target_unit)
            .cloned()
            .unwrap_or_else(|| unit.flow_property.clone());
        let to = FlowMapRef {
            flow: Some(target),
            flow_property: Some(flow_property),
            unit: Some(Ref::new(target_unit.as_str(), target_unit.as_str())),
            provider,
        };
        let entry = MappingEntry::new(query.to_mapping_ref(), to, factor);
        self.persist(entry.clone()).await?;
        Ok(entry)
    }

    /// Best convertible candidate of the query's flow type, if any.
    async fn search(&mut self, query: &FlowQuery) -> Result<Option<Ref>> {
        if query.name().is_empty() {
            return Ok(None);
        }
        self.stats.searches += 1;
        let mut candidates = self.catalog.search_flows(query.name()).await?;
        let mut best: Option<(Ref, MatchScore)> = None;
        while let Some(candidate) = candidates.try_next().await? {
            if candidate.flow_type != Some(query.flow_type()) {
                continue;
            }
            let Some(ref_unit) = candidate.ref_unit.as_deref() else {
                debug!("Skip {} ({}): no reference unit", candidate.name, candidate.id);
                continue;
            };
            if !self.units.are_convertible(query.unit(), ref_unit) {
                debug!(
                    "Skip {} ({}): '{}' is not convertible to '{}'",
                    candidate.name,
                    candidate.id,
                    query.unit(),
                    ref_unit
                );
                continue;
            }
            let score = MatchScore::of(query, &candidate);
            if score.name < self.config.min_name_score {
                continue;
            }
            debug!("Candidate {} ({}): {:?}", candidate.name, candidate.id, score);
            let replace = best
                .as_ref()
                .is_none_or(|(_, current)| score.is_better_than(current));
            if replace {
                best = Some((candidate, score));
            }
        }
        Ok(best.map(|(candidate, _)| candidate))
    }

    /// Store a new flow for the query in the catalog.
    async fn create_flow(&mut self, query: &FlowQuery, unit: &UnitEntry) -> Result<Ref> {
        let id = new_flow_id(query, unit);
        let mut flow = flow_of(query.name(), query.flow_type(), Some(&unit.flow_property)).with_id(id);
        flow.category_path = query.category_path();

        let mut created = self
            .catalog
            .create_flow(flow)
            .await
            .map_err(|source| ResolveError::CreateFailed {
                name: query.name().to_string(),
                source,
            })?;
        if created.ref_unit.is_none() {
            created.ref_unit = Some(unit.reference_unit.clone());
        }
        self.stats.created_flows += 1;
        info!("Created new flow {} for {}", created.id, query);
        Ok(created)
    }

    /// A provider at the query's location, else the first one listed.
    async fn find_provider(&self, query: &FlowQuery, flow: &Ref) -> Result<Option<Ref>> {
        let mut providers = self.catalog.providers_for(flow).await?;
        let mut first = None;
        while let Some(provider) = providers.try_next().await? {
            if location_matches(query.location(), provider.location.as_deref()) {
                debug!("Provider {} matches location {}", provider.name, query.location());
                return Ok(Some(provider));
            }
            if first.is_none() {
                first = Some(provider);
            }
        }
        if first.is_none() {
            debug!("No provider for {}", flow.name);
        }
        Ok(first)
    }

    async fn persist(&mut self, entry: MappingEntry) -> Result<()> {
        self.flow_map.push(entry);
        if let Err(e) = self.catalog.put_mapping(&self.flow_map).await {
            self.flow_map.mappings.pop();
            return Err(e.into());
        }
        debug!("Saved flow map '{}' ({} entries)", self.flow_map.name, self.flow_map.len());
        Ok(())
    }

    /// Resolve queries one after another. A failure is logged and does not
    /// stop the batch.
    pub async fn resolve_all(&mut self, queries: &[FlowQuery]) -> Vec<Result<MappingEntry>> {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            let result = self.resolve(query).await;
            if let Err(e) = &result {
                warn!("Could not resolve {}: {}", query, e);
            }
            results.push(result);
        }
        results
    }

    /// Find a location by name or code (ignoring case), creating it if the
    /// catalog has none.
    pub async fn resolve_location(&self, name: &str) -> Result<Ref> {
        let name = name.trim();
        let mut locations = self.catalog.descriptors(ModelType::Location).await?;
        while let Some(location) = locations.try_next().await? {
            let code_matches = location
                .location
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case(name));
            if location.name.eq_ignore_ascii_case(name) || code_matches {
                return Ok(location);
            }
        }
        let created = self
            .catalog
            .create_entity(DataSet::Location(location_of(name, None)))
            .await
            .map_err(|source| ResolveError::CreateFailed {
                name: name.to_string(),
                source,
            })?;
        info!("Created location {} ({})", created.name, created.id);
        Ok(created)
    }
}
