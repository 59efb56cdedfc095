//! Capability interfaces of the remote reference catalog

use flowmap_core::{
    Category, CategoryTree, DataSet, Flow, FlowMap, FlowProperty, ModelType, Ref, UnitGroup,
    UnitIndex,
};
use futures_util::stream::BoxStream;
use futures_util::TryStreamExt;
use tracing::debug;

use crate::error::Result;

/// A stream of catalog items. The first `Err` item ends the stream for the
/// consumer; no partial result built from it may be exposed.
pub type CatalogStream<T> = BoxStream<'static, Result<T>>;

/// Read access to the catalog.
#[async_trait::async_trait]
pub trait DataCatalog: Send + Sync {
    /// Flows whose name matches the query. Each ref carries at least name,
    /// flow type, reference unit, category path and location.
    async fn search_flows(&self, query: &str) -> Result<CatalogStream<Ref>>;

    /// Processes that produce the given product flow or treat the given
    /// waste flow.
    async fn providers_for(&self, flow: &Ref) -> Result<CatalogStream<Ref>>;

    /// All unit groups.
    async fn unit_groups(&self) -> Result<CatalogStream<UnitGroup>>;

    /// All flow properties.
    async fn flow_properties(&self) -> Result<CatalogStream<FlowProperty>>;

    /// All categories, flat, with parent ids.
    async fn categories(&self) -> Result<CatalogStream<Category>>;

    /// Descriptors of all records of a model type.
    async fn descriptors(&self, model_type: ModelType) -> Result<CatalogStream<Ref>>;

    /// Get catalog name
    fn name(&self) -> &str;
}

/// Idempotent-by-id upserts of new records.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    async fn create_flow(&self, flow: Flow) -> Result<Ref>;

    async fn create_entity(&self, record: DataSet) -> Result<Ref>;
}

/// Whole-document load and replace of named flow maps.
#[async_trait::async_trait]
pub trait MappingService: Send + Sync {
    /// The map with the given name (compared ignoring case), if it exists.
    async fn get_mapping(&self, name: &str) -> Result<Option<FlowMap>>;

    /// Replace the stored document with the given map.
    async fn put_mapping(&self, map: &FlowMap) -> Result<()>;

    /// Names of all stored maps.
    async fn mapping_names(&self) -> Result<Vec<String>>;
}

/// Everything the resolver needs from the outside world.
pub trait Catalog: DataCatalog + EntityStore + MappingService {}

impl<T: DataCatalog + EntityStore + MappingService + ?Sized> Catalog for T {}

/// Drain a stream completely; fails on the first error item.
pub async fn collect<T: Send + 'static>(stream: CatalogStream<T>) -> Result<Vec<T>> {
    stream.try_collect().await
}

/// Drain the unit group and flow property catalogs and build the unit index.
pub async fn load_unit_index(catalog: &(impl DataCatalog + ?Sized)) -> Result<UnitIndex> {
    let groups = collect(catalog.unit_groups().await?).await?;
    let properties = collect(catalog.flow_properties().await?).await?;
    debug!(
        "Loaded {} unit groups and {} flow properties from {}",
        groups.len(),
        properties.len(),
        catalog.name()
    );
    Ok(UnitIndex::build(groups, properties))
}

/// Drain the category catalog and build the category tree.
pub async fn load_category_tree(catalog: &(impl DataCatalog + ?Sized)) -> Result<CategoryTree> {
    let categories = collect(catalog.categories().await?).await?;
    debug!("Loaded {} categories from {}", categories.len(), catalog.name());
    Ok(CategoryTree::build(categories))
}
