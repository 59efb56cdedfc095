//! Catalog backed by a JSON snapshot directory
//!
//! Layout:
//! ```text
//! <root>/catalog.json          unit groups, properties, categories, flows, providers, entities
//! <root>/mappings/<name>.json  one document per flow map
//! ```

use std::path::{Path, PathBuf};

use flowmap_core::{Category, DataSet, Flow, FlowMap, FlowProperty, ModelType, Ref, UnitGroup};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{CatalogStream, DataCatalog, EntityStore, MappingService};
use crate::error::{CatalogError, Result};
use crate::providers::memory::{InMemoryCatalog, Snapshot};

/// Snapshot file inside the catalog directory
pub const SNAPSHOT_FILE: &str = "catalog.json";

/// Directory holding one JSON document per flow map
pub const MAPPINGS_DIR: &str = "mappings";

pub fn snapshot_path(root: &Path) -> PathBuf {
    root.join(SNAPSHOT_FILE)
}

/// File of a flow map. The name is folded to lowercase so lookups ignore
/// case; bytes other than ASCII letters, digits and `-` are written as `_xx`
/// hex escapes, so distinct names never share a file.
pub fn mapping_path(root: &Path, name: &str) -> PathBuf {
    let mut file = String::new();
    for byte in name.to_lowercase().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            file.push(char::from(byte));
        } else {
            file.push_str(&format!("_{:02x}", byte));
        }
    }
    root.join(MAPPINGS_DIR).join(format!("{}.json", file))
}

/// Write a document next to its target, then move it in place.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// A catalog read from and written to a local directory.
///
/// Reads are served from memory; every write reaches the disk before it
/// becomes visible.
pub struct LocalCatalog {
    root: PathBuf,
    inner: InMemoryCatalog,
}

impl LocalCatalog {
    /// Open an existing catalog directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let path = snapshot_path(&root);
        if !tokio::fs::try_exists(&path).await? {
            return Err(CatalogError::NotFound(path.display().to_string()));
        }
        let mut snapshot: Snapshot = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;

        let mappings_dir = root.join(MAPPINGS_DIR);
        if tokio::fs::try_exists(&mappings_dir).await? {
            let mut entries = tokio::fs::read_dir(&mappings_dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file = entry.path();
                if file.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let map: FlowMap = serde_json::from_str(&tokio::fs::read_to_string(&file).await?)?;
                snapshot.mappings.push(map);
            }
        }

        info!(
            "Opened catalog {}: {} flows, {} unit groups, {} maps",
            root.display(),
            snapshot.flows.len(),
            snapshot.unit_groups.len(),
            snapshot.mappings.len()
        );
        let inner = InMemoryCatalog::from_snapshot(root.display().to_string(), snapshot);
        Ok(Self { root, inner })
    }

    /// Create a catalog directory from a snapshot, replacing existing files.
    pub async fn init(root: impl Into<PathBuf>, snapshot: &Snapshot) -> Result<Self> {
        let root = root.into();
        let mut content = snapshot.clone();
        let mappings = std::mem::take(&mut content.mappings);
        write_json(&snapshot_path(&root), &content).await?;
        for map in &mappings {
            write_json(&mapping_path(&root, &map.name), map).await?;
        }
        Self::open(root).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The in-memory view; exposes call counters and fault injection.
    pub fn memory(&self) -> &InMemoryCatalog {
        &self.inner
    }

    async fn save_snapshot(&self) -> Result<()> {
        let mut content = self.inner.snapshot().await;
        content.mappings.clear();
        write_json(&snapshot_path(&self.root), &content).await
    }
}

#[async_trait::async_trait]
impl DataCatalog for LocalCatalog {
    async fn search_flows(&self, query: &str) -> Result<CatalogStream<Ref>> {
        self.inner.search_flows(query).await
    }

    async fn providers_for(&self, flow: &Ref) -> Result<CatalogStream<Ref>> {
        self.inner.providers_for(flow).await
    }

    async fn unit_groups(&self) -> Result<CatalogStream<UnitGroup>> {
        self.inner.unit_groups().await
    }

    async fn flow_properties(&self) -> Result<CatalogStream<FlowProperty>> {
        self.inner.flow_properties().await
    }

    async fn categories(&self) -> Result<CatalogStream<Category>> {
        self.inner.categories().await
    }

    async fn descriptors(&self, model_type: ModelType) -> Result<CatalogStream<Ref>> {
        self.inner.descriptors(model_type).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[async_trait::async_trait]
impl EntityStore for LocalCatalog {
    async fn create_flow(&self, flow: Flow) -> Result<Ref> {
        let flow_ref = self.inner.create_flow(flow).await?;
        self.save_snapshot().await?;
        Ok(flow_ref)
    }

    async fn create_entity(&self, record: DataSet) -> Result<Ref> {
        let r = self.inner.create_entity(record).await?;
        self.save_snapshot().await?;
        Ok(r)
    }
}

#[async_trait::async_trait]
impl MappingService for LocalCatalog {
    async fn get_mapping(&self, name: &str) -> Result<Option<FlowMap>> {
        self.inner.get_mapping(name).await
    }

    async fn put_mapping(&self, map: &FlowMap) -> Result<()> {
        write_json(&mapping_path(&self.root, &map.name), map).await?;
        self.inner.put_mapping(map).await?;
        info!("Saved flow map '{}' with {} entries", map.name, map.len());
        Ok(())
    }

    async fn mapping_names(&self) -> Result<Vec<String>> {
        self.inner.mapping_names().await
    }
}
