//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use flowmap_catalog::fixtures::sample_snapshot;
use flowmap_catalog::{
    collect, create_catalog, load_category_tree, Catalog, DataCatalog, LocalCatalog, MappingService,
};
use flowmap_core::{FlowQuery, FlowType, ModelType};
use flowmap_resolver::{FlowResolver, ResolverConfig};

/// Environment variable naming the catalog directory
pub const CATALOG_ENV: &str = "FLOWMAP_CATALOG";

/// Config file, then environment, then the command line.
pub fn load_config(path: Option<&Path>, mapping: Option<String>) -> anyhow::Result<ResolverConfig> {
    let config = match path {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    let config = config.with_env_overrides();
    Ok(match mapping {
        Some(name) => config.with_mapping_name(name),
        None => config,
    })
}

pub fn build_query(
    flow_type: &str,
    name: &str,
    unit: &str,
    category: Option<&str>,
    location: Option<&str>,
) -> anyhow::Result<FlowQuery> {
    let flow_type: FlowType = flow_type.parse()?;
    Ok(FlowQuery::new(flow_type, name)
        .with_unit(unit)
        .with_category(category)
        .with_location(location))
}

async fn open(root: &Path) -> anyhow::Result<Arc<dyn Catalog>> {
    create_catalog("local", Some(root)).await
}

pub async fn init(root: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Writing sample catalog to {}", root.display());
    LocalCatalog::init(&root, &sample_snapshot())
        .await
        .with_context(|| format!("Failed to initialize {}", root.display()))?;
    Ok(())
}

pub async fn resolve(root: PathBuf, config: ResolverConfig, query: FlowQuery) -> anyhow::Result<()> {
    let catalog = open(&root).await?;
    let mut resolver = FlowResolver::open(catalog, config).await?;

    let entry = resolver
        .resolve(&query)
        .await
        .with_context(|| format!("Could not resolve {}", query))?;

    let stats = resolver.stats();
    if stats.cache_hits > 0 {
        tracing::info!("Answered from flow map '{}'", resolver.flow_map().name);
    }
    if let Some(flow) = entry.target_flow() {
        println!("{}", query);
        println!("  -> {} ({})", flow.name, flow.id);
        if !flow.category_path.is_empty() {
            println!("     category: {}", flow.category());
        }
    }
    let unit = entry
        .to
        .as_ref()
        .and_then(|t| t.unit.as_ref())
        .map(|u| u.name.as_str())
        .unwrap_or("?");
    println!("     1 {} = {} {}", query.unit(), entry.conversion_factor, unit);
    if let Some(provider) = entry.provider() {
        println!(
            "     provider: {} [{}]",
            provider.name,
            provider.location.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn units(root: PathBuf) -> anyhow::Result<()> {
    let catalog = open(&root).await?;
    let groups = collect(catalog.unit_groups().await?).await?;
    let properties = collect(catalog.flow_properties().await?).await?;

    for group in &groups {
        let property = group
            .default_flow_property_id()
            .and_then(|id| properties.iter().find(|p| p.id == id))
            .map(|p| p.name.as_str())
            .unwrap_or("-");
        println!("{} [{}]", group.name, property);
        for unit in &group.units {
            let marker = if unit.reference_unit { " (reference)" } else { "" };
            println!("  {:<10} {}{}", unit.name, unit.conversion_factor, marker);
            if !unit.synonyms.is_empty() {
                println!("  {:<10} synonyms: {}", "", unit.synonyms.join(", "));
            }
        }
    }
    Ok(())
}

pub async fn categories(root: PathBuf, model_type: &str) -> anyhow::Result<()> {
    let model_type: ModelType = model_type.parse()?;
    let catalog = open(&root).await?;
    let tree = load_category_tree(catalog.as_ref()).await?;

    let nodes = tree.walk(model_type);
    if nodes.is_empty() {
        println!("No {} categories", model_type);
    }
    for (depth, node) in nodes {
        println!("{}{}", "  ".repeat(depth), node.name);
    }
    Ok(())
}

pub async fn mapping(root: PathBuf, config: ResolverConfig) -> anyhow::Result<()> {
    let catalog = open(&root).await?;
    let Some(map) = catalog.get_mapping(&config.mapping_name).await? else {
        let names = catalog.mapping_names().await?;
        println!("Flow map '{}' does not exist", config.mapping_name);
        if !names.is_empty() {
            println!("Available: {}", names.join(", "));
        }
        return Ok(());
    };

    println!("{} ({} entries)", map.name, map.len());
    for entry in &map.mappings {
        let source = entry
            .from
            .as_ref()
            .and_then(FlowQuery::from_mapping_ref)
            .map(|q| q.to_string());
        match (source, entry.target_flow()) {
            (Some(source), Some(target)) => {
                println!("  {}", source);
                println!("    -> {} x {}", target.name, entry.conversion_factor);
            }
            _ => tracing::warn!("Skipping malformed entry in '{}'", map.name),
        }
    }
    Ok(())
}
