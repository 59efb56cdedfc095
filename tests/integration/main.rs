//! Integration tests for Flowmap
//!
//! These tests drive the resolver end to end against the in-memory and the
//! local directory catalogs, and invoke the CLI binary.

use std::process::Command;
use std::sync::Arc;

use flowmap_catalog::fixtures::{self, sample_catalog, sample_snapshot};
use flowmap_catalog::{create_catalog, DataCatalog, LocalCatalog, MappingService, Operation};
use flowmap_core::{FlowQuery, MappingEntry};
use flowmap_resolver::{FlowResolver, ResolveError, ResolverConfig};
use tempfile::TempDir;

fn inventory() -> Vec<FlowQuery> {
    vec![
        FlowQuery::product("Electricity, high voltage").with_unit("kWh").with_location("DE"),
        FlowQuery::product("Steel, low-alloyed").with_unit("t"),
        FlowQuery::waste("Municipal solid waste").with_unit("kg").with_location("CH"),
        FlowQuery::elementary("Carbon dioxide").with_unit("t").with_category("emission/air/unspecified"),
        FlowQuery::elementary("Water vapour").with_unit("t").with_category("emission/air/unspecified"),
        FlowQuery::waste("Heat loss").with_unit("kWh"),
    ]
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new(env!("CARGO_BIN_EXE_flowmap"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Map described flows to canonical catalog flows"));
}

/// Test init, resolve and mapping through the binary
#[test]
fn test_cli_resolve_roundtrip() {
    let dir = TempDir::new().unwrap();
    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_flowmap"))
            .arg("--catalog")
            .arg(dir.path())
            .args(args)
            .env_remove("FLOWMAP_MAPPING")
            .output()
            .expect("Failed to execute command")
    };

    assert!(run(&["init"]).status.success());

    let output = run(&[
        "resolve", "--type", "elementary", "--name", "Carbon dioxide", "--unit", "g",
        "--category", "air/unspecified",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(fixtures::CO2_AIR_ID));
    assert!(stdout.contains("= 0.001 kg"));

    let output = run(&["mapping"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("flowmap-default (1 entries)"));

    let output = run(&["resolve", "--name", "Carbon dioxide", "--unit", "lb"]);
    assert!(!output.status.success());
}

/// Test that a whole inventory maps against one catalog
#[tokio::test]
async fn test_inventory_mapping() {
    let catalog = Arc::new(sample_catalog());
    let mut resolver = FlowResolver::open(catalog.clone(), ResolverConfig::default())
        .await
        .unwrap();

    let queries = inventory();
    let results = resolver.resolve_all(&queries).await;
    let entries: Vec<&MappingEntry> = results.iter().map(|r| r.as_ref().unwrap()).collect();

    assert_eq!(entries[0].provider().unwrap().location.as_deref(), Some("DE"));
    assert_eq!(entries[1].conversion_factor, 1000.0);
    assert_eq!(entries[2].provider().unwrap().location.as_deref(), Some("CH"));
    assert_eq!(entries[3].target_flow().unwrap().id, fixtures::CO2_AIR_ID);
    // Water vapour and heat loss are new
    assert_eq!(resolver.stats().created_flows, 2);
    assert!((entries[5].conversion_factor - 3.6).abs() < 1e-12);

    let stored = catalog.get_mapping("flowmap-default").await.unwrap().unwrap();
    assert_eq!(stored.len(), queries.len());
    assert_eq!(catalog.calls(Operation::PutMapping), queries.len());

    // Resolving the inventory again only reads the flow map
    let again = resolver.resolve_all(&queries).await;
    assert!(again.iter().all(Result::is_ok));
    assert_eq!(resolver.stats().cache_hits, queries.len());
    assert_eq!(catalog.calls(Operation::PutMapping), queries.len());
    assert_eq!(catalog.calls(Operation::CreateFlow), 2);
}

/// Test that a second session reuses the stored flow map
#[tokio::test]
async fn test_local_catalog_sessions() {
    let dir = TempDir::new().unwrap();
    LocalCatalog::init(dir.path(), &sample_snapshot()).await.unwrap();
    let query = FlowQuery::elementary("SARS-CoV-2 viruses")
        .with_unit("Item(s)")
        .with_category("air/urban");
    let config = ResolverConfig::default().with_mapping_name("Covid");

    let first = {
        let catalog = create_catalog("local", Some(dir.path())).await.unwrap();
        let mut resolver = FlowResolver::open(catalog, config.clone()).await.unwrap();
        let entry = resolver.resolve(&query).await.unwrap();
        assert_eq!(resolver.stats().created_flows, 1);
        entry
    };

    let catalog = LocalCatalog::open(dir.path()).await.unwrap();
    let created = first.target_flow().unwrap();
    let hits = flowmap_catalog::collect(catalog.search_flows("SARS-CoV-2").await.unwrap())
        .await
        .unwrap();
    assert!(hits.iter().any(|r| r.id == created.id));

    let catalog = Arc::new(catalog);
    let searches = catalog.memory().calls(Operation::SearchFlows);
    let mut resolver = FlowResolver::open(catalog.clone(), config).await.unwrap();
    let second = resolver.resolve(&query).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(resolver.stats().cache_hits, 1);
    assert_eq!(catalog.memory().calls(Operation::SearchFlows), searches);
}

/// Test that synthesized flows converge on the same id across catalogs
#[tokio::test]
async fn test_synthesized_ids_across_catalogs() {
    let query = FlowQuery::elementary("Carbon dioxide").with_unit("kWh");
    let dir = TempDir::new().unwrap();
    LocalCatalog::init(dir.path(), &sample_snapshot()).await.unwrap();

    let local = create_catalog("local", Some(dir.path())).await.unwrap();
    let memory = create_catalog("sample", None).await.unwrap();

    let mut ids = Vec::new();
    for catalog in [local, memory] {
        let mut resolver = FlowResolver::open(catalog, ResolverConfig::default()).await.unwrap();
        let entry = resolver.resolve(&query).await.unwrap();
        ids.push(entry.target_flow().unwrap().id.clone());
    }
    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[0], fixtures::CO2_AIR_ID);
}

/// Test that failures never leave entries behind
#[tokio::test]
async fn test_failures_leave_no_entries() {
    let catalog = Arc::new(sample_catalog());
    let mut resolver = FlowResolver::open(catalog.clone(), ResolverConfig::default())
        .await
        .unwrap();

    let unknown = FlowQuery::elementary("Carbon dioxide").with_unit("lb");
    assert!(matches!(
        resolver.resolve(&unknown).await,
        Err(ResolveError::UnknownUnit(_))
    ));

    catalog.fail_next(Operation::ProvidersFor);
    let product = FlowQuery::product("Steel, low-alloyed").with_unit("kg");
    let err = resolver.resolve(&product).await.unwrap_err();
    assert!(err.is_transport());

    assert!(resolver.flow_map().is_empty());
    assert!(catalog.get_mapping("flowmap-default").await.unwrap().is_none());
    assert_eq!(resolver.stats().failures, 2);
}
