//! Catalog provider implementations

pub mod local;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::catalog::Catalog;

/// Factory function to create catalog providers
pub async fn create_catalog(kind: &str, root: Option<&Path>) -> Result<Arc<dyn Catalog>> {
    match kind {
        "memory" => Ok(Arc::new(memory::InMemoryCatalog::new("memory"))),
        "sample" => Ok(Arc::new(crate::fixtures::sample_catalog())),
        "local" => {
            let root = root.context("The local catalog needs a directory")?;
            let catalog = local::LocalCatalog::open(root)
                .await
                .with_context(|| format!("Failed to open catalog at {}", root.display()))?;
            Ok(Arc::new(catalog))
        }
        _ => anyhow::bail!("Unknown catalog provider: {}", kind),
    }
}
