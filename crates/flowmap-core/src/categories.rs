//! Category tree built from flat category records

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{Category, ModelType};

/// A category with its ordered sub-categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub model_type: ModelType,
    /// Id of the parent category; `None` for roots.
    pub parent: Option<String>,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    fn find(&self, id: &str) -> Option<&CategoryNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn path_to(&self, id: &str, path: &mut Vec<String>) -> bool {
        path.push(self.name.clone());
        if self.id == id || self.children.iter().any(|c| c.path_to(id, path)) {
            return true;
        }
        path.pop();
        false
    }

    fn walk<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a CategoryNode)>) {
        out.push((depth, self));
        for child in &self.children {
            child.walk(depth + 1, out);
        }
    }
}

/// Multi-root category tree, one root list per model type. Read only after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    roots: HashMap<ModelType, Vec<CategoryNode>>,
}

impl CategoryTree {
    /// Build the tree from the complete list of category records.
    ///
    /// Records without a parent id become roots, as do records whose parent
    /// id is unknown. All node lists are sorted by name, ignoring case.
    pub fn build<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for category in categories {
            if !seen.insert(category.id.clone()) {
                warn!("Duplicate category id {} ({}); keeping the first", category.id, category.name);
                continue;
            }
            records.push(category);
        }

        let mut root_records = Vec::new();
        let mut children_of: HashMap<String, Vec<Category>> = HashMap::new();
        for category in records {
            match category.parent_id.as_deref().map(str::trim) {
                Some(parent) if !parent.is_empty() => {
                    if seen.contains(parent) {
                        children_of.entry(parent.to_string()).or_default().push(category);
                    } else {
                        warn!("Category {} has unknown parent {}; treating it as a root", category.name, parent);
                        root_records.push(category);
                    }
                }
                _ => root_records.push(category),
            }
        }

        let mut tree = CategoryTree::default();
        for record in root_records {
            let node = Self::build_node(record, &mut children_of);
            tree.roots.entry(node.model_type).or_default().push(node);
        }

        let unreachable: usize = children_of.values().map(Vec::len).sum();
        if unreachable > 0 {
            warn!("{} categories are part of a parent cycle and were left out of the tree", unreachable);
        }

        for nodes in tree.roots.values_mut() {
            sort_nodes(nodes);
        }
        debug!("Category tree built with roots for {} model types", tree.roots.len());
        tree
    }

    fn build_node(record: Category, children_of: &mut HashMap<String, Vec<Category>>) -> CategoryNode {
        let children = children_of
            .remove(&record.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| Self::build_node(child, children_of))
            .collect();
        CategoryNode {
            parent: record.parent_id.filter(|p| !p.trim().is_empty()),
            id: record.id,
            name: record.name,
            model_type: record.model_type,
            children,
        }
    }

    /// Sorted root categories of the given model type; empty if none exist.
    pub fn roots_of(&self, model_type: ModelType) -> &[CategoryNode] {
        self.roots.get(&model_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn model_types(&self) -> Vec<ModelType> {
        let mut types: Vec<ModelType> = self.roots.keys().copied().collect();
        types.sort();
        types
    }

    /// Find a node anywhere in the tree.
    pub fn find(&self, id: &str) -> Option<&CategoryNode> {
        self.roots
            .values()
            .flat_map(|nodes| nodes.iter())
            .find_map(|n| n.find(id))
    }

    /// Names from the root down to the given category.
    pub fn path_of(&self, id: &str) -> Option<Vec<String>> {
        for root in self.roots.values().flat_map(|nodes| nodes.iter()) {
            let mut path = Vec::new();
            if root.path_to(id, &mut path) {
                return Some(path);
            }
        }
        None
    }

    /// Depth-first pre-order walk over all categories of a model type.
    pub fn walk(&self, model_type: ModelType) -> Vec<(usize, &CategoryNode)> {
        let mut out = Vec::new();
        for root in self.roots_of(model_type) {
            root.walk(0, &mut out);
        }
        out
    }
}

fn sort_nodes(nodes: &mut [CategoryNode]) {
    for node in nodes.iter_mut() {
        sort_nodes(&mut node.children);
    }
    nodes.sort_by_cached_key(|n| n.name.to_lowercase());
}
