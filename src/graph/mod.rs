use std::collections::{HashMap, HashSet};

use serde::ser::{Serialize, SerializeMap, Serializer};

pub mod builder;
pub mod viz;

pub use builder::{build_graph, build_graph_from};

/// Package name to normalized dependency names, in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    order: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the edges of `name`. A name already present keeps its first entry.
    pub fn insert(&mut self, name: impl Into<String>, dependencies: Vec<String>) -> bool {
        let name = name.into();
        if self.edges.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.edges.insert(name, dependencies);
        true
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.get(name).unwrap_or_default()))
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, deps) in self.iter() {
            map.serialize_entry(name, deps)?;
        }
        map.end()
    }
}

/// Everything one traversal produces.
#[derive(Debug, Default, Clone)]
pub struct Resolution {
    pub graph: DependencyGraph,
    pub visited: HashSet<String>,
    pub cycles: Vec<Vec<String>>,
}

impl Resolution {
    pub fn visited_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.visited.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
