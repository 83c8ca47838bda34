use std::collections::HashSet;

use serde::Serialize;

use crate::core::package::PackageRecord;
use crate::graph::{DependencyGraph, Resolution};

#[derive(Debug, Clone, Copy)]
struct Connectors {
    branch: &'static str,
    last: &'static str,
    pipe: &'static str,
    blank: &'static str,
}

const ASCII: Connectors = Connectors {
    branch: "|-- ",
    last: "`-- ",
    pipe: "|   ",
    blank: "    ",
};

const UNICODE: Connectors = Connectors {
    branch: "├── ",
    last: "└── ",
    pipe: "│   ",
    blank: "    ",
};

pub fn render_tree(root: &str, graph: &DependencyGraph, ascii: bool) -> String {
    let connectors = if ascii { ASCII } else { UNICODE };
    let mut out = String::new();
    out.push_str(root);
    out.push('\n');
    let mut walk = Walk::new(root);
    render_tree_children(root, graph, connectors, "", &mut walk, &mut out);
    out
}

pub fn render_flat(root: &str, graph: &DependencyGraph) -> String {
    let mut out = String::new();
    out.push_str(root);
    out.push('\n');
    let mut walk = Walk::new(root);
    render_flat_children(root, graph, 1, &mut walk, &mut out);
    out
}

pub fn render_dot(graph: &DependencyGraph) -> String {
    let mut out = String::from("digraph apkgraph {\n");
    for name in graph.names() {
        out.push_str(&format!("  \"{}\";\n", escape_dot_label(name)));
    }
    for (from, deps) in graph.iter() {
        for dep in deps {
            out.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape_dot_label(from),
                escape_dot_label(dep)
            ));
        }
    }
    out.push_str("}\n");
    out
}

pub fn render_cycles(cycles: &[Vec<String>]) -> String {
    let mut out = String::new();
    for cycle in cycles {
        out.push_str("  ");
        out.push_str(&cycle.join(" -> "));
        out.push('\n');
    }
    out
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    root: &'a PackageRecord,
    graph: &'a DependencyGraph,
    visited: Vec<&'a str>,
    cycles: &'a [Vec<String>],
}

pub fn render_json(root: &PackageRecord, resolution: &Resolution) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        root,
        graph: &resolution.graph,
        visited: resolution.visited_sorted(),
        cycles: &resolution.cycles,
    })
}

/// Ancestors of the node being drawn, and every node whose subtree is already on screen.
struct Walk {
    path: Vec<String>,
    expanded: HashSet<String>,
}

impl Walk {
    fn new(root: &str) -> Self {
        Self {
            path: vec![root.to_string()],
            expanded: HashSet::from([root.to_string()]),
        }
    }

    /// Suffix for a child that is not drawn again, or `None` to descend into it.
    fn marker(&self, child: &str, graph: &DependencyGraph) -> Option<&'static str> {
        if self.path.iter().any(|name| name == child) {
            return Some(" (cycle)");
        }
        let has_children = graph.get(child).is_some_and(|deps| !deps.is_empty());
        if has_children && self.expanded.contains(child) {
            return Some(" (*)");
        }
        None
    }

    fn enter(&mut self, child: &str) {
        self.path.push(child.to_string());
        self.expanded.insert(child.to_string());
    }

    fn leave(&mut self) {
        self.path.pop();
    }
}

fn render_tree_children(
    node: &str,
    graph: &DependencyGraph,
    connectors: Connectors,
    prefix: &str,
    walk: &mut Walk,
    out: &mut String,
) {
    let children = graph.get(node).unwrap_or_default();
    for (idx, child) in children.iter().enumerate() {
        let is_last = idx + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if is_last {
            connectors.last
        } else {
            connectors.branch
        });
        out.push_str(child);
        if let Some(marker) = walk.marker(child, graph) {
            out.push_str(marker);
            out.push('\n');
            continue;
        }
        out.push('\n');
        walk.enter(child);
        let mut next_prefix = prefix.to_string();
        next_prefix.push_str(if is_last {
            connectors.blank
        } else {
            connectors.pipe
        });
        render_tree_children(child, graph, connectors, &next_prefix, walk, out);
        walk.leave();
    }
}

fn render_flat_children(
    node: &str,
    graph: &DependencyGraph,
    depth: usize,
    walk: &mut Walk,
    out: &mut String,
) {
    for child in graph.get(node).unwrap_or_default() {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(child);
        if let Some(marker) = walk.marker(child, graph) {
            out.push_str(marker);
            out.push('\n');
            continue;
        }
        out.push('\n');
        walk.enter(child);
        render_flat_children(child, graph, depth + 1, walk, out);
        walk.leave();
    }
}

fn escape_dot_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
