use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::backend::PackageSource;
use crate::core::package::PackageRecord;
use crate::error::Result;
use crate::graph::{DependencyGraph, Resolution};

/// Pending `(name, ancestors)` entry; ancestors run from the root to the parent.
type FrontierEntry = (String, Vec<String>);

/// Walks the `depends` relation breadth-first from `root`.
///
/// Every package is looked up once, without a version constraint. Unknown
/// packages become nodes without edges. An entry whose name already appears
/// among its own ancestors is recorded as a cycle and not expanded; repeated
/// entries for finished names are dropped when dequeued.
pub fn build_graph(source: &mut dyn PackageSource, root: &str) -> Result<Resolution> {
    walk(source, root, None)
}

/// Like [`build_graph`], but the root's edges come from an already resolved
/// record, so a version-constrained root is walked from the version that was
/// selected. Every other package is still looked up without a constraint.
pub fn build_graph_from(
    source: &mut dyn PackageSource,
    root: &PackageRecord,
) -> Result<Resolution> {
    walk(source, &root.name, Some(root))
}

fn walk(
    source: &mut dyn PackageSource,
    root: &str,
    mut seed: Option<&PackageRecord>,
) -> Result<Resolution> {
    let mut graph = DependencyGraph::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut frontier: VecDeque<FrontierEntry> = VecDeque::new();
    frontier.push_back((root.to_string(), Vec::new()));

    while let Some((name, path)) = frontier.pop_front() {
        if path.contains(&name) {
            let mut cycle = path;
            cycle.push(name);
            // Parallel edges re-enter along the same ancestor path.
            if !cycles.contains(&cycle) {
                warn!(cycle = %cycle.join(" -> "), "dependency cycle detected");
                cycles.push(cycle);
            }
            continue;
        }
        if visited.contains(&name) {
            continue;
        }

        // The root is dequeued first, so the seed only ever applies to it.
        let dependencies = match seed.take() {
            Some(record) => Some(record.dependencies()),
            None => source.lookup(&name, None)?.map(|record| record.dependencies()),
        };
        let dependencies = match dependencies {
            Some(dependencies) => dependencies,
            None => {
                debug!(package = %name, "package not found, recording without edges");
                Vec::new()
            }
        };
        debug!(
            package = %name,
            depth = path.len(),
            dependencies = dependencies.len(),
            "expanded package"
        );

        let mut child_path = path;
        child_path.push(name.clone());
        for dependency in &dependencies {
            frontier.push_back((dependency.clone(), child_path.clone()));
        }
        graph.insert(name.clone(), dependencies);
        visited.insert(name);
    }

    Ok(Resolution {
        graph,
        visited,
        cycles,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::backend::{FixtureBackend, PackageSource};
    use crate::core::package::PackageRecord;
    use crate::error::{ApkgraphError, Result};
    use crate::graph::{build_graph, build_graph_from};

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn graph_pairs(resolution: &crate::graph::Resolution) -> Vec<(String, Vec<String>)> {
        resolution
            .graph
            .iter()
            .map(|(name, deps)| (name.to_string(), deps.to_vec()))
            .collect()
    }

    #[test]
    fn builds_transitive_graph_in_breadth_first_order() {
        let mut backend = FixtureBackend::parse(b"A:B C\nB:D\nC:D E\nD:\nE:F\nF:\n");
        let resolution = build_graph(&mut backend, "A").expect("build graph");

        assert_eq!(
            graph_pairs(&resolution),
            vec![
                ("A".to_string(), names(&["B", "C"])),
                ("B".to_string(), names(&["D"])),
                ("C".to_string(), names(&["D", "E"])),
                ("D".to_string(), Vec::new()),
                ("E".to_string(), names(&["F"])),
                ("F".to_string(), Vec::new()),
            ]
        );
        let expected: HashSet<String> = names(&["A", "B", "C", "D", "E", "F"]).into_iter().collect();
        assert_eq!(resolution.visited, expected);
        assert!(resolution.cycles.is_empty());
    }

    #[test]
    fn two_node_cycle_terminates_and_is_reported() {
        let mut backend = FixtureBackend::parse(b"A:B\nB:A\n");
        let resolution = build_graph(&mut backend, "A").expect("build graph");

        assert_eq!(resolution.cycles, vec![names(&["A", "B", "A"])]);
        assert_eq!(resolution.graph.len(), 2);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut backend = FixtureBackend::parse(b"A:A B\nB:\n");
        let resolution = build_graph(&mut backend, "A").expect("build graph");
        assert_eq!(resolution.cycles, vec![names(&["A", "A"])]);
        assert_eq!(resolution.graph.get("A"), Some(&names(&["A", "B"])[..]));
    }

    #[test]
    fn siblings_pending_together_are_not_cycles() {
        // B and C are both queued while C also depends on B.
        let mut backend = FixtureBackend::parse(b"A:B C\nB:\nC:B\n");
        let resolution = build_graph(&mut backend, "A").expect("build graph");
        assert!(resolution.cycles.is_empty());
        assert_eq!(resolution.visited.len(), 3);
    }

    #[test]
    fn missing_packages_become_leaf_nodes() {
        let mut backend = FixtureBackend::parse(b"A:B>=2 ghost\nB:\n");
        let resolution = build_graph(&mut backend, "A").expect("build graph");
        assert_eq!(resolution.graph.get("ghost"), Some(&[][..]));
        assert!(resolution.visited.contains("ghost"));

        let mut empty = FixtureBackend::default();
        let resolution = build_graph(&mut empty, "nothing").expect("build graph");
        assert_eq!(graph_pairs(&resolution), vec![("nothing".to_string(), Vec::new())]);
    }

    struct CountingSource {
        inner: FixtureBackend,
        calls: Vec<String>,
    }

    impl PackageSource for CountingSource {
        fn kind(&self) -> &'static str {
            "counting"
        }

        fn lookup(&mut self, name: &str, version: Option<&str>) -> Result<Option<PackageRecord>> {
            assert!(version.is_none(), "traversal must not pass a version");
            self.calls.push(name.to_string());
            self.inner.lookup(name, version)
        }
    }

    #[test]
    fn diamond_looks_up_shared_dependency_once() {
        let mut source = CountingSource {
            inner: FixtureBackend::parse(b"A:B C\nB:D\nC:D\nD:\n"),
            calls: Vec::new(),
        };
        let resolution = build_graph(&mut source, "A").expect("build graph");

        assert_eq!(source.calls, names(&["A", "B", "C", "D"]));
        assert!(resolution.cycles.is_empty());
        assert_eq!(resolution.graph.get("B"), Some(&names(&["D"])[..]));
        assert_eq!(resolution.graph.get("C"), Some(&names(&["D"])[..]));
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut backend = FixtureBackend::parse(b"A:B B>=1\nB:\n");
        let resolution = build_graph(&mut backend, "A").expect("build graph");
        assert_eq!(resolution.graph.get("A"), Some(&names(&["B", "B"])[..]));
        assert_eq!(resolution.graph.len(), 2);
    }

    #[test]
    fn parallel_edges_into_a_cycle_report_it_once() {
        let mut backend = FixtureBackend::parse(b"A:B\nB:A A>=1\n");
        let resolution = build_graph(&mut backend, "A").expect("build graph");
        assert_eq!(resolution.cycles, vec![names(&["A", "B", "A"])]);
        assert_eq!(resolution.graph.get("B"), Some(&names(&["A", "A"])[..]));
    }

    #[test]
    fn resolved_root_record_seeds_the_walk() {
        // The backend's unconstrained pick for foo depends on old.
        let mut source = CountingSource {
            inner: FixtureBackend::parse(b"foo:old\nold:\nnew:\n"),
            calls: Vec::new(),
        };
        let root = PackageRecord::new("foo", Some("2.0".to_string()), "new>=1");
        let resolution = build_graph_from(&mut source, &root).expect("build graph");

        assert_eq!(
            graph_pairs(&resolution),
            vec![
                ("foo".to_string(), names(&["new"])),
                ("new".to_string(), Vec::new()),
            ]
        );
        assert!(!resolution.visited.contains("old"));
        assert_eq!(source.calls, names(&["new"]));
    }

    #[test]
    fn resolved_root_reentered_is_still_a_cycle() {
        let mut backend = FixtureBackend::parse(b"foo:old\nbar:foo\n");
        let root = PackageRecord::new("foo", Some("2.0".to_string()), "bar");
        let resolution = build_graph_from(&mut backend, &root).expect("build graph");
        assert_eq!(resolution.cycles, vec![names(&["foo", "bar", "foo"])]);
        assert_eq!(resolution.graph.get("foo"), Some(&names(&["bar"])[..]));
    }

    struct FailingSource;

    impl PackageSource for FailingSource {
        fn kind(&self) -> &'static str {
            "failing"
        }

        fn lookup(&mut self, _name: &str, _version: Option<&str>) -> Result<Option<PackageRecord>> {
            Err(ApkgraphError::Unavailable {
                root: "https://mirror.invalid".to_string(),
                attempts: Vec::new(),
            })
        }
    }

    #[test]
    fn unavailable_source_aborts_the_build() {
        let err = build_graph(&mut FailingSource, "A").expect_err("must fail");
        assert!(matches!(err, ApkgraphError::Unavailable { .. }));
    }
}
