//! Dependency graph over the issue store.
//!
//! Edges point from an issue to the issues it depends on. All traversals use
//! an explicit stack so very deep dependency chains cannot overflow the call
//! stack. Dangling references (targets missing from the store) stay in the
//! edge lists but are never visited.

use crate::model::Issue;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Result of analysing a single issue's dependency closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyAnalysis {
    pub issue_id: String,
    pub has_circular: bool,
    /// Cycle witness, closed by repeating its first node (`[a, b, c, a]`).
    /// Empty when no cycle is reachable.
    pub cycle: Vec<String>,
    /// Longest chain of resolvable dependency edges starting at the issue.
    pub max_depth: usize,
    /// Direct dependency IDs, dangling ones included.
    pub dependencies: Vec<String>,
}

/// A dependency pointing at an issue that is not in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub issue_id: String,
    pub depends_on_id: String,
}

/// Dependencies-first ordering of the graph's nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopologicalOrder {
    /// Every node exactly once. Nodes that could not be ordered are appended
    /// last, in input order.
    pub order: Vec<String>,
    /// Nodes on a cycle or only reachable through one.
    pub cyclic: Vec<String>,
}

impl TopologicalOrder {
    /// Position of each node in `order`.
    #[must_use]
    pub fn ranks(&self) -> HashMap<&str, usize> {
        self.order
            .iter()
            .enumerate()
            .map(|(rank, id)| (id.as_str(), rank))
            .collect()
    }
}

/// Adjacency structure: issue ID -> direct dependency IDs.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<Vec<String>>,
    /// `edges` mapped to node indices, dangling targets dropped.
    resolved: Vec<Vec<usize>>,
}

struct Frame {
    node: usize,
    next: usize,
    best: usize,
}

impl DependencyGraph {
    /// Build the graph from issues; node order follows input order.
    #[must_use]
    pub fn build<'a, I>(issues: I) -> Self
    where
        I: IntoIterator<Item = &'a Issue>,
    {
        let mut graph = Self::default();
        for issue in issues {
            if graph.index.contains_key(&issue.id) {
                continue;
            }
            graph.index.insert(issue.id.clone(), graph.nodes.len());
            graph.nodes.push(issue.id.clone());
            graph.edges.push(issue.dependency_ids());
        }
        graph.resolved = graph
            .edges
            .iter()
            .map(|deps| {
                deps.iter()
                    .filter_map(|dep| graph.index.get(dep).copied())
                    .collect()
            })
            .collect();
        graph
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Direct dependencies of `id` (empty for unknown IDs).
    #[must_use]
    pub fn dependencies(&self, id: &str) -> &[String] {
        self.index
            .get(id)
            .map_or(&[], |&idx| self.edges[idx].as_slice())
    }

    /// Issues that depend directly on `id`, in input order.
    #[must_use]
    pub fn dependents(&self, id: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .zip(&self.edges)
            .filter(|(_, deps)| deps.iter().any(|dep| dep == id))
            .map(|(node, _)| node.as_str())
            .collect()
    }

    fn resolved(&self, node: usize) -> &[usize] {
        &self.resolved[node]
    }

    /// Analyse the dependency closure of one issue.
    ///
    /// Returns `None` if the issue is not in the graph.
    #[must_use]
    pub fn analyze(&self, id: &str) -> Option<DependencyAnalysis> {
        let root = *self.index.get(id)?;

        let mut depth: HashMap<usize, usize> = HashMap::new();
        let mut on_path: HashSet<usize> = HashSet::new();
        let mut path: Vec<usize> = Vec::new();
        let mut cycle: Vec<String> = Vec::new();

        let mut stack = vec![Frame {
            node: root,
            next: 0,
            best: 0,
        }];
        on_path.insert(root);
        path.push(root);

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let next = self.resolved(node).get(frame.next).copied();

            if let Some(dep) = next {
                frame.next += 1;

                if on_path.contains(&dep) {
                    // Keep the first witness; later back edges add nothing.
                    if cycle.is_empty() {
                        if let Some(start) = path.iter().position(|&n| n == dep) {
                            cycle = path[start..]
                                .iter()
                                .map(|&n| self.nodes[n].clone())
                                .collect();
                            cycle.push(self.nodes[dep].clone());
                        }
                    }
                } else if let Some(&known) = depth.get(&dep) {
                    frame.best = frame.best.max(known + 1);
                } else {
                    on_path.insert(dep);
                    path.push(dep);
                    stack.push(Frame {
                        node: dep,
                        next: 0,
                        best: 0,
                    });
                }
                continue;
            }

            // All dependencies of `node` processed
            let finished = frame.best;
            depth.insert(node, finished);
            on_path.remove(&node);
            path.pop();
            stack.pop();
            if let Some(parent) = stack.last_mut() {
                parent.best = parent.best.max(finished + 1);
            }
        }

        Some(DependencyAnalysis {
            issue_id: id.to_string(),
            has_circular: !cycle.is_empty(),
            cycle,
            max_depth: depth.get(&root).copied().unwrap_or(0),
            dependencies: self.edges[root].clone(),
        })
    }

    /// Detect all cycles in the graph.
    ///
    /// Each cycle is closed by repeating its first node. Traversal starts
    /// from nodes in input order, so output is deterministic.
    #[must_use]
    pub fn detect_all_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<usize> = HashSet::new();
        let mut rec_stack: HashSet<usize> = HashSet::new();
        let mut path: Vec<usize> = Vec::new();

        // Stack stores (node, neighbor_index)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..self.nodes.len() {
            if visited.contains(&start) {
                continue;
            }

            stack.push((start, 0));
            visited.insert(start);
            rec_stack.insert(start);
            path.push(start);

            while let Some((u, idx)) = stack.last_mut() {
                let u = *u;
                if let Some(&v) = self.resolved(u).get(*idx) {
                    *idx += 1;

                    if rec_stack.contains(&v) {
                        if let Some(start_pos) = path.iter().position(|&x| x == v) {
                            let mut cycle: Vec<String> = path[start_pos..]
                                .iter()
                                .map(|&n| self.nodes[n].clone())
                                .collect();
                            cycle.push(self.nodes[v].clone());
                            cycles.push(cycle);
                        }
                    } else if !visited.contains(&v) {
                        visited.insert(v);
                        rec_stack.insert(v);
                        path.push(v);
                        stack.push((v, 0));
                    }
                    continue;
                }

                rec_stack.remove(&u);
                path.pop();
                stack.pop();
            }
        }

        cycles
    }

    /// Dependencies whose target is not in the graph.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.nodes
            .iter()
            .zip(&self.edges)
            .flat_map(|(node, deps)| {
                deps.iter()
                    .filter(|dep| !self.index.contains_key(dep.as_str()))
                    .map(|dep| DanglingReference {
                        issue_id: node.clone(),
                        depends_on_id: dep.clone(),
                    })
            })
            .collect()
    }

    /// Order nodes so dependencies come before their dependents.
    ///
    /// Kahn's algorithm with ties broken by input order. Nodes that never
    /// become ready (cycles and whatever sits behind them) are appended in
    /// input order rather than dropped.
    #[must_use]
    pub fn topological_order(&self) -> TopologicalOrder {
        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for node in 0..n {
            for &dep in self.resolved(node) {
                in_degree[node] += 1;
                dependents[dep].push(node);
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut placed = vec![false; n];
        let mut order = Vec::with_capacity(n);

        while let Some(node) = ready.pop_first() {
            placed[node] = true;
            order.push(self.nodes[node].clone());
            for &dependent in &dependents[node] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        let cyclic: Vec<String> = (0..n)
            .filter(|&i| !placed[i])
            .map(|i| self.nodes[i].clone())
            .collect();
        order.extend(cyclic.iter().cloned());

        TopologicalOrder { order, cyclic }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dependency;

    fn issue(id: &str, deps: &[&str]) -> Issue {
        let mut issue = Issue::new(id, id.to_uppercase());
        issue.dependencies = deps.iter().map(|d| Dependency::blocks(*d)).collect();
        issue
    }

    #[test]
    fn test_direct_dependencies() {
        let issues = vec![issue("a", &["b", "c"]), issue("b", &[]), issue("c", &[])];
        let graph = DependencyGraph::build(&issues);
        assert_eq!(graph.dependencies("a"), ["b", "c"]);
        assert!(graph.dependencies("zzz").is_empty());
        assert_eq!(graph.dependents("b"), vec!["a"]);
    }

    #[test]
    fn test_cycle_detection_three_nodes() {
        let issues = vec![issue("a", &["b"]), issue("b", &["c"]), issue("c", &["a"])];
        let graph = DependencyGraph::build(&issues);

        let analysis = graph.analyze("a").unwrap();
        assert!(analysis.has_circular);
        assert_eq!(analysis.cycle, vec!["a", "b", "c", "a"]);
        assert_eq!(analysis.dependencies, vec!["b"]);

        let cycles = graph.detect_all_cycles();
        assert_eq!(cycles, vec![vec!["a", "b", "c", "a"]]);
    }

    #[test]
    fn test_no_false_positive_cycle() {
        // Diamond: a -> b, a -> c, b -> d, c -> d
        let issues = vec![
            issue("a", &["b", "c"]),
            issue("b", &["d"]),
            issue("c", &["d"]),
            issue("d", &[]),
        ];
        let graph = DependencyGraph::build(&issues);
        let analysis = graph.analyze("a").unwrap();
        assert!(!analysis.has_circular);
        assert!(analysis.cycle.is_empty());
        assert_eq!(analysis.max_depth, 2);
        assert!(graph.detect_all_cycles().is_empty());
    }

    #[test]
    fn test_max_depth_counts_longest_chain() {
        let issues = vec![
            issue("a", &["b", "e"]),
            issue("b", &["c"]),
            issue("c", &["d"]),
            issue("d", &[]),
            issue("e", &[]),
        ];
        let graph = DependencyGraph::build(&issues);
        assert_eq!(graph.analyze("a").unwrap().max_depth, 3);
        assert_eq!(graph.analyze("d").unwrap().max_depth, 0);
    }

    #[test]
    fn test_dangling_references_tolerated() {
        let issues = vec![issue("a", &["ghost", "b"]), issue("b", &[])];
        let graph = DependencyGraph::build(&issues);

        let analysis = graph.analyze("a").unwrap();
        assert_eq!(analysis.dependencies, vec!["ghost", "b"]);
        assert_eq!(analysis.max_depth, 1);
        assert!(!analysis.has_circular);

        assert_eq!(
            graph.dangling_references(),
            vec![DanglingReference {
                issue_id: "a".to_string(),
                depends_on_id: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_analyze_unknown_issue() {
        let graph = DependencyGraph::build(&[issue("a", &[])]);
        assert!(graph.analyze("b").is_none());
    }

    #[test]
    fn test_cycle_reached_from_outside() {
        let issues = vec![issue("x", &["a"]), issue("a", &["b"]), issue("b", &["a"])];
        let graph = DependencyGraph::build(&issues);
        let analysis = graph.analyze("x").unwrap();
        assert!(analysis.has_circular);
        assert_eq!(analysis.cycle, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let n = 50_000;
        let issues: Vec<Issue> = (0..n)
            .map(|i| {
                let id = format!("n{i}");
                if i + 1 < n {
                    let dep = format!("n{}", i + 1);
                    issue(&id, &[dep.as_str()])
                } else {
                    issue(&id, &[])
                }
            })
            .collect();
        let graph = DependencyGraph::build(&issues);
        assert_eq!(graph.analyze("n0").unwrap().max_depth, n - 1);
        assert!(graph.detect_all_cycles().is_empty());
        assert_eq!(graph.topological_order().order.first().unwrap(), &format!("n{}", n - 1));
    }

    #[test]
    fn test_wide_fan_out_with_forward_and_dangling_edges() {
        let n = 20_000;
        let leaf_ids: Vec<String> = (0..n).map(|i| format!("l{i}")).collect();
        let mut hub_deps: Vec<&str> = leaf_ids.iter().map(String::as_str).collect();
        hub_deps.push("ghost");

        let mut issues = vec![issue("hub", &hub_deps)];
        issues.push(issue("l0", &["hub"]));
        issues.extend(leaf_ids[1..].iter().map(|id| issue(id, &[])));
        let graph = DependencyGraph::build(&issues);

        let analysis = graph.analyze("hub").unwrap();
        assert_eq!(analysis.dependencies.len(), n + 1);
        assert_eq!(analysis.cycle, vec!["hub", "l0", "hub"]);
        assert_eq!(analysis.max_depth, 1);
        assert_eq!(graph.detect_all_cycles(), vec![vec!["hub", "l0", "hub"]]);
        assert_eq!(graph.dangling_references().len(), 1);

        let topo = graph.topological_order();
        assert_eq!(topo.order.len(), n + 1);
        assert_eq!(topo.cyclic, vec!["hub", "l0"]);
    }

    #[test]
    fn test_topological_order_dependencies_first() {
        let issues = vec![issue("c", &["b"]), issue("a", &[]), issue("b", &["a"])];
        let graph = DependencyGraph::build(&issues);
        let topo = graph.topological_order();
        assert_eq!(topo.order, vec!["a", "b", "c"]);
        assert!(topo.cyclic.is_empty());
    }

    #[test]
    fn test_topological_order_ties_keep_input_order() {
        let issues = vec![issue("z", &[]), issue("y", &[]), issue("x", &[])];
        let topo = DependencyGraph::build(&issues).topological_order();
        assert_eq!(topo.order, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_topological_order_keeps_cyclic_nodes() {
        let issues = vec![
            issue("a", &["b"]),
            issue("b", &["a"]),
            issue("c", &[]),
            issue("d", &["a"]),
        ];
        let topo = DependencyGraph::build(&issues).topological_order();
        assert_eq!(topo.order, vec!["c", "a", "b", "d"]);
        assert_eq!(topo.cyclic, vec!["a", "b", "d"]);
        assert_eq!(topo.ranks()["d"], 3);
    }
}
