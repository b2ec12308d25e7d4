use crate::analysis::DependencyGraph;
use crate::config::Config;
use crate::model::{Layer, Module, SourceFile, Violation, ViolationKind};
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// One violation per strongly connected component of size > 1 in the graph
/// restricted to feature modules.
pub fn detect_circular_dependencies(
    graph: &DependencyGraph,
    modules: &[Module],
    files: &[SourceFile],
    config: &Config,
) -> Vec<Violation> {
    let severity = config.severity.of(ViolationKind::Cycle);

    let features: DiGraph<usize, ()> = graph.graph().filter_map(
        |_, &module| (modules[module].layer == Layer::Feature).then_some(module),
        |_, _| Some(()),
    );

    let mut components: Vec<Vec<usize>> = tarjan_scc(&features)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut members: Vec<usize> = scc.into_iter().map(|node| features[node]).collect();
            members.sort_unstable();
            members
        })
        .collect();
    components.sort();

    let mut violations = Vec::with_capacity(components.len());
    for members in components {
        let path = shortest_cycle(graph, &members);
        let edges = path
            .windows(2)
            .filter_map(|pair| graph.edge_between(pair[0], pair[1]))
            .map(|edge| edge.representative().clone())
            .collect();
        let ids: Vec<String> = members.iter().map(|&m| modules[m].id.clone()).collect();
        let path_ids: Vec<String> = path.iter().map(|&m| modules[m].id.clone()).collect();

        tracing::debug!(members = ?ids, "dependency cycle");
        violations.push(Violation::cycle(ids, &path_ids, edges, files, severity));
    }
    violations
}

/// Shortest cycle through the lowest-index member, staying inside the
/// component. Successors are visited in index order so the result is stable.
/// Returns the module sequence with the start repeated at the end.
fn shortest_cycle(graph: &DependencyGraph, members: &[usize]) -> Vec<usize> {
    let component: BTreeSet<usize> = members.iter().copied().collect();
    let start = members[0];
    let mut parent: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for next in graph.dependencies(node) {
            if !component.contains(&next) {
                continue;
            }
            if next == start {
                let mut tail = Vec::new();
                let mut current = node;
                while current != start {
                    tail.push(current);
                    current = parent[&current];
                }
                tail.reverse();

                let mut path = Vec::with_capacity(tail.len() + 2);
                path.push(start);
                path.extend(tail);
                path.push(start);
                return path;
            }
            if let Entry::Vacant(slot) = parent.entry(next) {
                slot.insert(node);
                queue.push_back(next);
            }
        }
    }

    // unreachable for a real component; fall back to the member list
    let mut path = members.to_vec();
    path.push(start);
    path
}

#[cfg(test)]
mod tests {
    use crate::analysis::tests::analyze_files;
    use crate::model::ViolationKind;

    fn cycles(files: &[(&str, &str)]) -> Vec<(Vec<String>, String, usize)> {
        analyze_files(files)
            .violations
            .into_iter()
            .filter(|v| v.kind == ViolationKind::Cycle)
            .map(|v| (v.cycle, v.message, v.edges.len()))
            .collect()
    }

    #[test]
    fn test_two_module_cycle() {
        let found = cycles(&[
            ("modules/a/index.ts", "import { b } from '../b';\nexport const a = 1;"),
            ("modules/b/index.ts", "import { a } from '../a';\nexport const b = 1;"),
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, vec!["modules/a", "modules/b"]);
        assert_eq!(found[0].2, 2);
        assert!(found[0].1.ends_with("modules/a → modules/b → modules/a"));
    }

    #[test]
    fn test_minimal_cycle_inside_larger_component() {
        // a -> b -> c -> a plus a shortcut a -> c
        let found = cycles(&[
            ("modules/a/index.ts", "import { b } from '../b';\nimport { c } from '../c';\nexport const a = 1;"),
            ("modules/b/index.ts", "import { c } from '../c';\nexport const b = 1;"),
            ("modules/c/index.ts", "import { a } from '../a';\nexport const c = 1;"),
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, vec!["modules/a", "modules/b", "modules/c"]);
        assert!(found[0].1.ends_with("modules/a → modules/c → modules/a"), "{}", found[0].1);
        assert_eq!(found[0].2, 2);
    }

    #[test]
    fn test_one_violation_per_component() {
        let found = cycles(&[
            ("modules/a/index.ts", "import { b } from '../b';\nexport const a = 1;"),
            ("modules/b/index.ts", "import { a } from '../a';\nexport const b = 1;"),
            ("modules/c/index.ts", "import { d } from '../d';\nexport const c = 1;"),
            ("modules/d/index.ts", "import { c } from '../c';\nimport { a } from '../a';\nexport const d = 1;"),
        ]);
        let members: Vec<_> = found.iter().map(|f| f.0.clone()).collect();
        assert_eq!(
            members,
            vec![
                vec!["modules/a".to_string(), "modules/b".to_string()],
                vec!["modules/c".to_string(), "modules/d".to_string()],
            ]
        );
    }

    #[test]
    fn test_acyclic_and_cross_layer_loops_are_not_cycles() {
        let found = cycles(&[
            ("modules/a/index.ts", "import { b } from '../b';\nimport { c } from '../../core/c';\nexport const a = 1;"),
            ("modules/b/index.ts", "export const b = 1;"),
            // core -> feature is a layer violation, never part of a feature cycle
            ("core/c.ts", "import { a } from '../modules/a';\nexport const c = 1;"),
        ]);
        assert!(found.is_empty());
    }
}
