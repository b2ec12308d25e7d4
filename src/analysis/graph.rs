use crate::model::{
    ExternalEdge, ExternalKind, ImportEdge, Module, ModuleEdge, SourceFile, Warning, WarningKind,
};
use crate::resolve::{Resolution, SpecifierResolver};
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::BTreeMap;

/// Module dependency graph. Node weights are module indices; every edge
/// carries the import statements that produced it.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<usize, ModuleEdge>,
    nodes: Vec<NodeIndex>,
    externals: Vec<ExternalEdge>,
}

impl DependencyGraph {
    /// Resolve every import of every assigned file and collapse the
    /// cross-module ones into one edge per module pair.
    pub fn build(
        files: &[SourceFile],
        modules: &[Module],
        file_module: &[Option<usize>],
        resolver: &SpecifierResolver<'_>,
    ) -> (Self, Vec<Warning>) {
        let mut pairs: BTreeMap<(usize, usize), Vec<ImportEdge>> = BTreeMap::new();
        let mut externals = Vec::new();
        let mut warnings = Vec::new();

        for (file_idx, file) in files.iter().enumerate() {
            let Some(from_module) = file_module[file_idx] else {
                continue;
            };

            for import in &file.imports {
                match resolver.resolve(&file.relative, &import.specifier) {
                    Resolution::File(target_file) => {
                        let Some(to_module) = file_module[target_file] else {
                            tracing::debug!(
                                from = %file.relative,
                                target = %files[target_file].relative,
                                "import lands outside every layer"
                            );
                            externals.push(ExternalEdge {
                                from_module,
                                file: file_idx,
                                specifier: import.specifier.clone(),
                                kind: ExternalKind::Unassigned,
                                line: import.line,
                                column: import.column,
                            });
                            continue;
                        };
                        if to_module == from_module {
                            continue;
                        }
                        pairs
                            .entry((from_module, to_module))
                            .or_default()
                            .push(ImportEdge {
                                from_module,
                                to_module,
                                symbols: import.symbols.clone(),
                                kind: import.kind,
                                file: file_idx,
                                target_file,
                                specifier: import.specifier.clone(),
                                line: import.line,
                                column: import.column,
                            });
                    }
                    Resolution::External(kind) => {
                        if kind == ExternalKind::Unresolved {
                            warnings.push(
                                Warning::new(
                                    WarningKind::Unresolved,
                                    &file.relative,
                                    format!("cannot resolve `{}`", import.specifier),
                                )
                                .at_line(import.line),
                            );
                        }
                        externals.push(ExternalEdge {
                            from_module,
                            file: file_idx,
                            specifier: import.specifier.clone(),
                            kind,
                            line: import.line,
                            column: import.column,
                        });
                    }
                }
            }
        }

        let mut graph = DiGraph::with_capacity(modules.len(), pairs.len());
        let nodes: Vec<NodeIndex> = (0..modules.len()).map(|idx| graph.add_node(idx)).collect();
        for ((from, to), imports) in pairs {
            graph.add_edge(nodes[from], nodes[to], ModuleEdge { from, to, imports });
        }

        tracing::info!(
            modules = modules.len(),
            edges = graph.edge_count(),
            externals = externals.len(),
            "dependency graph built"
        );

        (
            Self {
                graph,
                nodes,
                externals,
            },
            warnings,
        )
    }

    pub fn graph(&self) -> &DiGraph<usize, ModuleEdge> {
        &self.graph
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Module edges ordered by (from, to).
    pub fn edges(&self) -> impl Iterator<Item = &ModuleEdge> {
        self.graph.edge_weights()
    }

    /// Every cross-module import statement, ordered by module pair then source position.
    pub fn import_edges(&self) -> impl Iterator<Item = &ImportEdge> {
        self.edges().flat_map(|edge| edge.imports.iter())
    }

    pub fn edge_between(&self, from: usize, to: usize) -> Option<&ModuleEdge> {
        let edge: EdgeIndex = self.graph.find_edge(self.nodes[from], self.nodes[to])?;
        self.graph.edge_weight(edge)
    }

    pub fn externals(&self) -> &[ExternalEdge] {
        &self.externals
    }

    /// Modules `module` imports, sorted.
    pub fn dependencies(&self, module: usize) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .graph
            .edges_directed(self.nodes[module], Direction::Outgoing)
            .map(|e| e.weight().to)
            .collect();
        deps.sort_unstable();
        deps
    }

    pub fn fan_in(&self, module: usize) -> usize {
        self.graph
            .neighbors_directed(self.nodes[module], Direction::Incoming)
            .count()
    }

    pub fn fan_out(&self, module: usize) -> usize {
        self.graph
            .neighbors_directed(self.nodes[module], Direction::Outgoing)
            .count()
    }
}
