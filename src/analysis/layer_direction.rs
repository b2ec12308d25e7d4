use crate::analysis::DependencyGraph;
use crate::config::Config;
use crate::model::{Module, SourceFile, Violation, ViolationKind};

/// One violation per module edge whose target layer is not in the source
/// layer's `may_import` list.
pub fn detect_layer_violations(
    graph: &DependencyGraph,
    modules: &[Module],
    files: &[SourceFile],
    config: &Config,
) -> Vec<Violation> {
    let severity = config.severity.of(ViolationKind::LayerDirection);

    graph
        .edges()
        .filter(|edge| !config.may_import(modules[edge.from].layer, modules[edge.to].layer))
        .map(|edge| {
            Violation::layer_direction(
                &modules[edge.from],
                &modules[edge.to],
                edge.imports.clone(),
                files,
                severity,
            )
        })
        .collect()
}
