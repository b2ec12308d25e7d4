use crate::analysis::DependencyGraph;
use crate::config::Config;
use crate::model::{ImportEdge, Layer, Module, SourceFile, Violation, ViolationKind};

/// Check every import into a feature module against that module's public surface.
///
/// Named imports are judged by symbol only: a symbol the barrel exports may be
/// imported from anywhere in the module. Imports that bring in no names
/// (namespace, side-effect, `require`, dynamic, `export *`) are only allowed
/// when they land on the barrel itself.
pub fn detect_deep_imports(
    graph: &DependencyGraph,
    modules: &[Module],
    files: &[SourceFile],
    config: &Config,
) -> Vec<Violation> {
    let severity = config.severity.of(ViolationKind::DeepImport);
    let mut violations = Vec::new();

    for edge in graph.import_edges() {
        let target = &modules[edge.to_module];
        if target.layer != Layer::Feature {
            continue;
        }
        let Some(missing) = missing_symbols(edge, target) else {
            continue;
        };
        violations.push(Violation::deep_import(
            &modules[edge.from_module],
            target,
            edge.clone(),
            missing,
            files,
            severity,
        ));
    }

    violations
}

/// `Some(names outside the surface)` if the import breaks the barrel rule.
/// The list is empty for a name-less import that bypasses the barrel.
fn missing_symbols(edge: &ImportEdge, target: &Module) -> Option<Vec<String>> {
    if edge.kind.is_whole_module() {
        return (target.barrel != Some(edge.target_file)).then(Vec::new);
    }

    let mut missing: Vec<String> = Vec::new();
    for symbol in &edge.symbols {
        if !target.surface.contains(symbol) && !missing.contains(symbol) {
            missing.push(symbol.clone());
        }
    }
    (!missing.is_empty()).then_some(missing)
}
