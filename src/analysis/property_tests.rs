//! Property-based tests for the rule engine.
//!
//! Each property builds an in-memory project from generated inputs and
//! compares what the checks report against an independent computation.

use crate::analysis::tests::{analyze_files, analyze_files_with};
use crate::config::Config;
use crate::graph::GraphData;
use crate::model::{AnalysisResult, Layer, Severity, ViolationKind};
use crate::output::{JsonOutput, OutputFormatter, Report};
use proptest::prelude::*;
use std::collections::BTreeSet;

const SYMBOLS: &[&str] = &["alpha", "beta", "gamma", "delta", "epsilon"];

/// Strategy for feature graphs: a module count and a row-major adjacency matrix.
fn feature_graph_strategy() -> impl Strategy<Value = (usize, Vec<bool>)> {
    (2usize..=6).prop_flat_map(|n| (Just(n), prop::collection::vec(any::<bool>(), n * n)))
}

fn feature_project(n: usize, adjacency: &[bool]) -> Vec<(String, String)> {
    (0..n)
        .map(|i| {
            let mut text = String::new();
            for j in (0..n).filter(|&j| j != i && adjacency[i * n + j]) {
                text.push_str(&format!("import {{ m{j} }} from '../m{j}';\n"));
            }
            text.push_str(&format!("export const m{i} = {i};\n"));
            (format!("modules/m{i}/index.ts"), text)
        })
        .collect()
}

/// Groups of mutually reachable modules with more than one member, from the
/// transitive closure of the adjacency matrix.
fn cyclic_groups(n: usize, adjacency: &[bool]) -> Vec<Vec<String>> {
    let mut reach: Vec<Vec<bool>> = (0..n)
        .map(|i| (0..n).map(|j| i != j && adjacency[i * n + j]).collect())
        .collect();
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if reach[i][k] && reach[k][j] {
                    reach[i][j] = true;
                }
            }
        }
    }

    let mut groups: BTreeSet<Vec<String>> = BTreeSet::new();
    for i in 0..n {
        let group: Vec<String> = (0..n)
            .filter(|&j| j == i || (reach[i][j] && reach[j][i]))
            .map(|j| format!("modules/m{j}"))
            .collect();
        if group.len() > 1 {
            groups.insert(group);
        }
    }
    groups.into_iter().collect()
}

fn analyze_owned(entries: &[(String, String)]) -> AnalysisResult {
    let borrowed: Vec<(&str, &str)> = entries
        .iter()
        .map(|(path, text)| (path.as_str(), text.as_str()))
        .collect();
    analyze_files(&borrowed)
}

fn render(result: &AnalysisResult) -> (String, String) {
    let mut json = Vec::new();
    JsonOutput::new()
        .format(&Report::new(result, Severity::Error), &mut json)
        .unwrap();
    let graph = GraphData::from_analysis(result).to_json().unwrap();
    (String::from_utf8(json).unwrap(), graph)
}

const LAYERED_FILES: &[(&str, Layer, &str)] = &[
    ("shared/x.ts", Layer::Shared, "@/shared/x"),
    ("core/x.ts", Layer::Core, "@/core/x"),
    ("modules/f/index.ts", Layer::Feature, "@/modules/f"),
    ("modules/g/index.ts", Layer::Feature, "@/modules/g"),
    ("routes/x.ts", Layer::Route, "@/routes/x"),
];

fn layer_set_strategy() -> impl Strategy<Value = Vec<Layer>> {
    prop::sample::subsequence(Layer::ALL.to_vec(), 0..=Layer::ALL.len())
}

const MIXED_PROJECT: &[(&str, &str)] = &[
    ("src/core/c.ts", "import { a } from '@/modules/a';\nimport { q } from './missing';"),
    ("src/main.ts", "import { a } from './modules/a';"),
    ("src/modules/a/index.ts", "import { hidden } from '@/modules/b/internal';\nimport { c } from '@/modules/c';\nexport const a = 1;"),
    ("src/modules/b/index.ts", "import { a } from '@/modules/a';\nimport React from 'react';\nexport const b = 1;"),
    ("src/modules/b/internal.ts", "export const hidden = 1;"),
    ("src/modules/c/index.ts", "import { b } from '@/modules/b';\nexport const c = 1;"),
    ("src/routes/home.tsx", "import { b } from '@/modules/b';\nexport default function Home() { return null; }"),
    ("src/shared/util.ts", "import { c } from '@/core/c';\nexport const util = 1;"),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A cycle violation is reported for exactly the strongly connected
    /// components with more than one member.
    #[test]
    fn prop_cycles_match_strongly_connected_components(
        (n, adjacency) in feature_graph_strategy()
    ) {
        let result = analyze_owned(&feature_project(n, &adjacency));

        let mut reported: Vec<Vec<String>> = result
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::Cycle)
            .map(|v| v.cycle.clone())
            .collect();
        reported.sort();
        prop_assert_eq!(reported, cyclic_groups(n, &adjacency));

        for violation in &result.violations {
            prop_assert_eq!(violation.kind, ViolationKind::Cycle);
            prop_assert!(violation.edges.len() >= 2);
        }
    }

    /// Surface symbols never trigger a deep import; every other imported
    /// symbol is reported, in import order.
    #[test]
    fn prop_deep_import_reports_exactly_non_surface_symbols(
        surface in prop::sample::subsequence(SYMBOLS.to_vec(), 0..=SYMBOLS.len()),
        imported in prop::sample::subsequence(SYMBOLS.to_vec(), 1..=SYMBOLS.len()).prop_shuffle(),
    ) {
        let barrel = if surface.is_empty() {
            "export const placeholder = 0;".to_string()
        } else {
            format!("export {{ {} }} from './internal';", surface.join(", "))
        };
        let internal: String = SYMBOLS
            .iter()
            .map(|name| format!("export const {name} = 1;\n"))
            .collect();
        let consumer = format!(
            "import {{ {} }} from '../lib/internal';\nexport const user = 1;",
            imported.join(", ")
        );

        let result = analyze_files(&[
            ("modules/lib/index.ts", barrel.as_str()),
            ("modules/lib/internal.ts", internal.as_str()),
            ("modules/user/index.ts", consumer.as_str()),
        ]);

        let expected: Vec<String> = imported
            .iter()
            .filter(|name| !surface.contains(*name))
            .map(|name| name.to_string())
            .collect();
        let deep: Vec<_> = result
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::DeepImport)
            .collect();

        if expected.is_empty() {
            prop_assert!(deep.is_empty(), "{:?}", deep);
        } else {
            prop_assert_eq!(deep.len(), 1);
            prop_assert_eq!(&deep[0].symbols, &expected);
            prop_assert_eq!(deep[0].to_module.as_str(), "modules/lib");
        }
        prop_assert_eq!(result.violations.len(), deep.len());
    }

    /// A cross-module edge is a layer violation exactly when the layer rules
    /// forbid it; edges out of the shared layer always are.
    #[test]
    fn prop_layer_direction_follows_rules(
        core in layer_set_strategy(),
        feature in layer_set_strategy(),
        route in layer_set_strategy(),
        from in 0..LAYERED_FILES.len(),
        to in 0..LAYERED_FILES.len(),
    ) {
        prop_assume!(from != to);

        let mut config = Config::default();
        for entry in &mut config.layers {
            match entry.layer {
                Layer::Core => entry.may_import = core.clone(),
                Layer::Feature => entry.may_import = feature.clone(),
                Layer::Route => entry.may_import = route.clone(),
                Layer::Shared => {}
            }
        }

        let (_, from_layer, _) = LAYERED_FILES[from];
        let (_, to_layer, specifier) = LAYERED_FILES[to];
        let importer = format!("import {{ t }} from '{specifier}';\nexport const t = 1;");
        let entries: Vec<(&str, &str)> = LAYERED_FILES
            .iter()
            .enumerate()
            .map(|(idx, (path, _, _))| {
                let text = if idx == from { importer.as_str() } else { "export const t = 1;" };
                (*path, text)
            })
            .collect();

        let forbidden = !config.may_import(from_layer, to_layer);
        let result = analyze_files_with(config, &entries);
        let layer_violations = result
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::LayerDirection)
            .count();

        prop_assert_eq!(layer_violations, usize::from(forbidden));
        if from_layer == Layer::Shared {
            prop_assert_eq!(layer_violations, 1);
        }
    }

    /// The order files are read in never changes the report or the graph.
    #[test]
    fn prop_read_order_does_not_change_output(
        shuffled in Just(MIXED_PROJECT.to_vec()).prop_shuffle()
    ) {
        let baseline = render(&analyze_files(MIXED_PROJECT));
        let candidate = render(&analyze_files(&shuffled));
        prop_assert_eq!(candidate, baseline);
    }
}
