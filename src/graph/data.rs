use crate::model::{AnalysisResult, ExternalKind, Layer, ViolationKind};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;

/// The resolved module graph in a serializable form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub externals: Vec<GraphExternal>,
    pub metadata: GraphMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub layer: Layer,
    pub files: usize,
    pub barrel: Option<String>,
    pub fan_in: usize,
    pub fan_out: usize,
    pub surface: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    /// Import statements collapsed into this link.
    pub imports: usize,
    pub is_violation: bool,
    pub is_cycle: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExternal {
    pub module: String,
    pub specifier: String,
    pub kind: ExternalKind,
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub project_name: String,
    pub total_modules: usize,
    pub total_dependencies: usize,
    pub total_violations: usize,
    pub cycle_count: usize,
}

impl GraphData {
    pub fn from_analysis(result: &AnalysisResult) -> Self {
        let graph = &result.graph;

        let nodes = result
            .modules
            .iter()
            .enumerate()
            .map(|(idx, m)| GraphNode {
                id: m.id.clone(),
                name: m.name.clone(),
                layer: m.layer,
                files: m.files.len(),
                barrel: m.barrel.map(|f| result.files[f].relative.clone()),
                fan_in: graph.fan_in(idx),
                fan_out: graph.fan_out(idx),
                surface: m.surface.iter().map(str::to_string).collect(),
            })
            .collect();

        let mut cycle_pairs: HashSet<(usize, usize)> = HashSet::new();
        let mut violating_pairs: HashSet<(usize, usize)> = HashSet::new();
        for violation in &result.violations {
            for edge in &violation.edges {
                let pair = (edge.from_module, edge.to_module);
                violating_pairs.insert(pair);
                if violation.kind == ViolationKind::Cycle {
                    cycle_pairs.insert(pair);
                }
            }
        }

        let mut links: Vec<GraphLink> = graph
            .edges()
            .map(|edge| GraphLink {
                source: result.modules[edge.from].id.clone(),
                target: result.modules[edge.to].id.clone(),
                imports: edge.imports.len(),
                is_violation: violating_pairs.contains(&(edge.from, edge.to)),
                is_cycle: cycle_pairs.contains(&(edge.from, edge.to)),
            })
            .collect();
        links.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

        let externals = graph
            .externals()
            .iter()
            .map(|ext| GraphExternal {
                module: result.modules[ext.from_module].id.clone(),
                specifier: ext.specifier.clone(),
                kind: ext.kind,
                file: result.files[ext.file].relative.clone(),
                line: ext.line,
            })
            .collect();

        let metadata = GraphMetadata {
            project_name: result.project_name.clone(),
            total_modules: result.modules.len(),
            total_dependencies: links.len(),
            total_violations: result.violations.len(),
            cycle_count: result
                .violations
                .iter()
                .filter(|v| v.kind == ViolationKind::Cycle)
                .count(),
        };

        GraphData {
            nodes,
            links,
            externals,
            metadata,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self).map(|mut json| {
            json.push('\n');
            json
        })
    }

    /// Graphviz rendering: one cluster per layer, violating links in red.
    /// External packages are left out.
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph {} {{", quote(&self.metadata.project_name));
        let _ = writeln!(dot, "  rankdir=BT;");
        let _ = writeln!(dot, "  node [shape=box, fontname=\"Helvetica\"];");

        for layer in Layer::ALL {
            let members: Vec<&GraphNode> =
                self.nodes.iter().filter(|n| n.layer == layer).collect();
            if members.is_empty() {
                continue;
            }
            let _ = writeln!(dot, "  subgraph cluster_{} {{", layer);
            let _ = writeln!(dot, "    label={};", quote(layer.name()));
            for node in members {
                let _ = writeln!(
                    dot,
                    "    {} [label={}];",
                    quote(&node.id),
                    quote(&format!("{}\\n{} files", node.name, node.files))
                );
            }
            let _ = writeln!(dot, "  }}");
        }

        for link in &self.links {
            let style = if link.is_violation {
                ", color=red, fontcolor=red"
            } else {
                ""
            };
            let _ = writeln!(
                dot,
                "  {} -> {} [label=\"{}\"{}];",
                quote(&link.source),
                quote(&link.target),
                link.imports,
                style
            );
        }
        dot.push_str("}\n");
        dot
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
