use crate::model::{ImportEdge, Layer, Module, SourceFile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub from_module: String,
    pub to_module: String,
    /// Offending import statements; for cycles, one per consecutive pair.
    pub edges: Vec<ImportEdge>,
    /// Source locations of `edges`, in the same order. Never empty.
    pub locations: Vec<Location>,
    /// Symbols missing from the target's public surface (deep imports only).
    pub symbols: Vec<String>,
    /// Module ids participating in a cycle, sorted (cycles only).
    pub cycle: Vec<String>,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    LayerDirection,
    DeepImport,
    Cycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub path: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn of(edge: &ImportEdge, files: &[SourceFile]) -> Self {
        Self {
            path: files[edge.file].relative.clone(),
            line: edge.line,
            column: edge.column,
        }
    }
}

impl Violation {
    /// The location diagnostics are sorted and reported by.
    pub fn primary_location(&self) -> &Location {
        &self.locations[0]
    }

    pub fn layer_direction(
        from: &Module,
        to: &Module,
        edges: Vec<ImportEdge>,
        files: &[SourceFile],
        severity: Severity,
    ) -> Self {
        let locations = edges.iter().map(|e| Location::of(e, files)).collect();
        let message = if to.layer == Layer::Route {
            format!(
                "{} module `{}` imports route module `{}`; routes may not be imported",
                from.layer, from.id, to.id
            )
        } else {
            format!(
                "{} module `{}` may not import {} module `{}`",
                from.layer, from.id, to.layer, to.id
            )
        };

        Self {
            kind: ViolationKind::LayerDirection,
            severity,
            from_module: from.id.clone(),
            to_module: to.id.clone(),
            edges,
            locations,
            symbols: Vec::new(),
            cycle: Vec::new(),
            message,
            suggestion: Some(format!(
                "Move the shared code down into a layer that {} may depend on",
                from.layer
            )),
        }
    }

    pub fn deep_import(
        from: &Module,
        to: &Module,
        edge: ImportEdge,
        missing: Vec<String>,
        files: &[SourceFile],
        severity: Severity,
    ) -> Self {
        let target = &files[edge.target_file].relative;
        let message = if missing.is_empty() {
            format!(
                "`{}` reaches into `{}` through `{}` instead of its barrel file",
                from.id, to.id, target
            )
        } else {
            let names: Vec<_> = missing.iter().map(|s| format!("`{}`", s)).collect();
            format!(
                "`{}` imports {} from `{}`, which is not part of the public surface of `{}`",
                from.id,
                names.join(", "),
                target,
                to.id
            )
        };

        Self {
            kind: ViolationKind::DeepImport,
            severity,
            from_module: from.id.clone(),
            to_module: to.id.clone(),
            locations: vec![Location::of(&edge, files)],
            edges: vec![edge],
            symbols: missing,
            cycle: Vec::new(),
            message,
            suggestion: Some(format!(
                "Re-export the symbol from the barrel of `{}` and import it from there",
                to.id
            )),
        }
    }

    /// `path` is the minimal cycle as module ids, starting and ending at the same module.
    pub fn cycle(
        members: Vec<String>,
        path: &[String],
        edges: Vec<ImportEdge>,
        files: &[SourceFile],
        severity: Severity,
    ) -> Self {
        let locations = edges.iter().map(|e| Location::of(e, files)).collect();
        let from_module = path.first().cloned().unwrap_or_default();
        let to_module = path.get(1).cloned().unwrap_or_default();

        Self {
            kind: ViolationKind::Cycle,
            severity,
            from_module,
            to_module,
            edges,
            locations,
            symbols: Vec::new(),
            message: format!(
                "Dependency cycle between {} feature modules: {}",
                members.len(),
                path.join(" → ")
            ),
            cycle: members,
            suggestion: Some(
                "Break the cycle by moving the shared piece into core or shared".to_string(),
            ),
        }
    }
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 3] = [
        ViolationKind::LayerDirection,
        ViolationKind::DeepImport,
        ViolationKind::Cycle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViolationKind::LayerDirection => "layer-direction",
            ViolationKind::DeepImport => "deep-import",
            ViolationKind::Cycle => "cycle",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_round_trip_names() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert!("fatal".parse::<Severity>().is_err());
        assert!(Severity::Info < Severity::Warning && Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_kind_names_match_serde() {
        for kind in ViolationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }
}
