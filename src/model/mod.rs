mod edge;
mod module;
mod source;
mod violation;
mod warning;

pub use edge::{ExternalEdge, ExternalKind, ImportEdge, ModuleEdge};
pub use module::{Layer, Module, PublicSurface};
pub use source::{FileSyntax, ImportKind, ImportSpecifier, SourceFile};
pub use violation::{Location, Severity, Violation, ViolationKind};
pub use warning::{Warning, WarningKind};

use crate::analysis::DependencyGraph;
use std::path::PathBuf;

/// Everything one pipeline run produced. Immutable once built.
pub struct AnalysisResult {
    pub project_name: String,
    pub root: PathBuf,
    /// Successfully scanned files, sorted by relative path.
    pub files: Vec<SourceFile>,
    /// Modules sorted by id.
    pub modules: Vec<Module>,
    pub graph: DependencyGraph,
    /// Violations in rule-engine order; the reporter applies the final ordering.
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
}

impl AnalysisResult {
    /// Look up a scanned file by its root-relative path.
    pub fn file(&self, relative: &str) -> Option<&SourceFile> {
        self.files
            .binary_search_by(|f| f.relative.as_str().cmp(relative))
            .ok()
            .map(|idx| &self.files[idx])
    }

    pub fn module_of_id(&self, id: &str) -> Option<&Module> {
        self.modules
            .binary_search_by(|m| m.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.modules[idx])
    }
}
