use crate::model::ImportKind;
use serde::Serialize;

/// One import statement that crosses a module boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    pub from_module: usize,
    pub to_module: usize,
    pub symbols: Vec<String>,
    pub kind: ImportKind,
    /// Index of the importing file.
    pub file: usize,
    /// Index of the file the specifier resolved to.
    pub target_file: usize,
    pub specifier: String,
    pub line: usize,
    pub column: usize,
}

/// All import statements from one module to another, collapsed into a single graph edge.
#[derive(Debug, Clone)]
pub struct ModuleEdge {
    pub from: usize,
    pub to: usize,
    /// Contributing import statements in file/line order. Never empty.
    pub imports: Vec<ImportEdge>,
}

impl ModuleEdge {
    /// The first contributing import, used when one location stands for the edge.
    pub fn representative(&self) -> &ImportEdge {
        &self.imports[0]
    }
}

/// An import that does not land inside any module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEdge {
    pub from_module: usize,
    pub file: usize,
    pub specifier: String,
    pub kind: ExternalKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalKind {
    /// Bare specifier of a third-party package.
    Package,
    /// Relative or aliased specifier that matched no scanned file.
    Unresolved,
    /// Resolves to a scanned file outside every layer.
    Unassigned,
}
