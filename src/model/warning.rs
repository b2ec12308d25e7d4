use serde::Serialize;

/// A non-fatal problem recorded during a run. Warnings never affect pass/fail.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Warning {
    pub path: String,
    pub line: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// The file could not be tokenized and was left out of the graph.
    Parse,
    /// The file could not be read, even after retrying.
    Io,
    /// The file matches no layer and is excluded from rule checks.
    Unassigned,
    /// A relative or aliased specifier matched no scanned file.
    Unresolved,
    /// The incremental cache could not be used and was rebuilt.
    Cache,
}

impl Warning {
    pub fn new(kind: WarningKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
            kind,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::Parse => write!(f, "parse"),
            WarningKind::Io => write!(f, "io"),
            WarningKind::Unassigned => write!(f, "unassigned"),
            WarningKind::Unresolved => write!(f, "unresolved"),
            WarningKind::Cache => write!(f, "cache"),
        }
    }
}
