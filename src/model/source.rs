use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One scanned source file with its extracted import and export declarations.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the project root, always `/`-separated.
    pub relative: String,
    pub text: String,
    pub imports: Vec<ImportSpecifier>,
    pub exports: Vec<String>,
}

impl SourceFile {
    pub fn new(path: PathBuf, relative: String, text: String, syntax: FileSyntax) -> Self {
        Self {
            path,
            relative,
            text,
            imports: syntax.imports,
            exports: syntax.exports,
        }
    }

    pub fn syntax(&self) -> FileSyntax {
        FileSyntax {
            imports: self.imports.clone(),
            exports: self.exports.clone(),
        }
    }

    /// File name without its final extension (`index.test.ts` -> `index.test`).
    pub fn stem(&self) -> &str {
        let name = self.relative.rsplit('/').next().unwrap_or(&self.relative);
        match name.rfind('.') {
            Some(0) | None => name,
            Some(pos) => &name[..pos],
        }
    }

    /// Directory portion of the relative path (empty for files at the root).
    pub fn dir(&self) -> &str {
        match self.relative.rfind('/') {
            Some(pos) => &self.relative[..pos],
            None => "",
        }
    }

    /// Text of a 1-based line, if it exists.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.text.lines().nth(idx))
    }
}

/// Declarations extracted from one file by the lexical scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSyntax {
    pub imports: Vec<ImportSpecifier>,
    pub exports: Vec<String>,
}

/// A literal module specifier found in an import-like form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub specifier: String,
    /// Names bound from the target module (`default` for default imports).
    pub symbols: Vec<String>,
    pub kind: ImportKind,
    #[serde(default)]
    pub type_only: bool,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `import a, { b } from 'x'`
    Named,
    /// `import * as ns from 'x'` or `export * as ns from 'x'`
    Namespace,
    /// `import 'x'`
    SideEffect,
    /// `export { a } from 'x'`
    ReExport,
    /// `export * from 'x'`
    StarReExport,
    /// `require('x')`
    Require,
    /// `import('x')`
    Dynamic,
}

impl ImportKind {
    /// Whether this form reaches the whole target module rather than naming symbols.
    pub fn is_whole_module(self) -> bool {
        !matches!(self, ImportKind::Named | ImportKind::ReExport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(relative: &str) -> SourceFile {
        SourceFile::new(
            PathBuf::from("/project").join(relative),
            relative.to_string(),
            "first\nsecond\n".to_string(),
            FileSyntax::default(),
        )
    }

    #[test]
    fn test_stem_and_dir() {
        let f = file("src/modules/cart/index.ts");
        assert_eq!(f.stem(), "index");
        assert_eq!(f.dir(), "src/modules/cart");

        let f = file("index.test.ts");
        assert_eq!(f.stem(), "index.test");
        assert_eq!(f.dir(), "");
    }

    #[test]
    fn test_line_text() {
        let f = file("a.ts");
        assert_eq!(f.line_text(2), Some("second"));
        assert_eq!(f.line_text(0), None);
        assert_eq!(f.line_text(9), None);
    }
}
