mod ecmascript;
mod lexer;

use crate::model::FileSyntax;
use std::path::Path;
use thiserror::Error;

pub use ecmascript::{DEFAULT_EXTENSIONS, EcmaScriptParser, extract};
pub use lexer::{Token, TokenKind, tokenize};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unterminated {what} starting at line {line}, column {column}")]
    Unterminated {
        what: &'static str,
        line: usize,
        column: usize,
    },
    #[error("Unsupported language for file: {0}")]
    UnsupportedLanguage(String),
}

impl ParseError {
    /// Line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Unterminated { line, .. } => Some(*line),
            ParseError::UnsupportedLanguage(_) => None,
        }
    }
}

pub trait LanguageParser: Send + Sync {
    fn extensions(&self) -> &[String];
    fn parse(&self, path: &Path, source: &str) -> Result<FileSyntax, ParseError>;
}

pub struct ParserRegistry {
    parsers: Vec<Box<dyn LanguageParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(EcmaScriptParser::new())],
        }
    }

    /// Registry that only claims files with the given extensions.
    pub fn with_extensions(extensions: &[String]) -> Self {
        if extensions.is_empty() {
            return Self::new();
        }
        let extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        Self {
            parsers: vec![Box::new(EcmaScriptParser::with_extensions(extensions))],
        }
    }

    pub fn find_parser(&self, path: &Path) -> Option<&dyn LanguageParser> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.parsers
            .iter()
            .find(|p| p.extensions().iter().any(|e| *e == ext))
            .map(|p| p.as_ref())
    }

    pub fn parse(&self, path: &Path, source: &str) -> Result<FileSyntax, ParseError> {
        let parser = self
            .find_parser(path)
            .ok_or_else(|| ParseError::UnsupportedLanguage(path.display().to_string()))?;
        parser.parse(path, source)
    }

    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions().iter().map(String::as_str))
            .collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_claims_configured_extensions() {
        let registry = ParserRegistry::with_extensions(&["ts".to_string(), ".VUE".to_string()]);
        assert!(registry.find_parser(Path::new("a/b.ts")).is_some());
        assert!(registry.find_parser(Path::new("a/b.vue")).is_some());
        assert!(registry.find_parser(Path::new("a/b.js")).is_none());
        assert!(matches!(
            registry.parse(Path::new("README.md"), ""),
            Err(ParseError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_default_registry() {
        let registry = ParserRegistry::default();
        assert_eq!(registry.supported_extensions(), DEFAULT_EXTENSIONS.to_vec());
        let syntax = registry
            .parse(Path::new("x.mjs"), "import { a } from './a.mjs';")
            .unwrap();
        assert_eq!(syntax.imports[0].specifier, "./a.mjs");
    }
}
