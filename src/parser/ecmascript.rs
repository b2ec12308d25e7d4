use crate::model::{FileSyntax, ImportKind, ImportSpecifier};
use crate::parser::lexer::{Token, TokenKind, tokenize};
use crate::parser::{LanguageParser, ParseError};
use std::path::Path;

pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Extensions whose files may contain JSX element text.
const JSX_EXTENSIONS: &[&str] = &["tsx", "jsx", "js"];

/// Keywords that begin a new statement, ending a declarator list scan.
const STATEMENT_KEYWORDS: &[&str] = &[
    "export", "import", "const", "let", "var", "function", "class", "interface", "type", "enum",
];

/// Parser for JavaScript, TypeScript and their JSX variants.
pub struct EcmaScriptParser {
    extensions: Vec<String>,
}

impl EcmaScriptParser {
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }

    pub fn with_extensions(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

impl Default for EcmaScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for EcmaScriptParser {
    fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn parse(&self, path: &Path, source: &str) -> Result<FileSyntax, ParseError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let tokens = tokenize(source, JSX_EXTENSIONS.contains(&ext))?;
        Ok(extract(&tokens))
    }
}

/// Collect import specifiers and exported names from a token stream.
pub fn extract(tokens: &[Token<'_>]) -> FileSyntax {
    let mut syntax = FileSyntax::default();
    let mut depth = 0usize;
    let mut i = 0;

    while i < tokens.len() {
        let tok = &tokens[i];
        let after_dot = i > 0 && tokens[i - 1].is_punct('.');

        match tok.kind {
            TokenKind::Punct('{') => depth += 1,
            TokenKind::Punct('}') => depth = depth.saturating_sub(1),
            TokenKind::Ident if !after_dot => {
                let next = match &*tok.text {
                    "import" => Some(import_statement(tokens, i, &mut syntax)),
                    "export" if depth == 0 => Some(export_statement(tokens, i, &mut syntax)),
                    "require" => require_call(tokens, i, &mut syntax),
                    _ => None,
                };
                if let Some(next) = next {
                    i = next.max(i + 1);
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let mut seen = std::collections::HashSet::new();
    syntax.exports.retain(|name| seen.insert(name.clone()));
    syntax
}

fn push_import(
    syntax: &mut FileSyntax,
    at: &Token<'_>,
    specifier: &str,
    symbols: Vec<String>,
    kind: ImportKind,
    type_only: bool,
) {
    syntax.imports.push(ImportSpecifier {
        specifier: specifier.to_string(),
        symbols,
        kind,
        type_only,
        line: at.line,
        column: at.column,
    });
}

/// `( 'literal' )` or `( 'literal', options )` starting at `open`.
fn call_literal<'t>(tokens: &'t [Token<'_>], open: usize) -> Option<&'t str> {
    if !tokens.get(open)?.is_punct('(') {
        return None;
    }
    let literal = tokens.get(open + 1)?.literal()?;
    let close = tokens.get(open + 2)?;
    (close.is_punct(')') || close.is_punct(',')).then_some(literal)
}

fn name_token(tok: Option<&Token<'_>>) -> Option<String> {
    let tok = tok?;
    match tok.kind {
        TokenKind::Ident | TokenKind::Str => Some(tok.text.to_string()),
        _ => None,
    }
}

fn from_clause<'t>(tokens: &'t [Token<'_>], at: usize) -> Option<&'t str> {
    if !tokens.get(at)?.is_ident("from") {
        return None;
    }
    tokens.get(at + 1)?.literal()
}

/// Parse `{ a, b as c, type D }` starting at `{`. Returns `(name, alias)` pairs and the
/// index after `}`, or `None` if the list is malformed.
fn named_list(tokens: &[Token<'_>], open: usize) -> Option<(Vec<(String, Option<String>)>, usize)> {
    let mut items = Vec::new();
    let mut k = open + 1;

    loop {
        let tok = tokens.get(k)?;
        if tok.is_punct('}') {
            return Some((items, k + 1));
        }
        if tok.is_punct(',') {
            k += 1;
            continue;
        }

        // inline `type` modifier
        if tok.is_ident("type") {
            let modifies = tokens.get(k + 1).is_some_and(|t| {
                matches!(t.kind, TokenKind::Ident | TokenKind::Str) && !t.is_ident("as")
            });
            if modifies {
                k += 1;
            }
        }

        let name = name_token(tokens.get(k))?;
        k += 1;

        let alias = if tokens.get(k).is_some_and(|t| t.is_ident("as")) {
            let alias = name_token(tokens.get(k + 1))?;
            k += 2;
            Some(alias)
        } else {
            None
        };
        items.push((name, alias));
    }
}

fn import_statement(tokens: &[Token<'_>], i: usize, syntax: &mut FileSyntax) -> usize {
    let at = &tokens[i];
    let mut j = i + 1;
    let Some(next) = tokens.get(j) else {
        return j;
    };

    if next.is_punct('(') {
        if let Some(spec) = call_literal(tokens, j) {
            push_import(syntax, at, spec, Vec::new(), ImportKind::Dynamic, false);
        }
        return j;
    }
    if next.is_punct('.') {
        // import.meta
        return j;
    }

    let mut type_only = false;
    if next.is_ident("type") {
        let is_modifier = tokens
            .get(j + 1)
            .is_some_and(|t| !t.is_ident("from") && !t.is_punct(',') && !t.is_punct('='));
        if is_modifier {
            type_only = true;
            j += 1;
        }
    }

    if let Some(spec) = tokens.get(j).and_then(Token::literal) {
        push_import(syntax, at, spec, Vec::new(), ImportKind::SideEffect, type_only);
        return j + 1;
    }

    let mut symbols = Vec::new();
    let mut namespace = false;

    if tokens.get(j).is_some_and(|t| t.kind == TokenKind::Ident) {
        if tokens.get(j + 1).is_some_and(|t| t.is_punct('=')) {
            // `import x = require('y')`; the require call is picked up on its own
            return j + 1;
        }
        symbols.push("default".to_string());
        j += 1;
        if tokens.get(j).is_some_and(|t| t.is_punct(',')) {
            j += 1;
        }
    }

    if tokens.get(j).is_some_and(|t| t.is_punct('*')) {
        namespace = true;
        j += 1;
        if tokens.get(j).is_some_and(|t| t.is_ident("as")) {
            j += 2;
        }
    }

    if tokens.get(j).is_some_and(|t| t.is_punct('{')) {
        let Some((items, next)) = named_list(tokens, j) else {
            return j;
        };
        symbols.extend(items.into_iter().map(|(name, _)| name));
        j = next;
    }

    let Some(spec) = from_clause(tokens, j) else {
        return j;
    };
    let kind = if namespace {
        ImportKind::Namespace
    } else {
        ImportKind::Named
    };
    push_import(syntax, at, spec, symbols, kind, type_only);
    j + 2
}

fn export_statement(tokens: &[Token<'_>], i: usize, syntax: &mut FileSyntax) -> usize {
    let at = &tokens[i];
    let mut j = i + 1;
    let Some(next) = tokens.get(j) else {
        return j;
    };

    if next.is_ident("default") || next.is_punct('=') {
        syntax.exports.push("default".to_string());
        return j + 1;
    }
    if next.is_ident("as") {
        // `export as namespace Foo` (UMD global)
        return j + 1;
    }
    if next.is_ident("import") {
        // `export import A = N.A`
        if let Some(name) = name_token(tokens.get(j + 1)) {
            syntax.exports.push(name);
        }
        return j + 2;
    }

    let mut type_only = false;
    if next.is_ident("type") && tokens.get(j + 1).is_some_and(|t| t.is_punct('{') || t.is_punct('*')) {
        type_only = true;
        j += 1;
    }

    if tokens.get(j).is_some_and(|t| t.is_punct('*')) {
        j += 1;
        if tokens.get(j).is_some_and(|t| t.is_ident("as")) {
            let Some(alias) = name_token(tokens.get(j + 1)) else {
                return j;
            };
            syntax.exports.push(alias);
            j += 2;
            if let Some(spec) = from_clause(tokens, j) {
                push_import(syntax, at, spec, Vec::new(), ImportKind::Namespace, type_only);
                return j + 2;
            }
            return j;
        }
        if let Some(spec) = from_clause(tokens, j) {
            push_import(syntax, at, spec, Vec::new(), ImportKind::StarReExport, type_only);
            return j + 2;
        }
        return j;
    }

    if tokens.get(j).is_some_and(|t| t.is_punct('{')) {
        let Some((items, next)) = named_list(tokens, j) else {
            return j;
        };
        let reexport = from_clause(tokens, next);
        let mut names = Vec::with_capacity(items.len());
        for (name, alias) in items {
            syntax.exports.push(alias.unwrap_or_else(|| name.clone()));
            names.push(name);
        }
        if let Some(spec) = reexport {
            push_import(syntax, at, spec, names, ImportKind::ReExport, type_only);
            return next + 2;
        }
        return next;
    }

    declaration(tokens, j, syntax)
}

/// Exported declaration (`const`, `function`, `class`, ...). Consumes only up to the
/// declared name(s) so that the body is still scanned for dynamic imports.
fn declaration(tokens: &[Token<'_>], start: usize, syntax: &mut FileSyntax) -> usize {
    let mut k = start;
    while tokens
        .get(k)
        .is_some_and(|t| t.is_ident("declare") || t.is_ident("abstract") || t.is_ident("async"))
    {
        k += 1;
    }

    let Some(keyword) = tokens.get(k) else {
        return k;
    };
    if keyword.kind != TokenKind::Ident {
        return k;
    }

    match &*keyword.text {
        "function" => {
            k += 1;
            if tokens.get(k).is_some_and(|t| t.is_punct('*')) {
                k += 1;
            }
            if let Some(name) = ident(tokens.get(k)) {
                syntax.exports.push(name);
                k += 1;
            }
            k
        }
        "class" | "interface" | "type" | "enum" | "namespace" | "module" => {
            if let Some(name) = ident(tokens.get(k + 1)) {
                syntax.exports.push(name);
                return k + 2;
            }
            k + 1
        }
        "const" if tokens.get(k + 1).is_some_and(|t| t.is_ident("enum")) => {
            if let Some(name) = ident(tokens.get(k + 2)) {
                syntax.exports.push(name);
                return k + 3;
            }
            k + 2
        }
        "const" | "let" | "var" => {
            let (names, next) = binding_names(tokens, k + 1);
            syntax.exports.extend(names);
            syntax.exports.extend(more_declarators(tokens, next));
            next
        }
        _ => k,
    }
}

fn ident(tok: Option<&Token<'_>>) -> Option<String> {
    tok.filter(|t| t.kind == TokenKind::Ident)
        .map(|t| t.text.to_string())
}

/// Names bound by an identifier or a destructuring pattern starting at `start`.
fn binding_names(tokens: &[Token<'_>], start: usize) -> (Vec<String>, usize) {
    let Some(first) = tokens.get(start) else {
        return (Vec::new(), start);
    };
    if first.kind == TokenKind::Ident {
        return (vec![first.text.to_string()], start + 1);
    }
    if !first.is_punct('{') && !first.is_punct('[') {
        return (Vec::new(), start);
    }

    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut k = start;
    while let Some(tok) = tokens.get(k) {
        match tok.kind {
            TokenKind::Punct('{') | TokenKind::Punct('[') => depth += 1,
            TokenKind::Punct('}') | TokenKind::Punct(']') => {
                depth -= 1;
                if depth == 0 {
                    return (names, k + 1);
                }
            }
            TokenKind::Ident => {
                let prev_binds = tokens[k - 1].is_punct('{')
                    || tokens[k - 1].is_punct('[')
                    || tokens[k - 1].is_punct(',')
                    || tokens[k - 1].is_punct(':')
                    || tokens[k - 1].is_punct('.');
                let is_key = tokens
                    .get(k + 1)
                    .is_some_and(|t| t.is_punct(':') || t.is_punct('('));
                if prev_binds && !is_key {
                    names.push(tok.text.to_string());
                }
            }
            _ => {}
        }
        k += 1;
    }
    (names, k)
}

/// Look ahead (without consuming) for `, name = ...` declarators of the same statement.
fn more_declarators(tokens: &[Token<'_>], start: usize) -> Vec<String> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut angle = 0usize;
    let mut in_type = tokens.get(start).is_some_and(|t| t.is_punct(':'));
    let mut k = start;

    while let Some(tok) = tokens.get(k) {
        match tok.kind {
            TokenKind::Punct('(') | TokenKind::Punct('[') | TokenKind::Punct('{') => depth += 1,
            TokenKind::Punct(')') | TokenKind::Punct(']') | TokenKind::Punct('}') => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            TokenKind::Punct('<') if in_type => angle += 1,
            TokenKind::Punct('>') if in_type => angle = angle.saturating_sub(1),
            TokenKind::Punct('=') if depth == 0 => {
                if tokens.get(k + 1).is_some_and(|t| t.is_punct('>')) {
                    // arrow, not an initializer
                    k += 2;
                    continue;
                }
                if angle == 0 {
                    in_type = false;
                }
            }
            TokenKind::Punct(';') if depth == 0 => break,
            TokenKind::Ident if depth == 0 && STATEMENT_KEYWORDS.contains(&&*tok.text) => {
                break;
            }
            TokenKind::Punct(',') if depth == 0 && angle == 0 => {
                let (more, next) = binding_names(tokens, k + 1);
                if !more.is_empty() {
                    names.extend(more);
                    in_type = tokens.get(next).is_some_and(|t| t.is_punct(':'));
                    k = next;
                    continue;
                }
            }
            _ => {}
        }
        k += 1;
    }
    names
}

/// `require('x')` not preceded by a member access.
fn require_call(tokens: &[Token<'_>], i: usize, syntax: &mut FileSyntax) -> Option<usize> {
    let spec = call_literal(tokens, i + 1)?;
    push_import(syntax, &tokens[i], spec, Vec::new(), ImportKind::Require, false);
    Some(i + 3)
}
