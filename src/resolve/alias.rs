use crate::model::{ExternalKind, SourceFile};
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path};

/// `K*` -> `T*` (wildcard) or `K` -> `T` (exact, also covering `K/...`).
#[derive(Debug, Clone)]
struct Alias {
    prefix: String,
    target: String,
    wildcard: bool,
}

/// Import path aliases, tried longest prefix first.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    pub fn new(aliases: &BTreeMap<String, String>) -> Self {
        let mut entries: Vec<Alias> = aliases
            .iter()
            .map(|(key, target)| {
                let wildcard = key.ends_with('*');
                Alias {
                    prefix: key.trim_end_matches('*').to_string(),
                    target: target
                        .trim_end_matches('*')
                        .trim_start_matches("./")
                        .to_string(),
                    wildcard,
                }
            })
            .collect();
        entries.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });
        Self { entries }
    }

    /// Rewrite an aliased specifier to a root-relative path.
    pub fn expand(&self, specifier: &str) -> Option<String> {
        self.entries.iter().find_map(|alias| {
            if alias.wildcard {
                let rest = specifier.strip_prefix(&alias.prefix)?;
                return Some(format!("{}{}", alias.target, rest));
            }
            if specifier == alias.prefix {
                return Some(alias.target.clone());
            }
            let rest = specifier
                .strip_prefix(&alias.prefix)?
                .strip_prefix('/')?;
            Some(format!("{}/{}", alias.target.trim_end_matches('/'), rest))
        })
    }
}

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Index of the scanned file the specifier points at.
    File(usize),
    External(ExternalKind),
}

/// Maps import specifiers to scanned files.
pub struct SpecifierResolver<'a> {
    by_path: HashMap<&'a str, usize>,
    /// Directory (root-relative) to the barrel file inside it.
    barrels: &'a HashMap<String, usize>,
    aliases: &'a AliasTable,
    extensions: &'a [String],
}

/// TypeScript sources an explicit JavaScript extension may stand for.
fn script_equivalents(ext: &str) -> &'static [&'static str] {
    match ext {
        "js" => &["ts", "tsx"],
        "jsx" => &["tsx"],
        "mjs" => &["mts"],
        "cjs" => &["cts"],
        _ => &[],
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Normalize a `/`-separated path, rejecting anything that leaves the root.
fn normalize(path: &str) -> Option<String> {
    let cleaned = path_clean::clean(Path::new(path));
    let mut parts = Vec::new();
    for component in cleaned.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

impl<'a> SpecifierResolver<'a> {
    pub fn new(
        files: &'a [SourceFile],
        barrels: &'a HashMap<String, usize>,
        aliases: &'a AliasTable,
        extensions: &'a [String],
    ) -> Self {
        let by_path = files
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.relative.as_str(), idx))
            .collect();
        Self {
            by_path,
            barrels,
            aliases,
            extensions,
        }
    }

    pub fn resolve(&self, from_relative: &str, specifier: &str) -> Resolution {
        // bundler query/fragment suffixes (`./icon.svg?raw`) never change the target file
        let specifier = specifier
            .split(['?', '#'])
            .next()
            .unwrap_or(specifier);

        let base = if is_relative(specifier) {
            let dir = from_relative.rsplit_once('/').map_or("", |(dir, _)| dir);
            format!("{}/{}", dir, specifier)
        } else if let Some(absolute) = specifier.strip_prefix('/') {
            absolute.to_string()
        } else if let Some(expanded) = self.aliases.expand(specifier) {
            expanded
        } else {
            return Resolution::External(ExternalKind::Package);
        };

        normalize(&base)
            .and_then(|path| self.lookup(&path))
            .map(Resolution::File)
            .unwrap_or(Resolution::External(ExternalKind::Unresolved))
    }

    fn lookup(&self, path: &str) -> Option<usize> {
        if let Some(&idx) = self.by_path.get(path) {
            return Some(idx);
        }
        for ext in self.extensions {
            if let Some(&idx) = self.by_path.get(format!("{}.{}", path, ext).as_str()) {
                return Some(idx);
            }
        }
        if let Some(&idx) = self.barrels.get(path) {
            return Some(idx);
        }
        for ext in self.extensions {
            let index = if path.is_empty() {
                format!("index.{}", ext)
            } else {
                format!("{}/index.{}", path, ext)
            };
            if let Some(&idx) = self.by_path.get(index.as_str()) {
                return Some(idx);
            }
        }
        let (stem, ext) = path.rsplit_once('.')?;
        script_equivalents(ext).iter().find_map(|alt| {
            self.by_path
                .get(format!("{}.{}", stem, alt).as_str())
                .copied()
        })
    }
}
