//! Source scanner: finds candidate files under the project root and extracts
//! their import/export declarations in parallel.

use crate::cache::{ExtractCache, content_hash};
use crate::config::Config;
use crate::fs::{FileSystem, IO_ATTEMPTS, read_with_retry};
use crate::glob::glob_match;
use crate::model::{SourceFile, Warning, WarningKind};
use crate::parser::ParserRegistry;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ScanOutput {
    /// Sorted by relative path.
    pub files: Vec<SourceFile>,
    /// Files that could not be read or tokenized, sorted.
    pub warnings: Vec<Warning>,
    pub cache_hits: usize,
}

enum FileOutcome {
    Scanned { file: SourceFile, cached: bool },
    Skipped(Warning),
}

/// Root-relative, `/`-separated form of `path`.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Whether a relative path passes the include/exclude globs.
pub fn is_selected(relative: &str, config: &Config) -> bool {
    let included =
        config.include.is_empty() || config.include.iter().any(|p| glob_match(p, relative));
    included && !config.exclude.iter().any(|p| glob_match(p, relative))
}

/// Walk the project and return every file a parser claims, honouring
/// `.gitignore`, `ignore_dirs` and the include/exclude globs.
pub fn discover(root: &Path, config: &Config, registry: &ParserRegistry) -> Vec<PathBuf> {
    let ignore_dirs = config.ignore_dirs.clone();
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && entry.depth() > 0 && ignore_dirs.iter().any(|d| entry.file_name() == d.as_str()))
        })
        .build();

    let mut paths: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| registry.find_parser(path).is_some())
        .filter(|path| is_selected(&relative_path(root, path), config))
        .collect();
    paths.sort();
    tracing::debug!(root = %root.display(), candidates = paths.len(), "discovered source files");
    paths
}

/// Read and extract every candidate. Results are independent of the order
/// of `candidates` and of thread scheduling.
pub fn scan(
    root: &Path,
    candidates: &[PathBuf],
    registry: &ParserRegistry,
    fs: &dyn FileSystem,
    cache: Option<&ExtractCache>,
) -> ScanOutput {
    let outcomes: Vec<FileOutcome> = candidates
        .par_iter()
        .map(|path| scan_file(root, path, registry, fs, cache))
        .collect();

    let mut output = ScanOutput::default();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Scanned { file, cached } => {
                output.cache_hits += usize::from(cached);
                output.files.push(file);
            }
            FileOutcome::Skipped(warning) => output.warnings.push(warning),
        }
    }

    output.files.sort_by(|a, b| a.relative.cmp(&b.relative));
    output.files.dedup_by(|a, b| a.relative == b.relative);
    output.warnings.sort();
    output.warnings.dedup();

    tracing::info!(
        files = output.files.len(),
        skipped = output.warnings.len(),
        cache_hits = output.cache_hits,
        "scan complete"
    );
    output
}

fn scan_file(
    root: &Path,
    path: &Path,
    registry: &ParserRegistry,
    fs: &dyn FileSystem,
    cache: Option<&ExtractCache>,
) -> FileOutcome {
    let relative = relative_path(root, path);

    let text = match read_with_retry(fs, path) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %relative, error = %err, "unreadable file");
            return FileOutcome::Skipped(Warning::new(
                WarningKind::Io,
                relative,
                format!("could not read file after {} attempts: {}", IO_ATTEMPTS, err),
            ));
        }
    };

    if let Some(cache) = cache {
        if let Some(syntax) = cache.lookup(&relative, &content_hash(&text)) {
            let file = SourceFile::new(path.to_path_buf(), relative, text, syntax.clone());
            return FileOutcome::Scanned { file, cached: true };
        }
    }

    match registry.parse(path, &text) {
        Ok(syntax) => FileOutcome::Scanned {
            file: SourceFile::new(path.to_path_buf(), relative, text, syntax),
            cached: false,
        },
        Err(err) => {
            tracing::debug!(path = %relative, error = %err, "tokenize failed");
            let mut warning = Warning::new(
                WarningKind::Parse,
                relative,
                format!("excluded from the graph: {}", err),
            );
            warning.line = err.line();
            FileOutcome::Skipped(warning)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;

    fn project() -> MockFs {
        MockFs::with_files([
            ("/p/src/modules/cart/index.ts", "export { add } from './add';"),
            ("/p/src/modules/cart/add.ts", "export function add() {}"),
            ("/p/src/broken.ts", "const s = 'unterminated\n"),
        ])
    }

    fn candidates() -> Vec<PathBuf> {
        [
            "/p/src/modules/cart/index.ts",
            "/p/src/broken.ts",
            "/p/src/modules/cart/add.ts",
            "/p/src/missing.ts",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    }

    #[test]
    fn test_scan_sorts_and_reports_failures() {
        let fs = project();
        let out = scan(Path::new("/p"), &candidates(), &ParserRegistry::new(), &fs, None);

        let paths: Vec<_> = out.files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(paths, vec!["src/modules/cart/add.ts", "src/modules/cart/index.ts"]);
        assert_eq!(out.files[1].imports[0].specifier, "./add");

        let kinds: Vec<_> = out.warnings.iter().map(|w| (w.path.as_str(), w.kind)).collect();
        assert_eq!(
            kinds,
            vec![("src/broken.ts", WarningKind::Parse), ("src/missing.ts", WarningKind::Io)]
        );
        assert_eq!(out.warnings[0].line, Some(1));
    }

    #[test]
    fn test_scan_order_independent() {
        let fs = project();
        let registry = ParserRegistry::new();
        let forward = scan(Path::new("/p"), &candidates(), &registry, &fs, None);
        let mut reversed_input = candidates();
        reversed_input.reverse();
        let reversed = scan(Path::new("/p"), &reversed_input, &registry, &fs, None);

        let names = |o: &ScanOutput| o.files.iter().map(|f| f.relative.clone()).collect::<Vec<_>>();
        assert_eq!(names(&forward), names(&reversed));
        assert_eq!(forward.warnings, reversed.warnings);
    }

    #[test]
    fn test_scan_uses_cache() {
        let fs = project();
        let registry = ParserRegistry::new();
        let first = scan(Path::new("/p"), &candidates(), &registry, &fs, None);
        let cache = ExtractCache::from_files(&first.files);

        fs.write(
            Path::new("/p/src/modules/cart/add.ts"),
            "export function add() {}\nexport const sub = 1;",
        )
        .unwrap();
        let second = scan(Path::new("/p"), &candidates(), &registry, &fs, Some(&cache));
        assert_eq!(second.cache_hits, 1);
        assert_eq!(second.files[0].exports, vec!["add", "sub"]);
    }

    #[test]
    fn test_selection_globs() {
        let mut config = Config::default();
        assert!(is_selected("src/a.ts", &config));
        config.exclude = vec!["**/*.test.ts".to_string()];
        assert!(!is_selected("src/a.test.ts", &config));
        config.include = vec!["src".to_string()];
        assert!(is_selected("src/modules/a/index.ts", &config));
        assert!(!is_selected("scripts/build.ts", &config));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/p"), Path::new("/p/src/a.ts")),
            "src/a.ts"
        );
    }
}
