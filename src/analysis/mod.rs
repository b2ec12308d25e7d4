mod circular;
mod deep_import;
mod graph;
mod layer_direction;
#[cfg(test)]
mod property_tests;

pub use circular::detect_circular_dependencies;
pub use deep_import::detect_deep_imports;
pub use graph::DependencyGraph;
pub use layer_direction::detect_layer_violations;

use crate::cache::ExtractCache;
use crate::config::{Config, ConfigError};
use crate::fs::FileSystem;
use crate::model::{AnalysisResult, SourceFile, Warning};
use crate::parser::ParserRegistry;
use crate::resolve::{AliasTable, LayerMap, SpecifierResolver, build_modules, find_barrels};
use crate::scan;
use std::path::{Path, PathBuf};

/// Run the whole pipeline over the project at `root`.
pub fn analyze(
    root: &Path,
    config: &Config,
    registry: &ParserRegistry,
    fs: &dyn FileSystem,
    cache: Option<&ExtractCache>,
) -> Result<AnalysisResult, ConfigError> {
    let candidates = scan::discover(root, config, registry);
    analyze_candidates(root, &candidates, config, registry, fs, cache)
}

/// Run the pipeline over an explicit list of files.
pub fn analyze_candidates(
    root: &Path,
    candidates: &[PathBuf],
    config: &Config,
    registry: &ParserRegistry,
    fs: &dyn FileSystem,
    cache: Option<&ExtractCache>,
) -> Result<AnalysisResult, ConfigError> {
    let scanned = scan::scan(root, candidates, registry, fs, cache);
    analyze_sources(root, scanned.files, scanned.warnings, config)
}

/// Resolve, build the graph and run every rule over already scanned files.
/// `files` must be sorted by relative path.
pub fn analyze_sources(
    root: &Path,
    files: Vec<SourceFile>,
    mut warnings: Vec<Warning>,
    config: &Config,
) -> Result<AnalysisResult, ConfigError> {
    let project_name = root
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("project")
        .to_string();

    let aliases = AliasTable::new(&config.aliases);
    let barrels = find_barrels(&files, &config.barrel, &config.extensions);
    let resolver = SpecifierResolver::new(&files, &barrels, &aliases, &config.extensions);

    let (module_set, unassigned) =
        build_modules(&files, &LayerMap::from_config(config), &barrels, &resolver)?;
    let modules = module_set.modules;
    let (graph, unresolved) =
        DependencyGraph::build(&files, &modules, &module_set.file_module, &resolver);

    // Checks are independent; each reports everything it finds
    let mut violations = detect_layer_violations(&graph, &modules, &files, config);
    violations.extend(detect_deep_imports(&graph, &modules, &files, config));
    violations.extend(detect_circular_dependencies(&graph, &modules, &files, config));

    warnings.extend(unassigned);
    warnings.extend(unresolved);
    warnings.sort();
    warnings.dedup();

    tracing::info!(
        modules = modules.len(),
        violations = violations.len(),
        warnings = warnings.len(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        project_name,
        root: root.to_path_buf(),
        files,
        modules,
        graph,
        violations,
        warnings,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::default_aliases;
    use crate::fs::mock::MockFs;

    /// Analyze an in-memory project rooted at `/p` with the default config.
    pub(crate) fn analyze_files(entries: &[(&str, &str)]) -> AnalysisResult {
        analyze_files_with(Config::default(), entries)
    }

    /// Like [`analyze_files`] with a custom config. Default aliases are filled
    /// in when the config declares none.
    pub(crate) fn analyze_files_with(mut config: Config, entries: &[(&str, &str)]) -> AnalysisResult {
        let fs = MockFs::with_files(
            entries
                .iter()
                .map(|(path, text)| (format!("/p/{}", path), text.to_string())),
        );
        let root = Path::new("/p");
        if config.aliases.is_empty() {
            config.aliases = default_aliases(&fs, root);
        }
        let registry = ParserRegistry::with_extensions(&config.extensions);
        let candidates: Vec<PathBuf> = entries
            .iter()
            .map(|(path, _)| root.join(path))
            .collect();
        analyze_candidates(root, &candidates, &config, &registry, &fs, None).unwrap()
    }

    #[test]
    fn test_checks_do_not_short_circuit() {
        let result = analyze_files(&[
            ("src/core/c.ts", "import { a } from '@/modules/a';"),
            ("src/modules/a/index.ts", "import { hidden } from '@/modules/b/internal';\nexport const a = 1;"),
            ("src/modules/b/index.ts", "import { a } from '@/modules/a';\nexport const b = 1;"),
            ("src/modules/b/internal.ts", "export const hidden = 1;"),
        ]);
        let kinds: Vec<_> = result.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::model::ViolationKind::LayerDirection,
                crate::model::ViolationKind::DeepImport,
                crate::model::ViolationKind::Cycle,
            ]
        );
        assert_eq!(result.project_name, "p");
    }

    #[test]
    fn test_dotted_extensions_still_resolve_imports() {
        let config = Config::from_toml("extensions = [\".TS\"]").unwrap();
        let result = analyze_files_with(
            config,
            &[
                ("core/x.ts", "import { h } from '../modules/auth/helper';"),
                ("modules/auth/index.ts", "export const login = 1;"),
                ("modules/auth/helper.ts", "export const h = 1;"),
            ],
        );
        let kinds: Vec<_> = result.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                crate::model::ViolationKind::LayerDirection,
                crate::model::ViolationKind::DeepImport,
            ]
        );
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_parse_failures_are_warnings() {
        let result = analyze_files(&[
            ("src/modules/a/index.ts", "export const a = `unterminated;"),
            ("src/modules/b/index.ts", "import { a } from '@/modules/a';\nexport const b = 1;"),
        ]);
        // a was excluded, so b's import is unresolved rather than a violation
        assert!(result.violations.is_empty());
        let kinds: Vec<_> = result.warnings.iter().map(|w| w.kind.to_string()).collect();
        assert_eq!(kinds, vec!["parse", "unresolved"]);
        assert!(result.module_of_id("src/modules/a").is_none());
    }
}
