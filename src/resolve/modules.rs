use crate::config::ConfigError;
use crate::glob::segment_match;
use crate::model::{ImportKind, Module, PublicSurface, SourceFile, Warning, WarningKind};
use crate::resolve::{LayerMap, Resolution, SpecifierResolver};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Modules of one run plus the owning module of every scanned file.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    /// Sorted by id.
    pub modules: Vec<Module>,
    /// Indexed like the scanned files; `None` for unassigned files.
    pub file_module: Vec<Option<usize>>,
}

/// Barrel file of each directory: a file whose stem matches `pattern`,
/// preferring earlier configured extensions.
pub fn find_barrels(
    files: &[SourceFile],
    pattern: &str,
    extensions: &[String],
) -> HashMap<String, usize> {
    let rank = |file: &SourceFile| {
        let ext = file.relative.rsplit_once('.').map_or("", |(_, ext)| ext);
        extensions
            .iter()
            .position(|e| e == ext)
            .unwrap_or(extensions.len())
    };

    let mut barrels: HashMap<String, usize> = HashMap::new();
    for (idx, file) in files.iter().enumerate() {
        if !segment_match(pattern, file.stem()) {
            continue;
        }
        barrels
            .entry(file.dir().to_string())
            .and_modify(|current| {
                let better = (rank(file), &file.relative) < (rank(&files[*current]), &files[*current].relative);
                if better {
                    *current = idx;
                }
            })
            .or_insert(idx);
    }
    barrels
}

/// Group files into modules. Files outside every layer are left unassigned
/// and reported as warnings. A module directory nested inside another
/// module's directory is a configuration error.
pub fn build_modules(
    files: &[SourceFile],
    layer_map: &LayerMap,
    barrels: &HashMap<String, usize>,
    resolver: &SpecifierResolver<'_>,
) -> Result<(ModuleSet, Vec<Warning>), ConfigError> {
    let mut grouped: BTreeMap<String, Module> = BTreeMap::new();
    let mut assignments = Vec::with_capacity(files.len());
    let mut warnings = Vec::new();

    for (idx, file) in files.iter().enumerate() {
        match layer_map.assign(&file.relative)? {
            Some(assignment) => {
                grouped
                    .entry(assignment.module_id.clone())
                    .or_insert_with(|| Module::new(assignment.module_id.clone(), assignment.layer))
                    .files
                    .push(idx);
                assignments.push(Some(assignment.module_id));
            }
            None => {
                warnings.push(Warning::new(
                    WarningKind::Unassigned,
                    &file.relative,
                    "file matches no layer and is excluded from rule checks",
                ));
                assignments.push(None);
            }
        }
    }

    for inner in grouped.keys() {
        let mut ancestor = inner.as_str();
        while let Some((parent, _)) = ancestor.rsplit_once('/') {
            if grouped.contains_key(parent) {
                return Err(ConfigError::OverlappingModules {
                    outer: parent.to_string(),
                    inner: inner.clone(),
                });
            }
            ancestor = parent;
        }
    }

    let mut modules: Vec<Module> = grouped.into_values().collect();
    for module in &mut modules {
        module.barrel = barrels.get(&module.id).copied();
        module.surface = match module.barrel {
            Some(barrel) => public_surface(files, barrel, resolver),
            None => PublicSurface::default(),
        };
        tracing::debug!(
            module = %module.id,
            layer = %module.layer,
            files = module.files.len(),
            surface = module.surface.len(),
            "resolved module"
        );
    }

    let index: HashMap<&str, usize> = modules
        .iter()
        .enumerate()
        .map(|(idx, m)| (m.id.as_str(), idx))
        .collect();
    let file_module = assignments
        .iter()
        .map(|id| id.as_deref().and_then(|id| index.get(id).copied()))
        .collect();

    Ok((
        ModuleSet {
            modules,
            file_module,
        },
        warnings,
    ))
}

/// Names exported by a barrel, with `export * from` followed transitively.
pub fn public_surface(
    files: &[SourceFile],
    barrel: usize,
    resolver: &SpecifierResolver<'_>,
) -> PublicSurface {
    let mut symbols = BTreeSet::new();
    let mut visited = BTreeSet::new();
    collect_exports(files, barrel, true, resolver, &mut visited, &mut symbols);
    symbols.into_iter().collect()
}

fn collect_exports(
    files: &[SourceFile],
    idx: usize,
    is_barrel: bool,
    resolver: &SpecifierResolver<'_>,
    visited: &mut BTreeSet<usize>,
    symbols: &mut BTreeSet<String>,
) {
    if !visited.insert(idx) {
        return;
    }
    let file = &files[idx];
    // `export *` never forwards a default export
    symbols.extend(
        file.exports
            .iter()
            .filter(|name| is_barrel || name.as_str() != "default")
            .cloned(),
    );

    for import in file
        .imports
        .iter()
        .filter(|i| i.kind == ImportKind::StarReExport)
    {
        if let Resolution::File(target) = resolver.resolve(&file.relative, &import.specifier) {
            collect_exports(files, target, false, resolver, visited, symbols);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::Layer;
    use crate::parser::ParserRegistry;
    use crate::resolve::AliasTable;
    use std::path::{Path, PathBuf};

    fn parsed(entries: &[(&str, &str)]) -> Vec<SourceFile> {
        let registry = ParserRegistry::new();
        let mut files: Vec<SourceFile> = entries
            .iter()
            .map(|(path, text)| {
                let syntax = registry.parse(Path::new(path), text).unwrap_or_default();
                SourceFile::new(
                    PathBuf::from(format!("/p/{}", path)),
                    path.to_string(),
                    text.to_string(),
                    syntax,
                )
            })
            .collect();
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        files
    }

    fn exts() -> Vec<String> {
        Config::default().extensions
    }

    #[test]
    fn test_find_barrels_prefers_extension_order() {
        let files = parsed(&[
            ("src/modules/a/index.js", ""),
            ("src/modules/a/index.ts", ""),
            ("src/modules/a/index.test.ts", ""),
            ("src/modules/b/main.ts", ""),
        ]);
        let barrels = find_barrels(&files, "index", &exts());
        assert_eq!(barrels.len(), 1);
        assert_eq!(files[barrels["src/modules/a"]].relative, "src/modules/a/index.ts");
    }

    #[test]
    fn test_surface_expands_star_reexports() {
        let files = parsed(&[
            (
                "src/modules/cart/index.ts",
                "export { addItem } from './service';\nexport * from './hooks';\nexport default Cart;",
            ),
            (
                "src/modules/cart/hooks.ts",
                "export const useCart = 1;\nexport default 2;\nexport * from './more';\nexport * from './index';",
            ),
            ("src/modules/cart/more.ts", "export function useTotals() {}"),
            ("src/modules/cart/service.ts", "export function addItem() {}\nexport function internalHelper() {}"),
        ]);
        let barrels = find_barrels(&files, "index", &exts());
        let aliases = AliasTable::default();
        let exts = exts();
        let resolver = SpecifierResolver::new(&files, &barrels, &aliases, &exts);

        let surface = public_surface(&files, barrels["src/modules/cart"], &resolver);
        let names: Vec<_> = surface.iter().collect();
        assert_eq!(names, vec!["addItem", "default", "useCart", "useTotals"]);
        assert!(!surface.contains("internalHelper"));
    }

    #[test]
    fn test_build_modules() {
        let files = parsed(&[
            ("src/core/http.ts", "export const get = 1;"),
            ("src/main.ts", ""),
            ("src/modules/auth/index.ts", "export { login } from './login';"),
            ("src/modules/auth/login.ts", "export function login() {}"),
            ("src/modules/cart/view.ts", ""),
        ]);
        let config = Config::default();
        let barrels = find_barrels(&files, &config.barrel, &config.extensions);
        let aliases = AliasTable::default();
        let resolver = SpecifierResolver::new(&files, &barrels, &aliases, &config.extensions);

        let (set, warnings) =
            build_modules(&files, &LayerMap::from_config(&config), &barrels, &resolver).unwrap();

        let ids: Vec<_> = set.modules.iter().map(|m| (m.id.as_str(), m.layer)).collect();
        assert_eq!(
            ids,
            vec![
                ("src/core", Layer::Core),
                ("src/modules/auth", Layer::Feature),
                ("src/modules/cart", Layer::Feature),
            ]
        );
        assert_eq!(set.file_module, vec![Some(0), None, Some(1), Some(1), Some(2)]);

        let auth = &set.modules[1];
        assert_eq!(auth.name, "auth");
        assert_eq!(auth.files, vec![2, 3]);
        assert_eq!(auth.barrel, Some(2));
        assert!(auth.surface.contains("login"));

        let cart = &set.modules[2];
        assert_eq!(cart.barrel, None);
        assert!(cart.surface.is_empty());

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Unassigned);
        assert_eq!(warnings[0].path, "src/main.ts");
    }

    #[test]
    fn test_ambiguous_layers_fail() {
        let files = parsed(&[("src/modules/common/x.ts", "")]);
        let mut config = Config::default();
        config.layers[0].paths = vec!["src/modules/common".to_string()];
        let barrels = HashMap::new();
        let aliases = AliasTable::default();
        let resolver = SpecifierResolver::new(&files, &barrels, &aliases, &config.extensions);

        let result = build_modules(&files, &LayerMap::from_config(&config), &barrels, &resolver);
        assert!(matches!(result, Err(ConfigError::AmbiguousLayer { .. })));
    }

    #[test]
    fn test_nested_modules_fail() {
        let files = parsed(&[
            ("src/modules/cart/sub/x.ts", ""),
            ("src/modules/cart/y.ts", ""),
            ("src/modules/checkout/z.ts", ""),
        ]);
        let mut config = Config::default();
        let feature = config
            .layers
            .iter_mut()
            .find(|l| l.layer == Layer::Feature)
            .unwrap();
        feature.paths = vec!["src/modules/cart/sub".to_string(), "src/modules/*".to_string()];
        let barrels = HashMap::new();
        let aliases = AliasTable::default();
        let resolver = SpecifierResolver::new(&files, &barrels, &aliases, &config.extensions);

        let result = build_modules(&files, &LayerMap::from_config(&config), &barrels, &resolver);
        match result {
            Err(ConfigError::OverlappingModules { outer, inner }) => {
                assert_eq!(outer, "src/modules/cart");
                assert_eq!(inner, "src/modules/cart/sub");
            }
            other => panic!("expected overlapping modules, got {:?}", other.map(|(set, _)| set.modules.len())),
        }
    }
}
