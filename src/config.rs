use crate::fs::FileSystem;
use crate::model::{Layer, Severity, ViolationKind};
use crate::parser::DEFAULT_EXTENSIONS;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = ".layerlint.toml";

pub const DEFAULT_IGNORE_DIRS: &[&str] = &["node_modules", "dist", "build", "coverage", ".git"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Unknown layer `{0}` (expected shared, core, feature or route)")]
    UnknownLayer(String),
    #[error("Invalid path `{prefix}` for layer {layer}: {reason}")]
    InvalidLayerPath {
        layer: Layer,
        prefix: String,
        reason: &'static str,
    },
    #[error("The shared layer may not import other layers (found {0})")]
    SharedImports(String),
    #[error("Invalid alias `{key}` = `{target}`: {reason}")]
    InvalidAlias {
        key: String,
        target: String,
        reason: &'static str,
    },
    #[error("Alias `{key}` points at `{target}`, which does not exist under the project root")]
    MissingAliasTarget { key: String, target: String },
    #[error("Invalid --alias `{0}` (expected KEY=VALUE)")]
    InvalidAliasFlag(String),
    #[error("Invalid glob `{pattern}`: {reason}")]
    InvalidGlob {
        pattern: String,
        reason: &'static str,
    },
    #[error("Unknown severity `{0}` (expected info, warning or error)")]
    UnknownSeverity(String),
    #[error("Invalid barrel pattern `{0}`: must be a non-empty file stem without `/`")]
    InvalidBarrel(String),
    #[error("No source file extensions configured")]
    NoExtensions,
    #[error(
        "`{path}` matches both the {first} layer (`{first_pattern}`) and the {second} layer (`{second_pattern}`)"
    )]
    AmbiguousLayer {
        path: String,
        first: Layer,
        first_pattern: String,
        second: Layer,
        second_pattern: String,
    },
    #[error("Module `{inner}` is nested inside module `{outer}`; layer paths must not overlap")]
    OverlappingModules { outer: String, inner: String },
}

/// Resolved configuration for one run. Built once, then passed by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Barrel file stem; may contain `*`.
    pub barrel: String,
    pub extensions: Vec<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub ignore_dirs: Vec<String>,
    /// One entry per layer, bottom of the stack first.
    pub layers: Vec<LayerConfig>,
    /// Alias key to root-relative target, e.g. `@/*` to `src/*`.
    pub aliases: BTreeMap<String, String>,
    pub severity: SeverityConfig,
    pub fail_on: Severity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub layer: Layer,
    pub paths: Vec<String>,
    pub may_import: Vec<Layer>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityConfig {
    pub layer_direction: Severity,
    pub deep_import: Severity,
    pub cycle: Severity,
}

/// Values given on the command line, applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// `KEY=VALUE` pairs.
    pub aliases: Vec<String>,
    pub barrel: Option<String>,
    pub fail_on: Option<Severity>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    barrel: Option<String>,
    extensions: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    ignore_dirs: Option<Vec<String>>,
    layers: Option<BTreeMap<String, RawLayer>>,
    aliases: Option<BTreeMap<String, String>>,
    severity: Option<RawSeverity>,
    fail_on: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    paths: Option<Vec<String>>,
    may_import: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawSeverity {
    layer_direction: Option<String>,
    deep_import: Option<String>,
    cycle: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            barrel: "index".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include: Vec::new(),
            exclude: Vec::new(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            layers: Layer::ALL
                .iter()
                .map(|&layer| LayerConfig::default_for(layer))
                .collect(),
            aliases: BTreeMap::new(),
            severity: SeverityConfig::default(),
            fail_on: Severity::Error,
        }
    }
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            layer_direction: Severity::Error,
            deep_import: Severity::Error,
            cycle: Severity::Error,
        }
    }
}

impl SeverityConfig {
    pub fn of(&self, kind: ViolationKind) -> Severity {
        match kind {
            ViolationKind::LayerDirection => self.layer_direction,
            ViolationKind::DeepImport => self.deep_import,
            ViolationKind::Cycle => self.cycle,
        }
    }
}

impl LayerConfig {
    pub fn default_for(layer: Layer) -> Self {
        let paths: &[&str] = match layer {
            Layer::Shared => &["shared", "src/shared"],
            Layer::Core => &["core", "src/core"],
            Layer::Feature => &["modules/*", "src/modules/*"],
            Layer::Route => &["routes", "src/routes"],
        };
        Self {
            layer,
            paths: paths.iter().map(|p| p.to_string()).collect(),
            may_import: layer.default_may_import().to_vec(),
        }
    }
}

fn parse_severity(value: &str) -> Result<Severity, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::UnknownSeverity(value.to_string()))
}

fn parse_layer(value: &str) -> Result<Layer, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::UnknownLayer(value.to_string()))
}

/// Aliases used when the config file declares none: `@/*` maps to `src/*`
/// when the project has a `src` directory, otherwise to the root.
pub fn default_aliases(fs: &dyn FileSystem, root: &Path) -> BTreeMap<String, String> {
    let target = if fs.exists(&root.join("src")) {
        "src/*"
    } else {
        "*"
    };
    BTreeMap::from([("@/*".to_string(), target.to_string())])
}

impl Config {
    /// Load from `explicit` if given (which must exist), otherwise from the
    /// default location under `root`. The result is not yet validated.
    pub fn load_with(
        fs: &dyn FileSystem,
        root: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let config_path = match explicit {
            Some(path) if !fs.exists(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => root.join(CONFIG_FILE),
        };

        if !fs.exists(&config_path) {
            tracing::debug!(root = %root.display(), "no config file, using defaults");
            return Ok(Self {
                aliases: default_aliases(fs, root),
                ..Self::default()
            });
        }

        let content = fs
            .read_to_string(&config_path)
            .map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;
        tracing::debug!(path = %config_path.display(), "loaded config file");

        let mut config = Self::from_toml(&content)?;
        if config.aliases.is_empty() {
            config.aliases = default_aliases(fs, root);
        }
        Ok(config)
    }

    /// Parse TOML text. Missing keys take their defaults; an absent `[aliases]`
    /// table leaves `aliases` empty.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let mut layers = defaults.layers;
        for (name, raw_layer) in raw.layers.unwrap_or_default() {
            let layer = parse_layer(&name)?;
            let Some(entry) = layers.iter_mut().find(|l| l.layer == layer) else {
                continue;
            };
            if let Some(paths) = raw_layer.paths {
                entry.paths = paths;
            }
            if let Some(may_import) = raw_layer.may_import {
                entry.may_import = may_import
                    .iter()
                    .map(|n| parse_layer(n))
                    .collect::<Result<_, _>>()?;
            }
        }

        let severity = match raw.severity {
            Some(s) => SeverityConfig {
                layer_direction: s
                    .layer_direction
                    .as_deref()
                    .map(parse_severity)
                    .transpose()?
                    .unwrap_or(Severity::Error),
                deep_import: s
                    .deep_import
                    .as_deref()
                    .map(parse_severity)
                    .transpose()?
                    .unwrap_or(Severity::Error),
                cycle: s
                    .cycle
                    .as_deref()
                    .map(parse_severity)
                    .transpose()?
                    .unwrap_or(Severity::Error),
            },
            None => SeverityConfig::default(),
        };

        Ok(Self {
            barrel: raw.barrel.unwrap_or(defaults.barrel),
            extensions: raw
                .extensions
                .map(|exts| normalize_extensions(&exts))
                .unwrap_or(defaults.extensions),
            include: raw.include.unwrap_or_default(),
            exclude: raw.exclude.unwrap_or_default(),
            ignore_dirs: raw.ignore_dirs.unwrap_or(defaults.ignore_dirs),
            layers,
            aliases: raw.aliases.unwrap_or_default(),
            severity,
            fail_on: raw
                .fail_on
                .as_deref()
                .map(parse_severity)
                .transpose()?
                .unwrap_or(Severity::Error),
        })
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        self.include.extend(overrides.include.iter().cloned());
        self.exclude.extend(overrides.exclude.iter().cloned());
        for pair in &overrides.aliases {
            let (key, value) = pair
                .split_once('=')
                .filter(|(k, v)| !k.trim().is_empty() && !v.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidAliasFlag(pair.clone()))?;
            self.aliases
                .insert(key.trim().to_string(), value.trim().to_string());
        }
        if let Some(barrel) = &overrides.barrel {
            self.barrel = barrel.clone();
        }
        if let Some(fail_on) = overrides.fail_on {
            self.fail_on = fail_on;
        }
        Ok(())
    }

    pub fn layer(&self, layer: Layer) -> Option<&LayerConfig> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    /// Whether an edge from `from` into `to` is allowed by the layer rules.
    pub fn may_import(&self, from: Layer, to: Layer) -> bool {
        self.layer(from)
            .map(|l| l.may_import.contains(&to))
            .unwrap_or_else(|| from.default_may_import().contains(&to))
    }

    /// Check everything that can be checked before a scan. Any error here
    /// aborts the run.
    pub fn validate(&self, fs: &dyn FileSystem, root: &Path) -> Result<(), ConfigError> {
        if self.barrel.trim().is_empty() || self.barrel.contains('/') || self.barrel.contains('\\')
        {
            return Err(ConfigError::InvalidBarrel(self.barrel.clone()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }

        for pattern in self.include.iter().chain(&self.exclude) {
            validate_glob(pattern)?;
        }

        for layer in &self.layers {
            for prefix in &layer.paths {
                validate_layer_path(layer.layer, prefix)?;
            }
            if layer.layer == Layer::Shared && !layer.may_import.is_empty() {
                let names: Vec<_> = layer.may_import.iter().map(|l| l.name()).collect();
                return Err(ConfigError::SharedImports(names.join(", ")));
            }
        }

        for (key, target) in &self.aliases {
            validate_alias(fs, root, key, target)?;
        }
        Ok(())
    }
}

/// Lowercase, strip leading dots and drop blanks and repeats, keeping order.
fn normalize_extensions(raw: &[String]) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::with_capacity(raw.len());
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if !ext.is_empty() && !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}

fn validate_glob(pattern: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidGlob {
        pattern: pattern.to_string(),
        reason,
    };
    if pattern.trim().is_empty() {
        return Err(invalid("pattern is empty"));
    }
    if pattern.contains("***") {
        return Err(invalid("`***` is not a valid wildcard"));
    }
    if pattern.contains(['[', ']', '{', '}']) {
        return Err(invalid("only `*`, `**` and `?` are supported"));
    }
    if Path::new(pattern).is_absolute() {
        return Err(invalid("patterns are relative to the project root"));
    }
    Ok(())
}

fn validate_layer_path(layer: Layer, prefix: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidLayerPath {
        layer,
        prefix: prefix.to_string(),
        reason,
    };
    let trimmed = prefix.trim_start_matches("./").trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("path is empty"));
    }
    if Path::new(trimmed).is_absolute() || trimmed.starts_with('/') {
        return Err(invalid("path must be relative to the project root"));
    }
    for segment in trimmed.split('/') {
        match segment {
            "" => return Err(invalid("path contains an empty segment")),
            ".." | "." => return Err(invalid("path may not contain `.` or `..` segments")),
            s if s.contains("**") => {
                return Err(invalid("`**` is not allowed; use `*` for one module per directory"));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_alias(
    fs: &dyn FileSystem,
    root: &Path,
    key: &str,
    target: &str,
) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidAlias {
        key: key.to_string(),
        target: target.to_string(),
        reason,
    };

    if key.is_empty() || target.is_empty() {
        return Err(invalid("alias key and target must be non-empty"));
    }
    let key_stars = key.matches('*').count();
    let target_stars = target.matches('*').count();
    if key_stars > 1 || target_stars > 1 {
        return Err(invalid("at most one `*` is allowed"));
    }
    if key_stars != target_stars {
        return Err(invalid("key and target must both use `*` or neither"));
    }
    if key_stars == 1 && (!key.ends_with('*') || !target.ends_with('*')) {
        return Err(invalid("`*` must be the last character"));
    }

    let base = target.trim_end_matches('*').trim_end_matches('/');
    let base_path = Path::new(base);
    if base_path.is_absolute() {
        return Err(invalid("target must be relative to the project root"));
    }
    let cleaned = path_clean::clean(base_path);
    if cleaned.components().next() == Some(Component::ParentDir) {
        return Err(invalid("target escapes the project root"));
    }

    if !base.is_empty() && !fs.exists(&root.join(&cleaned)) {
        return Err(ConfigError::MissingAliasTarget {
            key: key.to_string(),
            target: target.to_string(),
        });
    }
    Ok(())
}

/// Starter config written by `layerlint init`.
pub fn generate_config_template() -> String {
    r#"# layerlint configuration
#
# Layers, bottom of the stack first. Each layer lists the directories it owns
# and the layers it may import from. A `*` segment makes one module per
# directory (e.g. every folder under src/modules is its own feature module).

# Barrel file stem whose exports form a feature module's public surface.
barrel = "index"

extensions = ["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"]
include = []
exclude = ["**/*.test.ts", "**/*.spec.ts", "**/__tests__/**"]
ignore_dirs = ["node_modules", "dist", "build", "coverage", ".git"]

# Severity at or above which the run fails: info, warning or error.
fail_on = "error"

[layers.shared]
paths = ["src/shared"]
may_import = []

[layers.core]
paths = ["src/core"]
may_import = ["shared"]

[layers.feature]
paths = ["src/modules/*"]
may_import = ["shared", "core", "feature"]

[layers.route]
paths = ["src/routes"]
may_import = ["shared", "core", "feature"]

[aliases]
"@/*" = "src/*"

[severity]
layer_direction = "error"
deep_import = "error"
cycle = "error"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;

    fn project() -> MockFs {
        MockFs::with_files([
            ("/p/src/modules/cart/index.ts", ""),
            ("/p/src/shared/util.ts", ""),
        ])
    }

    #[test]
    fn test_defaults_without_config_file() {
        let fs = project();
        let config = Config::load_with(&fs, Path::new("/p"), None).unwrap();
        assert_eq!(config.barrel, "index");
        assert_eq!(config.aliases.get("@/*").map(String::as_str), Some("src/*"));
        assert!(config.may_import(Layer::Feature, Layer::Feature));
        assert!(!config.may_import(Layer::Core, Layer::Feature));
        assert!(!config.may_import(Layer::Feature, Layer::Route));
        config.validate(&fs, Path::new("/p")).unwrap();
    }

    #[test]
    fn test_default_alias_without_src_dir() {
        let fs = MockFs::with_files([("/p/modules/a/index.ts", "")]);
        let config = Config::load_with(&fs, Path::new("/p"), None).unwrap();
        assert_eq!(config.aliases.get("@/*").map(String::as_str), Some("*"));
        config.validate(&fs, Path::new("/p")).unwrap();
    }

    #[test]
    fn test_load_file_values() {
        let fs = project();
        fs.write(
            Path::new("/p/.layerlint.toml"),
            r#"
barrel = "public"
exclude = ["**/*.test.ts"]
fail_on = "warn"

[layers.feature]
paths = ["src/features/*"]

[layers.core]
may_import = []

[aliases]
"~/*" = "src/*"

[severity]
deep_import = "warning"
"#,
        )
        .unwrap();

        let config = Config::load_with(&fs, Path::new("/p"), None).unwrap();
        assert_eq!(config.barrel, "public");
        assert_eq!(config.fail_on, Severity::Warning);
        assert_eq!(config.layer(Layer::Feature).unwrap().paths, vec!["src/features/*"]);
        assert!(!config.may_import(Layer::Core, Layer::Shared));
        assert_eq!(config.severity.of(ViolationKind::DeepImport), Severity::Warning);
        assert_eq!(config.severity.of(ViolationKind::Cycle), Severity::Error);
        assert_eq!(config.aliases.len(), 1);
        assert!(config.aliases.contains_key("~/*"));
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = Config::from_toml("extensions = [\".TS\", \"tsx\", \" .ts \", \".\"]").unwrap();
        assert_eq!(config.extensions, vec!["ts", "tsx"]);

        let config = Config::from_toml("extensions = [\"\"]").unwrap();
        assert!(matches!(
            config.validate(&project(), Path::new("/p")),
            Err(ConfigError::NoExtensions)
        ));
    }

    #[test]
    fn test_validate_globs() {
        let fs = project();
        let root = Path::new("/p");
        let check = |pattern: &str| {
            let mut config = Config::default();
            config.exclude = vec![pattern.to_string()];
            config.validate(&fs, root)
        };

        assert!(check("**/*.test.ts").is_ok());
        assert!(check("src/?/x.ts").is_ok());
        for bad in ["", "src/***", "/abs/**", "src/[ab].ts", "src/*.{ts,tsx}"] {
            assert!(
                matches!(check(bad), Err(ConfigError::InvalidGlob { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let fs = project();
        let err = Config::load_with(&fs, Path::new("/p"), Some(Path::new("/p/other.toml")));
        assert!(matches!(err, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_rejects_unknown_names() {
        assert!(matches!(
            Config::from_toml("[layers.services]\npaths = [\"src/services\"]"),
            Err(ConfigError::UnknownLayer(name)) if name == "services"
        ));
        assert!(matches!(
            Config::from_toml("[severity]\ncycle = \"fatal\""),
            Err(ConfigError::UnknownSeverity(_))
        ));
        assert!(matches!(
            Config::from_toml("barrel = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_layer_paths() {
        let fs = project();
        let root = Path::new("/p");
        for bad in ["", "/abs/shared", "../outside", "src/**", "src//x"] {
            let mut config = Config::default();
            config.layers[0].paths = vec![bad.to_string()];
            assert!(
                matches!(
                    config.validate(&fs, root),
                    Err(ConfigError::InvalidLayerPath { .. })
                ),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_shared_may_not_import() {
        let mut config = Config::default();
        config.layers[0].may_import = vec![Layer::Core];
        assert!(matches!(
            config.validate(&project(), Path::new("/p")),
            Err(ConfigError::SharedImports(_))
        ));
    }

    #[test]
    fn test_validate_aliases() {
        let fs = project();
        let root = Path::new("/p");
        let check = |key: &str, target: &str| {
            let mut config = Config::default();
            config.aliases.insert(key.to_string(), target.to_string());
            config.validate(&fs, root)
        };

        assert!(check("@/*", "src/*").is_ok());
        assert!(check("@cart", "src/modules/cart").is_ok());
        assert!(matches!(check("@/*/*", "src/*/*"), Err(ConfigError::InvalidAlias { .. })));
        assert!(matches!(check("@/*", "src"), Err(ConfigError::InvalidAlias { .. })));
        assert!(matches!(check("@/*x", "src/*x"), Err(ConfigError::InvalidAlias { .. })));
        assert!(matches!(check("@/*", "/abs/*"), Err(ConfigError::InvalidAlias { .. })));
        assert!(matches!(check("@/*", "../up/*"), Err(ConfigError::InvalidAlias { .. })));
        assert!(matches!(
            check("@lib/*", "lib/*"),
            Err(ConfigError::MissingAliasTarget { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(&ConfigOverrides {
                include: vec!["src/**".to_string()],
                aliases: vec!["#/*=src/*".to_string()],
                barrel: Some("mod".to_string()),
                fail_on: Some(Severity::Warning),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.include, vec!["src/**"]);
        assert_eq!(config.aliases.get("#/*").map(String::as_str), Some("src/*"));
        assert_eq!(config.barrel, "mod");
        assert_eq!(config.fail_on, Severity::Warning);

        let err = config.apply_overrides(&ConfigOverrides {
            aliases: vec!["missing-equals".to_string()],
            ..Default::default()
        });
        assert!(matches!(err, Err(ConfigError::InvalidAliasFlag(_))));
    }

    #[test]
    fn test_template_parses_and_validates() {
        let config = Config::from_toml(&generate_config_template()).unwrap();
        assert_eq!(config.layers.len(), 4);
        config.validate(&project(), Path::new("/p")).unwrap();
    }
}
