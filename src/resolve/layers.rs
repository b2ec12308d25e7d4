use crate::config::{Config, ConfigError};
use crate::glob::segment_match;
use crate::model::Layer;

/// One path pattern owned by a layer, e.g. `src/modules/*` for features.
#[derive(Debug, Clone)]
pub struct LayerRule {
    pub layer: Layer,
    pub pattern: String,
    segments: Vec<String>,
}

/// Where a file landed: its layer and the id of the module that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub layer: Layer,
    pub module_id: String,
}

/// Ordered path-prefix rules mapping files to layers and modules.
#[derive(Debug, Clone)]
pub struct LayerMap {
    rules: Vec<LayerRule>,
}

impl LayerRule {
    pub fn new(layer: Layer, pattern: &str) -> Self {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        Self {
            layer,
            pattern: pattern.to_string(),
            segments: pattern.split('/').map(str::to_string).collect(),
        }
    }

    /// The matched module directory, if the file lies strictly inside it.
    fn module_dir(&self, segments: &[&str]) -> Option<String> {
        if segments.len() <= self.segments.len() {
            return None;
        }
        let matched = self
            .segments
            .iter()
            .zip(segments)
            .all(|(pattern, segment)| segment_match(pattern, segment));
        matched.then(|| segments[..self.segments.len()].join("/"))
    }
}

impl LayerMap {
    pub fn new(rules: Vec<LayerRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &Config) -> Self {
        let rules = config
            .layers
            .iter()
            .flat_map(|l| l.paths.iter().map(|p| LayerRule::new(l.layer, p)))
            .collect();
        Self::new(rules)
    }

    /// Assign a root-relative file path.
    ///
    /// Returns `Ok(None)` for files outside every layer. Matching rules of two
    /// different layers is a configuration error; within one layer the first
    /// matching rule wins.
    pub fn assign(&self, relative: &str) -> Result<Option<Assignment>, ConfigError> {
        let segments: Vec<&str> = relative.split('/').collect();
        let mut found: Option<(&LayerRule, String)> = None;

        for rule in &self.rules {
            let Some(module_id) = rule.module_dir(&segments) else {
                continue;
            };
            match &found {
                None => found = Some((rule, module_id)),
                Some((first, _)) if first.layer != rule.layer => {
                    return Err(ConfigError::AmbiguousLayer {
                        path: relative.to_string(),
                        first: first.layer,
                        first_pattern: first.pattern.clone(),
                        second: rule.layer,
                        second_pattern: rule.pattern.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(found.map(|(rule, module_id)| Assignment {
            layer: rule.layer,
            module_id,
        }))
    }
}
