use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Architectural layer, ordered from the bottom of the stack to the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Shared,
    Core,
    Feature,
    Route,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Shared, Layer::Core, Layer::Feature, Layer::Route];

    pub fn name(self) -> &'static str {
        match self {
            Layer::Shared => "shared",
            Layer::Core => "core",
            Layer::Feature => "feature",
            Layer::Route => "route",
        }
    }

    /// Layers this layer may import from when the config does not say otherwise.
    ///
    /// Routes are a terminal sink: nothing imports them, including other routes.
    pub fn default_may_import(self) -> &'static [Layer] {
        match self {
            Layer::Shared => &[],
            Layer::Core => &[Layer::Shared],
            Layer::Feature => &[Layer::Shared, Layer::Core, Layer::Feature],
            Layer::Route => &[Layer::Shared, Layer::Core, Layer::Feature],
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared" => Ok(Layer::Shared),
            "core" => Ok(Layer::Core),
            "feature" | "features" | "modules" => Ok(Layer::Feature),
            "route" | "routes" => Ok(Layer::Route),
            _ => Err(format!("Unknown layer: {}", s)),
        }
    }
}

/// A logical unit of the architecture, rooted at one directory.
#[derive(Debug, Clone)]
pub struct Module {
    /// Root-relative directory, unique across modules (e.g. `src/modules/auth`).
    pub id: String,
    /// Last segment of the directory.
    pub name: String,
    pub layer: Layer,
    /// Indices into the scanned file list, in path order.
    pub files: Vec<usize>,
    /// Index of the barrel file, if the module declares one.
    pub barrel: Option<usize>,
    pub surface: PublicSurface,
}

impl Module {
    pub fn new(id: String, layer: Layer) -> Self {
        let name = id.rsplit('/').next().unwrap_or(&id).to_string();
        Self {
            id,
            name,
            layer,
            files: Vec::new(),
            barrel: None,
            surface: PublicSurface::default(),
        }
    }
}

/// Symbol names re-exported from a module's barrel file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublicSurface {
    symbols: BTreeSet<String>,
}

impl PublicSurface {
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}

impl FromIterator<String> for PublicSurface {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}
