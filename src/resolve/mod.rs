//! Module resolution: which layer and module every file belongs to, what each
//! feature module exposes, and where import specifiers point.

mod alias;
mod layers;
mod modules;

pub use alias::{AliasTable, Resolution, SpecifierResolver};
pub use layers::{Assignment, LayerMap, LayerRule};
pub use modules::{ModuleSet, build_modules, find_barrels, public_surface};
