mod data;

pub use data::{GraphData, GraphExternal, GraphLink, GraphMetadata, GraphNode};
