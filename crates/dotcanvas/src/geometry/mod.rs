//! Layout-to-geometry translation.

pub mod edge;
pub mod node;
pub mod transform;

pub use edge::{arrow_path, create_normal_arrow, spline_path};
pub use node::{node_path, polygon_rings};
pub use transform::{graph_height, scene_rect, to_display};
