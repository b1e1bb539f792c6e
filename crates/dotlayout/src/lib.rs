#![forbid(unsafe_code)]

//! `dotlayout` reads DOT graphs into an attributed in-memory [`Graph`] and lays them out with a
//! layered (`"dot"`) engine.
//!
//! Layout results follow the Graphviz output conventions: coordinates in points, origin at the
//! bottom-left corner, node shapes as polygon vertex rings relative to the node center, edges as
//! piecewise cubic Bézier splines with optional arrow endpoints.
//!
//! ```
//! use dotlayout::{Context, parse};
//!
//! let mut graph = parse("digraph { a -> b }").unwrap();
//! Context::new().layout(&mut graph, "dot").unwrap();
//! assert!(graph.bounding_box().height() > 0.0);
//! ```

pub mod attr;
pub mod error;
pub mod geom;
pub mod graph;
mod layout;
pub mod model;
pub mod parse;
pub mod shapes;
pub mod text;

pub use attr::{AttrDefaults, AttrKind, AttrValues};
pub use error::{Error, Result};
pub use geom::{BoundingBox, LayoutSpace, Point, Size};
pub use graph::{EdgeId, Graph, NodeId};
pub use model::{
    Bezier, EdgeLayout, GraphLayout, NodeLayout, Polygon, RecordField, ShapeInfo, TextLabel,
};
pub use parse::parse;
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};

use std::sync::Arc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Layout engines known to [`Context::layout`].
pub const ENGINES: &[&str] = &["dot"];

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions").finish_non_exhaustive()
    }
}

/// Layout session. Holds the options shared by every layout run.
#[derive(Debug, Clone, Default)]
pub struct Context {
    options: LayoutOptions,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lays `graph` out with the named engine and stores the results on it, replacing any
    /// previous layout.
    pub fn layout(&self, graph: &mut Graph, engine: &str) -> Result<()> {
        match engine {
            "dot" => {
                layout::dot_layout(graph, self.options.text_measurer.as_ref());
                Ok(())
            }
            other => Err(Error::UnknownLayoutEngine {
                name: other.to_string(),
            }),
        }
    }
}
