#![forbid(unsafe_code)]

//! `dotcanvas` turns a laid-out DOT graph into a selectable vector scene.
//!
//! Layout results from [`dotlayout`] live in a bottom-left-origin point space. The canvas maps
//! them into a top-left-origin display space and keeps one item per node and edge, each with a
//! painted path, a hit-test outline and a bounding rectangle.
//!
//! ```
//! use dotcanvas::{Canvas, CanvasSettings};
//!
//! let mut canvas = Canvas::from_dot("digraph { a -> b }", CanvasSettings::default()).unwrap();
//! assert!(canvas.update_layout());
//! assert_eq!(canvas.nodes().len(), 2);
//! assert!(canvas.render_svg().starts_with("<svg"));
//! ```

pub mod canvas;
pub mod config;
pub mod edge;
pub mod error;
pub mod font;
pub mod geometry;
pub mod item;
pub mod label;
pub mod node;
pub mod paint;
pub mod shape;
pub mod style;
#[cfg(feature = "system-fonts")]
pub mod system_font;

pub use canvas::{Canvas, CanvasEvent, CanvasState, SubscriptionId};
pub use config::{CanvasSettings, NameValueList};
pub use edge::EdgeItem;
pub use error::{Error, Result};
pub use font::{DeterministicFontMetrics, DisplayDevice, FixedDpi, Font, FontMetrics};
pub use item::{ColorizeEffect, ItemId};
pub use label::{LabelLayout, TextRun, VAlign};
pub use node::NodeItem;
pub use paint::{Painter, SvgPainter};
pub use shape::{ShapeFamily, classify};
pub use style::{Color, Dash, Pen, StyleFlag, StyleSet};
#[cfg(feature = "system-fonts")]
pub use system_font::SystemFontMetrics;
