//! Interactive force-directed graph with click-to-grow editing.
//!
//! Renders a node-link graph on an HTML canvas with:
//! - Physics-based layout: charge repulsion, edge springs, centering, and
//!   alpha cooling that settles to an idle state
//! - Click a node to grow a new linked node from it; bidirectional pairs
//!   render as separated arcs
//! - Node dragging (with position pinning), panning, zooming, and an eased
//!   reset-view action
//!
//! The pure core (store, simulator, controller, geometry, binder) is
//! headless and fully testable; the canvas and leptos layers are thin
//! adapters over it.
//!
//! # Example
//!
//! ```ignore
//! use sprout_graph::{SproutGraphCanvas, GraphData};
//!
//! let data = GraphData::seed();
//! view! { <SproutGraphCanvas data=data.into() fullscreen=true /> }
//! ```

pub mod binder;
mod component;
pub mod controller;
pub mod geometry;
mod render;
pub mod simulation;
pub mod state;
pub mod store;
pub mod theme;
mod types;

pub use component::SproutGraphCanvas;
pub use controller::{GrowthPolicy, InteractionConfig, ViewTransform};
pub use simulation::SimulationConfig;
pub use state::GraphSession;
pub use store::{GraphError, GraphStore};
pub use theme::Theme;
pub use types::{EdgeKey, GraphData, GraphLink, GraphNode, Vec2};
