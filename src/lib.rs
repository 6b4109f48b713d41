//! sprout-graph: an interactive, growable force-directed node-link graph.
//!
//! This crate provides a WASM graph playground component: a physics-based
//! layout that continuously relaxes while the user drags nodes, pans and
//! zooms the canvas, and clicks nodes to grow the graph. The layout engine,
//! graph store, and interaction protocol are plain Rust and usable headless;
//! the leptos/canvas layer is a thin shell over them.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	GraphData, GraphLink, GraphNode, GraphSession, SproutGraphCanvas,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("sprout-graph: logging initialized");
}

/// Load seed graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(data) => {
			info!(
				"sprout-graph: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("sprout-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads seed data from the DOM (falling back to the built-in two-node
/// seed) and renders the interactive graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_else(GraphData::seed);
	let graph_signal = Signal::derive(move || graph_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Graph Playground" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<SproutGraphCanvas data=graph_signal fullscreen=true />
			<div class="graph-overlay">
				<h1>"Graph Playground"</h1>
				<p class="subtitle">
					"Click a node to grow the graph. Drag nodes to reposition. Scroll to zoom. Drag the background to pan."
				</p>
			</div>
		</div>
	}
}
