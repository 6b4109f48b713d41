//! Canvas rasterization of the bound scene.
//!
//! [`CanvasScene`] is the retained half of the render contract: the binder
//! inserts, updates, and removes keyed shapes, and `draw` rasterizes the
//! current set each frame in passes (background, then edges with arrowheads,
//! then nodes) under the view transform.

use std::collections::HashMap;

use web_sys::CanvasRenderingContext2d;

use super::binder::{EdgeVisual, NodeVisual, RenderBackend};
use super::controller::ViewTransform;
use super::geometry::EdgePath;
use super::theme::Theme;
use super::types::{EdgeKey, Vec2};

/// Arrowhead length in world units.
const ARROW_SIZE: f64 = 10.0;
/// Stroke width of the selection ring.
const RING_WIDTH: f64 = 3.0;

/// Retained shape list keyed the same way the binder keys the store.
#[derive(Debug, Default)]
pub struct CanvasScene {
	nodes: HashMap<String, NodeVisual>,
	edges: HashMap<EdgeKey, EdgeVisual>,
	transform: ViewTransform,
}

impl CanvasScene {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rasterize the scene.
	pub fn draw(&self, ctx: &CanvasRenderingContext2d, width: f64, height: f64, theme: &Theme) {
		draw_background(ctx, width, height, theme);

		ctx.save();
		let _ = ctx.translate(self.transform.x, self.transform.y);
		let _ = ctx.scale(self.transform.k, self.transform.k);

		for visual in self.edges.values() {
			draw_edge(ctx, visual, theme);
		}
		for visual in self.nodes.values() {
			draw_node(ctx, visual, theme);
		}

		ctx.restore();
	}
}

impl RenderBackend for CanvasScene {
	fn insert_node(&mut self, id: &str, visual: &NodeVisual, _transform: &ViewTransform) {
		// The group transform is applied at draw time, so entering shapes
		// never flash untransformed.
		self.nodes.insert(id.to_string(), *visual);
	}

	fn update_node(&mut self, id: &str, visual: &NodeVisual) {
		self.nodes.insert(id.to_string(), *visual);
	}

	fn remove_node(&mut self, id: &str) {
		self.nodes.remove(id);
	}

	fn insert_edge(&mut self, key: &EdgeKey, visual: &EdgeVisual, _transform: &ViewTransform) {
		self.edges.insert(key.clone(), *visual);
	}

	fn update_edge(&mut self, key: &EdgeKey, visual: &EdgeVisual) {
		self.edges.insert(key.clone(), *visual);
	}

	fn remove_edge(&mut self, key: &EdgeKey) {
		self.edges.remove(key);
	}

	fn set_transform(&mut self, transform: &ViewTransform) {
		self.transform = *transform;
	}
}

fn draw_background(ctx: &CanvasRenderingContext2d, width: f64, height: f64, theme: &Theme) {
	if let Ok(gradient) = ctx.create_radial_gradient(
		width / 2.0,
		height / 2.0,
		0.0,
		width / 2.0,
		height / 2.0,
		width.max(height) * 0.8,
	) {
		let _ = gradient.add_color_stop(0.0, &theme.background_secondary.to_css());
		let _ = gradient.add_color_stop(1.0, &theme.background.to_css());
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.to_css());
	}
	ctx.fill_rect(0.0, 0.0, width, height);
}

fn draw_edge(ctx: &CanvasRenderingContext2d, visual: &EdgeVisual, theme: &Theme) {
	ctx.set_stroke_style_str(&theme.edge.to_css());
	ctx.set_line_width(visual.width);

	match visual.path {
		EdgePath::Empty => {}
		EdgePath::Line { from, to } => {
			ctx.begin_path();
			ctx.move_to(from.x, from.y);
			ctx.line_to(to.x, to.y);
			ctx.stroke();
			let d = to - from;
			let len = d.length();
			if len > 1e-9 {
				draw_arrowhead(ctx, to, d * (1.0 / len), theme);
			}
		}
		EdgePath::Arc {
			from,
			to,
			radius,
			center,
		} => {
			let a0 = (from.y - center.y).atan2(from.x - center.x);
			let a1 = (to.y - center.y).atan2(to.x - center.x);
			ctx.begin_path();
			let _ = ctx.arc(center.x, center.y, radius, a0, a1);
			ctx.stroke();
			// Tangent at the head, along the clockwise sweep.
			let r = to - center;
			let len = r.length();
			if len > 1e-9 {
				draw_arrowhead(ctx, to, Vec2::new(-r.y / len, r.x / len), theme);
			}
		}
	}
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip: Vec2, dir: Vec2, theme: &Theme) {
	let base = tip - dir * ARROW_SIZE;
	let side = Vec2::new(-dir.y, dir.x) * (ARROW_SIZE / 2.0);
	ctx.set_fill_style_str(&theme.edge.to_css());
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(base.x + side.x, base.y + side.y);
	ctx.line_to(base.x - side.x, base.y - side.y);
	ctx.close_path();
	ctx.fill();
}

fn draw_node(ctx: &CanvasRenderingContext2d, visual: &NodeVisual, theme: &Theme) {
	ctx.set_fill_style_str(&visual.fill.to_css());
	ctx.begin_path();
	let _ = ctx.arc(
		visual.position.x,
		visual.position.y,
		visual.radius,
		0.0,
		std::f64::consts::PI * 2.0,
	);
	ctx.fill();

	if visual.selected {
		ctx.set_stroke_style_str(&theme.selected_ring.to_css());
		ctx.set_line_width(RING_WIDTH);
		ctx.begin_path();
		let _ = ctx.arc(
			visual.position.x,
			visual.position.y,
			visual.radius,
			0.0,
			std::f64::consts::PI * 2.0,
		);
		ctx.stroke();
	}
}
