//! The owning session context for one graph view.
//!
//! Bundles the store, simulator, controller, binder, and view transform into
//! a single object created when the component mounts and mutated each frame
//! by the animation loop. Everything flows through the session rather than
//! module-level state, so multiple independent views can coexist and the
//! whole interaction protocol is testable headlessly.

use std::f64::consts::PI;

use log::{info, warn};

use super::binder::{RenderBackend, RenderBinder};
use super::controller::{GrowthPolicy, InteractionConfig, InteractionController, ViewTransform};
use super::simulation::{ForceSimulator, Phase, SimulationConfig};
use super::store::{GraphError, GraphStore};
use super::theme::Theme;
use super::types::{GraphData, Vec2};

/// In-flight reset-view animation: eases the transform back to identity.
#[derive(Clone, Debug)]
struct ResetAnimation {
	from: ViewTransform,
	elapsed: f64,
	duration: f64,
}

/// Cubic in-out easing on [0, 1].
fn ease_cubic(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		let u = -2.0 * t + 2.0;
		1.0 - u * u * u / 2.0
	}
}

/// Core state for one interactive graph view.
pub struct GraphSession {
	pub store: GraphStore,
	pub simulator: ForceSimulator,
	pub controller: InteractionController,
	pub transform: ViewTransform,
	pub theme: Theme,
	binder: RenderBinder,
	width: f64,
	height: f64,
	reset_anim: Option<ResetAnimation>,
}

impl GraphSession {
	/// Build a session from seed data. Seed nodes are placed on a circle
	/// around the canvas center so the first ticks pull them apart instead
	/// of resolving a pile-up at one point.
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let center = Vec2::new(width / 2.0, height / 2.0);
		let mut store = GraphStore::new();
		let n = data.nodes.len().max(1);
		for (i, node) in data.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / n as f64;
			let pos = center + Vec2::new(100.0 * angle.cos(), 100.0 * angle.sin());
			if let Err(e) = store.add_node(&node.id, &node.desc, node.kind, pos) {
				warn!("seed node skipped: {e}");
			}
		}
		for link in &data.links {
			if let Err(e) = store.add_edge(&link.source, &link.target, link.width) {
				warn!("seed link skipped: {e}");
			}
		}

		let mut simulator = ForceSimulator::new(SimulationConfig::default(), center);
		simulator.seed(&store);
		simulator.restart(1.0);
		info!(
			"graph session: {} nodes, {} edges",
			store.node_count(),
			store.edge_count()
		);

		Self {
			store,
			simulator,
			controller: InteractionController::new(
				InteractionConfig::default(),
				GrowthPolicy::default(),
			),
			transform: ViewTransform::IDENTITY,
			theme: Theme::default(),
			binder: RenderBinder::new(),
			width,
			height,
			reset_anim: None,
		}
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	fn center(&self) -> Vec2 {
		Vec2::new(self.width / 2.0, self.height / 2.0)
	}

	/// Add a node through the session; a missing position defaults to the
	/// canvas center. Re-seeds and gently restarts the simulation.
	pub fn add_node(
		&mut self,
		id: impl Into<String>,
		desc: impl Into<String>,
		kind: usize,
		pos: Option<Vec2>,
	) -> Result<(), GraphError> {
		let pos = pos.unwrap_or_else(|| self.center());
		self.store.add_node(id, desc, kind, pos)?;
		self.wake_after_mutation();
		Ok(())
	}

	/// Add an edge through the session; re-seeds and restarts as above.
	pub fn add_edge(&mut self, source: &str, target: &str, width: f64) -> Result<(), GraphError> {
		self.store.add_edge(source, target, width)?;
		self.wake_after_mutation();
		Ok(())
	}

	fn wake_after_mutation(&mut self) {
		self.simulator.seed(&self.store);
		self.simulator
			.restart(self.controller.config.growth_alpha);
	}

	// Pointer plumbing: split borrows so the controller can mutate the
	// store, simulator, and transform it does not own.

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.controller
			.pointer_down(sx, sy, &self.store, &self.transform);
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		self.controller.pointer_move(
			sx,
			sy,
			&mut self.store,
			&mut self.simulator,
			&mut self.transform,
		);
	}

	pub fn pointer_up(&mut self, sx: f64, sy: f64) {
		self.controller.pointer_up(
			sx,
			sy,
			&mut self.store,
			&mut self.simulator,
			&self.transform,
		);
	}

	pub fn pointer_leave(&mut self) {
		self.controller
			.pointer_leave(&mut self.store, &mut self.simulator);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.controller.wheel(sx, sy, delta_y, &mut self.transform);
	}

	/// Start easing the view transform back to identity.
	pub fn reset_view(&mut self) {
		self.reset_anim = Some(ResetAnimation {
			from: self.transform,
			elapsed: 0.0,
			duration: self.controller.config.reset_duration,
		});
	}

	/// Whether anything on screen can still move this frame.
	pub fn is_animating(&self) -> bool {
		self.reset_anim.is_some() || self.simulator.phase() == Phase::Settling
	}

	/// Advance one frame: the reset animation, then one physics tick.
	pub fn tick(&mut self, dt: f64) {
		if let Some(anim) = &mut self.reset_anim {
			anim.elapsed += dt;
			let t = (anim.elapsed / anim.duration).min(1.0);
			let e = ease_cubic(t);
			self.transform = ViewTransform {
				x: anim.from.x * (1.0 - e),
				y: anim.from.y * (1.0 - e),
				k: anim.from.k + (1.0 - anim.from.k) * e,
			};
			if t >= 1.0 {
				self.transform = ViewTransform::IDENTITY;
				self.reset_anim = None;
			}
		}

		self.simulator.tick(self.store.nodes_mut());
	}

	/// Reconcile the backend with the store (when mutated) and push this
	/// frame's positions, paths, and transform.
	pub fn render_frame<B: RenderBackend>(&mut self, backend: &mut B) {
		if self.binder.needs_bind(&self.store) {
			let stats =
				self.binder
					.bind(&self.store, &self.theme, &self.transform, backend);
			info!(
				"rebind: +{} ~{} -{}",
				stats.entered, stats.updated, stats.exited
			);
		}
		self.binder
			.push_frame(&self.store, &self.theme, &self.transform, backend);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulator.set_center(self.center());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn session() -> GraphSession {
		GraphSession::new(&GraphData::seed(), 800.0, 600.0)
	}

	#[test]
	fn seeds_store_from_data() {
		let s = session();
		assert_eq!(s.store.node_count(), 2);
		assert_eq!(s.store.edge_count(), 1);
		assert_eq!(s.store.selected_id(), Some("node2"));
		assert_eq!(s.simulator.phase(), Phase::Settling);
	}

	#[test]
	fn bad_seed_links_are_skipped_not_fatal() {
		let mut data = GraphData::seed();
		data.links.push(crate::components::force_graph::GraphLink {
			source: "node1".into(),
			target: "missing".into(),
			width: 5.0,
		});
		let s = GraphSession::new(&data, 800.0, 600.0);
		assert_eq!(s.store.edge_count(), 1);
	}

	#[test]
	fn add_node_defaults_to_canvas_center() {
		let mut s = session();
		s.add_node("hub", "central", 2, None).unwrap();
		let node = s.store.node("hub").unwrap();
		assert_eq!((node.x, node.y), (400.0, 300.0));
	}

	#[test]
	fn mutation_wakes_simulation_at_growth_alpha() {
		let mut s = session();
		// Settle fully first.
		s.simulator.restart(0.002);
		while s.simulator.phase() == Phase::Settling {
			s.tick(0.016);
		}
		s.add_edge("node2", "node1", 5.0).unwrap();
		assert_eq!(s.simulator.phase(), Phase::Settling);
		assert!((s.simulator.alpha() - 0.5).abs() < 1e-9);
	}

	#[test]
	fn reset_animation_eases_to_identity() {
		let mut s = session();
		s.wheel(100.0, 100.0, -1.0);
		s.pointer_down(700.0, 20.0);
		s.pointer_move(750.0, 60.0);
		s.pointer_up(750.0, 60.0);
		assert_ne!(s.transform, ViewTransform::IDENTITY);

		s.reset_view();
		let start = s.transform;
		// Half-way: somewhere strictly between start and identity.
		for _ in 0..25 {
			s.tick(0.015);
		}
		assert_ne!(s.transform, start);
		assert_ne!(s.transform, ViewTransform::IDENTITY);
		// Past 750ms: exactly identity, animation finished.
		for _ in 0..25 {
			s.tick(0.015);
		}
		assert_eq!(s.transform, ViewTransform::IDENTITY);
		assert!(s.reset_anim.is_none());
	}

	#[test]
	fn mutation_is_visible_to_the_very_next_tick() {
		let mut s = session();
		s.add_node("fresh", "", 3, Some(Vec2::new(0.0, 0.0))).unwrap();
		s.add_edge("fresh", "node1", 5.0).unwrap();
		let before = s.store.node("fresh").unwrap().position();
		s.tick(0.016);
		let after = s.store.node("fresh").unwrap().position();
		assert_ne!(before, after, "new node participates immediately");
	}
}
