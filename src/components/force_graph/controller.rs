//! Pointer-gesture state machine: drag, pan, zoom, and click-to-grow.
//!
//! Raw pointer events arrive in screen coordinates; the controller converts
//! them through the view transform and turns them into store mutations, drag
//! pins, and transform updates. Gestures are modeled as an explicit state
//! machine rather than free callbacks, so the whole interaction protocol is
//! testable without a DOM.

use log::{debug, warn};

use super::geometry::{NODE_RADIUS, SELECTED_NODE_RADIUS};
use super::simulation::ForceSimulator;
use super::store::GraphStore;
use super::types::Vec2;

/// Interaction tunables.
#[derive(Clone, Debug)]
pub struct InteractionConfig {
	/// Zoom scale extent, inclusive.
	pub zoom_min: f64,
	pub zoom_max: f64,
	/// Pointer travel (screen px) below which a press-release is a click.
	pub click_slop: f64,
	/// Alpha target raised while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Alpha the simulation restarts at after a graph mutation.
	pub growth_alpha: f64,
	/// Stroke width for edges created by click-growth.
	pub grow_edge_width: f64,
	/// Duration of the reset-view animation, seconds.
	pub reset_duration: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			zoom_min: 0.125,
			zoom_max: 2.0,
			click_slop: 3.0,
			drag_alpha_target: 0.3,
			growth_alpha: 0.5,
			grow_edge_width: 5.0,
			reset_duration: 0.75,
		}
	}
}

/// When growing the graph by clicking node N, also add the reverse edge
/// N -> new whenever the post-insert node count is a multiple of this.
///
/// The every-3 cadence reproduces the reference behavior; it is policy, not
/// physics, so it is configurable rather than hard-coded.
#[derive(Clone, Debug)]
pub struct GrowthPolicy {
	pub reverse_every: Option<usize>,
}

impl Default for GrowthPolicy {
	fn default() -> Self {
		Self {
			reverse_every: Some(3),
		}
	}
}

/// Pan and zoom transform applied to the whole scene at draw time.
/// Stored node coordinates always stay in simulation space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl ViewTransform {
	pub const IDENTITY: ViewTransform = ViewTransform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Screen coordinates to simulation space.
	pub fn to_graph(&self, sx: f64, sy: f64) -> Vec2 {
		Vec2::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// Current gesture. `Pressed` is ambiguous until the pointer travels past
/// the click slop, at which point it promotes to a drag or a pan.
#[derive(Clone, Debug, PartialEq)]
enum Gesture {
	Idle,
	Pressed {
		x: f64,
		y: f64,
		node: Option<String>,
	},
	DraggingNode {
		id: String,
	},
	Panning {
		start_x: f64,
		start_y: f64,
		origin_x: f64,
		origin_y: f64,
	},
}

/// Translates pointer/wheel events into store mutations and transform
/// updates. Owns only gesture state; the store, simulator, and transform are
/// borrowed per event from the owning session.
#[derive(Debug)]
pub struct InteractionController {
	pub config: InteractionConfig,
	pub policy: GrowthPolicy,
	gesture: Gesture,
}

impl InteractionController {
	pub fn new(config: InteractionConfig, policy: GrowthPolicy) -> Self {
		Self {
			config,
			policy,
			gesture: Gesture::Idle,
		}
	}

	/// Topmost node whose visual radius covers the given screen point.
	pub fn node_at(
		&self,
		store: &GraphStore,
		transform: &ViewTransform,
		sx: f64,
		sy: f64,
	) -> Option<String> {
		let p = transform.to_graph(sx, sy);
		let mut found = None;
		for node in store.nodes() {
			let r = if node.selected {
				SELECTED_NODE_RADIUS
			} else {
				NODE_RADIUS
			};
			if (node.position() - p).length() < r {
				found = Some(node.id.clone());
			}
		}
		found
	}

	pub fn pointer_down(
		&mut self,
		sx: f64,
		sy: f64,
		store: &GraphStore,
		transform: &ViewTransform,
	) {
		self.gesture = Gesture::Pressed {
			x: sx,
			y: sy,
			node: self.node_at(store, transform, sx, sy),
		};
	}

	pub fn pointer_move(
		&mut self,
		sx: f64,
		sy: f64,
		store: &mut GraphStore,
		sim: &mut ForceSimulator,
		transform: &mut ViewTransform,
	) {
		match self.gesture.clone() {
			Gesture::Pressed { x, y, node } => {
				let travel = Vec2::new(sx - x, sy - y).length();
				if travel <= self.config.click_slop {
					return;
				}
				if let Some(id) = node {
					// Drag-start: pin at the node's current position and
					// wake the simulator without a full alpha reset.
					if let Some(n) = store.node_mut(&id) {
						n.fx = Some(n.x);
						n.fy = Some(n.y);
					}
					sim.set_alpha_target(self.config.drag_alpha_target);
					self.gesture = Gesture::DraggingNode { id };
					self.pointer_move(sx, sy, store, sim, transform);
				} else {
					self.gesture = Gesture::Panning {
						start_x: x,
						start_y: y,
						origin_x: transform.x,
						origin_y: transform.y,
					};
					self.pointer_move(sx, sy, store, sim, transform);
				}
			}
			Gesture::DraggingNode { id } => {
				let p = transform.to_graph(sx, sy);
				if let Some(n) = store.node_mut(&id) {
					n.fx = Some(p.x);
					n.fy = Some(p.y);
				}
			}
			Gesture::Panning {
				start_x,
				start_y,
				origin_x,
				origin_y,
			} => {
				transform.x = origin_x + (sx - start_x);
				transform.y = origin_y + (sy - start_y);
			}
			Gesture::Idle => {}
		}
	}

	/// Finish the gesture. A release still within the click slop over a node
	/// grows the graph at the pointer position.
	pub fn pointer_up(
		&mut self,
		sx: f64,
		sy: f64,
		store: &mut GraphStore,
		sim: &mut ForceSimulator,
		transform: &ViewTransform,
	) {
		match std::mem::replace(&mut self.gesture, Gesture::Idle) {
			Gesture::Pressed { node: Some(id), .. } => {
				self.grow(&id, transform.to_graph(sx, sy), store, sim);
			}
			Gesture::DraggingNode { id } => {
				if let Some(n) = store.node_mut(&id) {
					n.fx = None;
					n.fy = None;
				}
				sim.set_alpha_target(0.0);
			}
			_ => {}
		}
	}

	/// Abandon any in-flight gesture (pointer left the canvas). A dragged
	/// node is released exactly as on pointer-up.
	pub fn pointer_leave(&mut self, store: &mut GraphStore, sim: &mut ForceSimulator) {
		if let Gesture::DraggingNode { id } = std::mem::replace(&mut self.gesture, Gesture::Idle) {
			if let Some(n) = store.node_mut(&id) {
				n.fx = None;
				n.fy = None;
			}
			sim.set_alpha_target(0.0);
		}
	}

	/// Wheel zoom about the cursor, clamped to the configured extent.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64, transform: &mut ViewTransform) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let k = (transform.k * factor).clamp(self.config.zoom_min, self.config.zoom_max);
		let ratio = k / transform.k;
		transform.x = sx - (sx - transform.x) * ratio;
		transform.y = sy - (sy - transform.y) * ratio;
		transform.k = k;
	}

	/// Click-growth: new node at the click point, edge new -> parent, and
	/// per policy the reverse edge parent -> new as well. The mutation is
	/// followed by a simulator re-seed and a gentle restart so the layout
	/// absorbs the new node without re-scrambling.
	fn grow(&self, parent: &str, at: Vec2, store: &mut GraphStore, sim: &mut ForceSimulator) {
		let id = store.allocate_id();
		let kind = store.node_count();
		if let Err(e) = store.add_node(id.clone(), format!("grown from {parent}"), kind, at) {
			warn!("growth rejected: {e}");
			return;
		}
		if let Err(e) = store.add_edge(&id, parent, self.config.grow_edge_width) {
			warn!("growth edge rejected: {e}");
			return;
		}
		if let Some(every) = self.policy.reverse_every
			&& store.node_count() % every == 0
			&& let Err(e) = store.add_edge(parent, &id, self.config.grow_edge_width)
		{
			warn!("reverse growth edge rejected: {e}");
		}
		debug!("grew {id} from {parent} ({} nodes)", store.node_count());
		sim.seed(store);
		sim.restart(self.config.growth_alpha);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::SimulationConfig;

	struct Rig {
		store: GraphStore,
		sim: ForceSimulator,
		transform: ViewTransform,
		controller: InteractionController,
	}

	impl Rig {
		fn new() -> Self {
			let mut store = GraphStore::new();
			store
				.add_node("node1", "this is node1", 0, Vec2::new(100.0, 100.0))
				.unwrap();
			store
				.add_node("node2", "this is node2", 1, Vec2::new(400.0, 400.0))
				.unwrap();
			store.add_edge("node1", "node2", 5.0).unwrap();
			let mut sim =
				ForceSimulator::new(SimulationConfig::default(), Vec2::new(250.0, 250.0));
			sim.seed(&store);
			Self {
				store,
				sim,
				transform: ViewTransform::IDENTITY,
				controller: InteractionController::new(
					InteractionConfig::default(),
					GrowthPolicy::default(),
				),
			}
		}

		fn click(&mut self, sx: f64, sy: f64) {
			self.controller
				.pointer_down(sx, sy, &self.store, &self.transform);
			self.controller.pointer_up(
				sx,
				sy,
				&mut self.store,
				&mut self.sim,
				&self.transform,
			);
		}

		fn drag(&mut self, from: (f64, f64), to: (f64, f64)) {
			self.controller
				.pointer_down(from.0, from.1, &self.store, &self.transform);
			self.controller.pointer_move(
				to.0,
				to.1,
				&mut self.store,
				&mut self.sim,
				&mut self.transform,
			);
		}

		fn reverse_edge_count(&self) -> usize {
			self.store
				.edges()
				.iter()
				.filter(|e| {
					self.store
						.edges()
						.iter()
						.any(|o| o.source == e.target && o.target == e.source)
				})
				.count()
		}
	}

	#[test]
	fn click_growth_invariant_over_many_grows() {
		let mut rig = Rig::new();
		// Click node1 repeatedly; each new node lands on node1, so park it
		// far away before the next click to keep the hit test unambiguous.
		for n in 1..=12usize {
			rig.click(100.0, 100.0);
			assert_eq!(rig.store.node_count(), 2 + n);

			let latest = rig.store.nodes().last().unwrap().id.clone();
			assert_eq!(latest, format!("node{}", 2 + n));
			let has_reverse = rig
				.store
				.edges()
				.iter()
				.any(|e| e.source == "node1" && e.target == latest);
			assert_eq!(has_reverse, (2 + n) % 3 == 0, "at n={n}");

			let node = rig.store.node_mut(&latest).unwrap();
			node.x = 2000.0 + 50.0 * n as f64;
			node.y = 2000.0;
		}
		// 4 of the 12 post-insert counts (3, 6, 9, 12) are multiples of 3;
		// each contributes a curved bidirectional pair.
		assert_eq!(rig.store.edge_count(), 1 + 12 + 4);
		assert_eq!(rig.reverse_edge_count(), 8);
	}

	#[test]
	fn growth_selects_new_node_and_uses_click_position() {
		let mut rig = Rig::new();
		rig.click(110.0, 95.0);
		let node = rig.store.node("node3").unwrap();
		assert!(node.selected);
		assert_eq!((node.x, node.y), (110.0, 95.0));
		assert_eq!(rig.store.selected_id(), Some("node3"));
		assert!(!rig.store.node("node2").unwrap().selected);
	}

	#[test]
	fn growth_respects_disabled_reverse_policy() {
		let mut rig = Rig::new();
		rig.controller.policy.reverse_every = None;
		for _ in 0..6 {
			rig.click(100.0, 100.0);
			let latest = rig.store.nodes().last().unwrap().id.clone();
			let node = rig.store.node_mut(&latest).unwrap();
			node.x = 3000.0;
			node.y = 3000.0;
		}
		assert_eq!(rig.reverse_edge_count(), 0);
	}

	#[test]
	fn click_on_empty_space_grows_nothing() {
		let mut rig = Rig::new();
		rig.click(250.0, 250.0);
		assert_eq!(rig.store.node_count(), 2);
		assert_eq!(rig.store.edge_count(), 1);
	}

	#[test]
	fn drag_pins_then_release_unpins() {
		let mut rig = Rig::new();
		rig.drag((100.0, 100.0), (160.0, 130.0));
		{
			let n = rig.store.node("node1").unwrap();
			assert_eq!(n.fx, Some(160.0));
			assert_eq!(n.fy, Some(130.0));
		}
		// Live moves keep following the pointer.
		rig.controller.pointer_move(
			200.0,
			90.0,
			&mut rig.store,
			&mut rig.sim,
			&mut rig.transform,
		);
		assert_eq!(rig.store.node("node1").unwrap().fx, Some(200.0));

		rig.controller.pointer_up(
			200.0,
			90.0,
			&mut rig.store,
			&mut rig.sim,
			&rig.transform,
		);
		let n = rig.store.node("node1").unwrap();
		assert_eq!(n.fx, None);
		assert_eq!(n.fy, None);
		// A drag that travelled past the slop is not a click.
		assert_eq!(rig.store.node_count(), 2);
	}

	#[test]
	fn drag_accounts_for_zoom_transform() {
		let mut rig = Rig::new();
		rig.transform = ViewTransform {
			x: 50.0,
			y: 50.0,
			k: 2.0,
		};
		// node1 at graph (100,100) appears at screen (250,250).
		rig.drag((250.0, 250.0), (270.0, 250.0));
		let n = rig.store.node("node1").unwrap();
		assert_eq!(n.fx, Some(110.0));
		assert_eq!(n.fy, Some(100.0));
	}

	#[test]
	fn press_on_empty_space_pans() {
		let mut rig = Rig::new();
		rig.drag((250.0, 250.0), (280.0, 240.0));
		assert_eq!(rig.transform.x, 30.0);
		assert_eq!(rig.transform.y, -10.0);
		assert_eq!(rig.transform.k, 1.0);
	}

	#[test]
	fn wheel_zoom_clamped_to_extent() {
		let mut rig = Rig::new();
		for _ in 0..100 {
			rig.controller.wheel(0.0, 0.0, -1.0, &mut rig.transform);
		}
		assert!((rig.transform.k - 2.0).abs() < 1e-9);
		for _ in 0..100 {
			rig.controller.wheel(0.0, 0.0, 1.0, &mut rig.transform);
		}
		assert!((rig.transform.k - 0.125).abs() < 1e-9);
	}

	#[test]
	fn wheel_zoom_anchors_cursor() {
		let mut rig = Rig::new();
		// The graph point under the cursor must stay under the cursor.
		let (sx, sy) = (300.0, 200.0);
		let before = rig.transform.to_graph(sx, sy);
		rig.controller.wheel(sx, sy, -1.0, &mut rig.transform);
		let after = rig.transform.to_graph(sx, sy);
		assert!((before.x - after.x).abs() < 1e-9);
		assert!((before.y - after.y).abs() < 1e-9);
	}

	#[test]
	fn pointer_leave_releases_drag() {
		let mut rig = Rig::new();
		rig.drag((100.0, 100.0), (150.0, 150.0));
		rig.controller.pointer_leave(&mut rig.store, &mut rig.sim);
		let n = rig.store.node("node1").unwrap();
		assert_eq!(n.fx, None);
		assert_eq!(n.fy, None);
	}
}
