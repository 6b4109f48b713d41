//! Reconciles store contents against previously rendered shapes.
//!
//! Stable-identity diffing in the enter/update/exit style: nodes are keyed
//! by id, edges by their (source, target) pair. The binder tracks what the
//! backend currently shows and issues create/update/remove calls, so shapes
//! persist across re-renders instead of being rebuilt from scratch, and
//! entering shapes are created under the current view transform rather than
//! popping in at the origin.

use std::collections::HashSet;

use super::controller::ViewTransform;
use super::geometry::{self, EdgePath, NODE_RADIUS, SELECTED_NODE_RADIUS};
use super::store::{Edge, GraphStore};
use super::theme::{Color, Theme};
use super::types::{EdgeKey, Vec2};

/// Drawable attributes of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeVisual {
	pub position: Vec2,
	pub fill: Color,
	pub selected: bool,
	pub radius: f64,
}

/// Drawable attributes of one edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVisual {
	pub path: EdgePath,
	pub width: f64,
}

/// The rendering side of the binder contract. The canvas scene implements
/// this; tests drive a recording mock.
pub trait RenderBackend {
	fn insert_node(&mut self, id: &str, visual: &NodeVisual, transform: &ViewTransform);
	fn update_node(&mut self, id: &str, visual: &NodeVisual);
	fn remove_node(&mut self, id: &str);
	fn insert_edge(&mut self, key: &EdgeKey, visual: &EdgeVisual, transform: &ViewTransform);
	fn update_edge(&mut self, key: &EdgeKey, visual: &EdgeVisual);
	fn remove_edge(&mut self, key: &EdgeKey);
	fn set_transform(&mut self, transform: &ViewTransform);
}

/// Counts from one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindStats {
	pub entered: usize,
	pub updated: usize,
	pub exited: usize,
}

/// Tracks which shapes the backend currently holds.
#[derive(Debug, Default)]
pub struct RenderBinder {
	bound_nodes: HashSet<String>,
	bound_edges: HashSet<EdgeKey>,
	seen_revision: Option<u64>,
}

impl RenderBinder {
	pub fn new() -> Self {
		Self::default()
	}

	/// True when the store has mutated since the last `bind`.
	pub fn needs_bind(&self, store: &GraphStore) -> bool {
		self.seen_revision != Some(store.revision())
	}

	/// Full enter/update/exit reconciliation. Edges are drawn beneath
	/// nodes, so they bind first.
	pub fn bind<B: RenderBackend>(
		&mut self,
		store: &GraphStore,
		theme: &Theme,
		transform: &ViewTransform,
		backend: &mut B,
	) -> BindStats {
		let mut stats = BindStats::default();

		let live_edges: HashSet<EdgeKey> = store.edges().iter().map(Edge::key).collect();
		for exited in self.bound_edges.difference(&live_edges) {
			backend.remove_edge(exited);
			stats.exited += 1;
		}
		for edge in store.edges() {
			let key = edge.key();
			let visual = edge_visual(store, edge);
			if self.bound_edges.contains(&key) {
				backend.update_edge(&key, &visual);
				stats.updated += 1;
			} else {
				backend.insert_edge(&key, &visual, transform);
				stats.entered += 1;
			}
		}
		self.bound_edges = live_edges;

		let live_nodes: HashSet<String> =
			store.nodes().iter().map(|n| n.id.clone()).collect();
		for exited in self.bound_nodes.difference(&live_nodes) {
			backend.remove_node(exited);
			stats.exited += 1;
		}
		for node in store.nodes() {
			let visual = NodeVisual {
				position: node.position(),
				fill: theme.palette.get(node.kind),
				selected: node.selected,
				radius: if node.selected {
					SELECTED_NODE_RADIUS
				} else {
					NODE_RADIUS
				},
			};
			if self.bound_nodes.contains(&node.id) {
				backend.update_node(&node.id, &visual);
				stats.updated += 1;
			} else {
				backend.insert_node(&node.id, &visual, transform);
				stats.entered += 1;
			}
		}
		self.bound_nodes = live_nodes;

		self.seen_revision = Some(store.revision());
		stats
	}

	/// Per-tick attribute push: fresh positions and resolved edge paths for
	/// every bound shape, plus the current group transform.
	pub fn push_frame<B: RenderBackend>(
		&self,
		store: &GraphStore,
		theme: &Theme,
		transform: &ViewTransform,
		backend: &mut B,
	) {
		backend.set_transform(transform);
		for edge in store.edges() {
			backend.update_edge(&edge.key(), &edge_visual(store, edge));
		}
		for node in store.nodes() {
			backend.update_node(
				&node.id,
				&NodeVisual {
					position: node.position(),
					fill: theme.palette.get(node.kind),
					selected: node.selected,
					radius: if node.selected {
						SELECTED_NODE_RADIUS
					} else {
						NODE_RADIUS
					},
				},
			);
		}
	}
}

/// Resolve an edge's drawn path from current node positions. Unresolvable
/// endpoints (mid-removal) degrade to an empty path.
fn edge_visual(store: &GraphStore, edge: &Edge) -> EdgeVisual {
	let (source, target) = match (store.node(&edge.source), store.node(&edge.target)) {
		(Some(s), Some(t)) => (s, t),
		_ => {
			return EdgeVisual {
				path: EdgePath::Empty,
				width: edge.width,
			};
		}
	};
	let radius = if target.selected {
		SELECTED_NODE_RADIUS
	} else {
		NODE_RADIUS
	};
	EdgeVisual {
		path: geometry::edge_path(source.position(), target.position(), edge.curved, radius),
		width: edge.width,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, PartialEq)]
	enum Op {
		InsertNode(String),
		UpdateNode(String),
		RemoveNode(String),
		InsertEdge(EdgeKey),
		UpdateEdge(EdgeKey),
		RemoveEdge(EdgeKey),
		SetTransform(ViewTransform),
	}

	#[derive(Default)]
	struct MockBackend {
		ops: Vec<Op>,
		insert_transforms: Vec<ViewTransform>,
	}

	impl RenderBackend for MockBackend {
		fn insert_node(&mut self, id: &str, _v: &NodeVisual, t: &ViewTransform) {
			self.ops.push(Op::InsertNode(id.into()));
			self.insert_transforms.push(*t);
		}
		fn update_node(&mut self, id: &str, _v: &NodeVisual) {
			self.ops.push(Op::UpdateNode(id.into()));
		}
		fn remove_node(&mut self, id: &str) {
			self.ops.push(Op::RemoveNode(id.into()));
		}
		fn insert_edge(&mut self, key: &EdgeKey, _v: &EdgeVisual, t: &ViewTransform) {
			self.ops.push(Op::InsertEdge(key.clone()));
			self.insert_transforms.push(*t);
		}
		fn update_edge(&mut self, key: &EdgeKey, _v: &EdgeVisual) {
			self.ops.push(Op::UpdateEdge(key.clone()));
		}
		fn remove_edge(&mut self, key: &EdgeKey) {
			self.ops.push(Op::RemoveEdge(key.clone()));
		}
		fn set_transform(&mut self, t: &ViewTransform) {
			self.ops.push(Op::SetTransform(*t));
		}
	}

	fn seeded_store() -> GraphStore {
		let mut store = GraphStore::new();
		store.add_node("a", "", 0, Vec2::new(0.0, 0.0)).unwrap();
		store.add_node("b", "", 1, Vec2::new(100.0, 0.0)).unwrap();
		store.add_edge("a", "b", 5.0).unwrap();
		store
	}

	#[test]
	fn first_bind_enters_everything() {
		let store = seeded_store();
		let mut binder = RenderBinder::new();
		let mut backend = MockBackend::default();
		let stats = binder.bind(&store, &Theme::default(), &ViewTransform::IDENTITY, &mut backend);
		assert_eq!(
			stats,
			BindStats {
				entered: 3,
				updated: 0,
				exited: 0,
			}
		);
		assert!(!binder.needs_bind(&store));
	}

	#[test]
	fn incremental_bind_updates_existing_and_enters_new() {
		let mut store = seeded_store();
		let mut binder = RenderBinder::new();
		let mut backend = MockBackend::default();
		binder.bind(&store, &Theme::default(), &ViewTransform::IDENTITY, &mut backend);

		store.add_node("c", "", 2, Vec2::new(50.0, 80.0)).unwrap();
		store.add_edge("c", "a", 5.0).unwrap();
		assert!(binder.needs_bind(&store));

		backend.ops.clear();
		let stats = binder.bind(&store, &Theme::default(), &ViewTransform::IDENTITY, &mut backend);
		assert_eq!(
			stats,
			BindStats {
				entered: 2,
				updated: 3,
				exited: 0,
			}
		);
		assert!(backend.ops.contains(&Op::InsertNode("c".into())));
		assert!(backend.ops.contains(&Op::InsertEdge(EdgeKey::new("c", "a"))));
		assert!(backend.ops.contains(&Op::UpdateNode("a".into())));
	}

	#[test]
	fn removal_exits_shapes() {
		let mut store = seeded_store();
		let mut binder = RenderBinder::new();
		let mut backend = MockBackend::default();
		binder.bind(&store, &Theme::default(), &ViewTransform::IDENTITY, &mut backend);

		store.remove_node("b");
		backend.ops.clear();
		let stats = binder.bind(&store, &Theme::default(), &ViewTransform::IDENTITY, &mut backend);
		assert_eq!(stats.exited, 2, "node b and its incident edge exit");
		assert!(backend.ops.contains(&Op::RemoveNode("b".into())));
		assert!(backend.ops.contains(&Op::RemoveEdge(EdgeKey::new("a", "b"))));
	}

	#[test]
	fn entering_shapes_carry_current_transform() {
		let store = seeded_store();
		let mut binder = RenderBinder::new();
		let mut backend = MockBackend::default();
		let transform = ViewTransform {
			x: 40.0,
			y: -10.0,
			k: 1.5,
		};
		binder.bind(&store, &Theme::default(), &transform, &mut backend);
		assert!(!backend.insert_transforms.is_empty());
		assert!(backend.insert_transforms.iter().all(|t| *t == transform));
	}

	#[test]
	fn push_frame_updates_all_bound_shapes() {
		let store = seeded_store();
		let mut binder = RenderBinder::new();
		let mut backend = MockBackend::default();
		binder.bind(&store, &Theme::default(), &ViewTransform::IDENTITY, &mut backend);

		backend.ops.clear();
		binder.push_frame(&store, &Theme::default(), &ViewTransform::IDENTITY, &mut backend);
		assert_eq!(backend.ops[0], Op::SetTransform(ViewTransform::IDENTITY));
		assert!(backend.ops.contains(&Op::UpdateEdge(EdgeKey::new("a", "b"))));
		assert!(backend.ops.contains(&Op::UpdateNode("a".into())));
		assert!(backend.ops.contains(&Op::UpdateNode("b".into())));
	}

	#[test]
	fn edge_visual_trims_to_selected_radius() {
		let store = seeded_store();
		// b was added last, so it is selected: radius 40.
		let edge = &store.edges()[0];
		let visual = edge_visual(&store, edge);
		match visual.path {
			EdgePath::Line { to, .. } => assert_eq!(to, Vec2::new(60.0, 0.0)),
			other => panic!("expected line, got {other:?}"),
		}
	}
}
