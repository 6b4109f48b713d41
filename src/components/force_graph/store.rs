//! Canonical node/edge collections with fast lookup indices.
//!
//! The store owns graph identity: a by-id node index, a by-target adjacency
//! index used for reverse-edge detection, the exclusive selection pointer,
//! and a monotonic id allocator. All mutation goes through `Result`-returning
//! methods that reject bad input before touching any state, so the physics
//! layer never sees half-applied mutations or dangling references.

use std::collections::HashMap;

use thiserror::Error;

use super::types::{EdgeKey, Vec2};

/// Errors raised by graph mutation and geometry resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
	/// A node with this id already exists.
	#[error("node id already present: {0}")]
	DuplicateId(String),
	/// An edge referenced a node id that is not in the store.
	#[error("unknown node id: {0}")]
	UnknownNode(String),
	/// Curved-path trigonometry is undefined for coincident endpoints.
	#[error("degenerate geometry: edge endpoints coincide")]
	DegenerateGeometry,
}

/// A graph node plus its simulation state.
///
/// Position and velocity live here (d3-style) so the simulator, the
/// interaction layer, and the renderer all read one copy. `fx`/`fy` pin the
/// node during a drag; while set, integration writes the pin back instead of
/// the integrated position.
#[derive(Clone, Debug)]
pub struct Node {
	pub id: String,
	pub desc: String,
	pub kind: usize,
	pub selected: bool,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl Node {
	pub fn position(&self) -> Vec2 {
		Vec2::new(self.x, self.y)
	}
}

/// A directed edge. `curved` is decided at insert time by reverse-edge
/// detection and may be retro-set on an existing edge when its reverse
/// arrives later.
#[derive(Clone, Debug)]
pub struct Edge {
	pub source: String,
	pub target: String,
	pub width: f64,
	pub curved: bool,
}

impl Edge {
	pub fn key(&self) -> EdgeKey {
		EdgeKey::new(self.source.clone(), self.target.clone())
	}
}

/// Owns the canonical graph collections and their indices.
#[derive(Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	by_id: HashMap<String, usize>,
	edges: Vec<Edge>,
	/// node id -> indices of edges whose *target* is that node.
	adjacency: HashMap<String, Vec<usize>>,
	selected: Option<String>,
	id_counter: u64,
	revision: u64,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a node at an explicit position. The new node becomes the
	/// selection; the previous selection is cleared.
	pub fn add_node(
		&mut self,
		id: impl Into<String>,
		desc: impl Into<String>,
		kind: usize,
		pos: Vec2,
	) -> Result<&Node, GraphError> {
		let id = id.into();
		if self.by_id.contains_key(&id) {
			return Err(GraphError::DuplicateId(id));
		}
		if let Some(prev) = self.selected.take()
			&& let Some(&i) = self.by_id.get(&prev)
		{
			self.nodes[i].selected = false;
		}
		let idx = self.nodes.len();
		self.nodes.push(Node {
			id: id.clone(),
			desc: desc.into(),
			kind,
			selected: true,
			x: pos.x,
			y: pos.y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		});
		self.by_id.insert(id.clone(), idx);
		self.adjacency.entry(id.clone()).or_default();
		self.selected = Some(id);
		self.revision += 1;
		Ok(&self.nodes[idx])
	}

	/// Insert a directed edge. Both endpoints must already exist.
	///
	/// If the reverse edge (target -> source) is already present, both the
	/// new edge and the found reverse edge are flagged curved so a
	/// bidirectional pair renders as two separated arcs.
	pub fn add_edge(
		&mut self,
		source: &str,
		target: &str,
		width: f64,
	) -> Result<&Edge, GraphError> {
		if !self.by_id.contains_key(source) {
			return Err(GraphError::UnknownNode(source.to_string()));
		}
		if !self.by_id.contains_key(target) {
			return Err(GraphError::UnknownNode(target.to_string()));
		}

		// The reverse edge targets our source, so it lives in the source's
		// adjacency bucket.
		let reverse = self
			.adjacency
			.get(source)
			.and_then(|bucket| {
				bucket
					.iter()
					.copied()
					.find(|&i| self.edges[i].source == target)
			});
		if let Some(i) = reverse {
			self.edges[i].curved = true;
		}

		let idx = self.edges.len();
		self.edges.push(Edge {
			source: source.to_string(),
			target: target.to_string(),
			width,
			curved: reverse.is_some(),
		});
		self.adjacency
			.entry(target.to_string())
			.or_default()
			.push(idx);
		self.revision += 1;
		Ok(&self.edges[idx])
	}

	/// Remove a node and every edge incident to it. Returns false if the id
	/// is unknown. If the removed node was selected, selection falls to the
	/// most recently added survivor.
	pub fn remove_node(&mut self, id: &str) -> bool {
		let Some(idx) = self.by_id.remove(id) else {
			return false;
		};
		self.nodes.remove(idx);
		self.edges.retain(|e| e.source != id && e.target != id);
		self.adjacency.remove(id);
		self.rebuild_indices();

		if self.selected.as_deref() == Some(id) {
			self.selected = self.nodes.last().map(|n| n.id.clone());
			if let Some(last) = self.nodes.last_mut() {
				last.selected = true;
			}
		}
		self.revision += 1;
		true
	}

	/// Remove the first edge matching the key. Returns false if absent.
	pub fn remove_edge(&mut self, key: &EdgeKey) -> bool {
		let Some(idx) = self
			.edges
			.iter()
			.position(|e| e.source == key.source && e.target == key.target)
		else {
			return false;
		};
		self.edges.remove(idx);
		self.rebuild_indices();
		self.revision += 1;
		true
	}

	fn rebuild_indices(&mut self) {
		self.by_id = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		self.adjacency.clear();
		for node in &self.nodes {
			self.adjacency.entry(node.id.clone()).or_default();
		}
		for (i, edge) in self.edges.iter().enumerate() {
			self.adjacency
				.entry(edge.target.clone())
				.or_default()
				.push(i);
		}
	}

	/// Allocate the next `node{n}` id from the monotonic counter, skipping
	/// any ids already taken by seed data. Remains unique even once nodes
	/// are removed, unlike deriving ids from the current node count.
	pub fn allocate_id(&mut self) -> String {
		loop {
			self.id_counter += 1;
			let id = format!("node{}", self.id_counter);
			if !self.by_id.contains_key(&id) {
				return id;
			}
		}
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.by_id.get(id).map(|&i| &self.nodes[i])
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		let idx = *self.by_id.get(id)?;
		Some(&mut self.nodes[idx])
	}

	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Id of the currently selected node, if the store is non-empty.
	pub fn selected_id(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	/// Bumped on every successful mutation; lets the render binder detect
	/// when reconciliation is needed without diffing collections eagerly.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Edges targeting the given node, in insertion order.
	pub fn edges_targeting(&self, id: &str) -> impl Iterator<Item = &Edge> {
		self.adjacency
			.get(id)
			.into_iter()
			.flatten()
			.map(|&i| &self.edges[i])
	}
}
