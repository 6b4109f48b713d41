//! Input data structures and small geometry primitives for the graph.

use serde::Deserialize;

/// A node in the seed graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Human-readable description shown in tooltips/logs.
	#[serde(default)]
	pub desc: String,
	/// Category index, mapped to a fill color through the theme palette.
	#[serde(rename = "type", default)]
	pub kind: usize,
}

/// A directed edge between two nodes in the seed graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Stroke width in pixels.
	#[serde(default = "default_link_width")]
	pub width: f64,
}

fn default_link_width() -> f64 {
	5.0
}

/// Complete seed graph: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// The two-node seed used when no graph data is supplied by the host page.
	pub fn seed() -> Self {
		Self {
			nodes: vec![
				GraphNode {
					id: "node1".into(),
					desc: "this is node1".into(),
					kind: 0,
				},
				GraphNode {
					id: "node2".into(),
					desc: "this is node2".into(),
					kind: 1,
				},
			],
			links: vec![GraphLink {
				source: "node1".into(),
				target: "node2".into(),
				width: 5.0,
			}],
		}
	}
}

/// A point or direction in simulation space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y).sqrt()
	}
}

impl std::ops::Add for Vec2 {
	type Output = Vec2;
	fn add(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl std::ops::Sub for Vec2 {
	type Output = Vec2;
	fn sub(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl std::ops::Mul<f64> for Vec2 {
	type Output = Vec2;
	fn mul(self, rhs: f64) -> Vec2 {
		Vec2::new(self.x * rhs, self.y * rhs)
	}
}

/// Stable identity of an edge: the ordered (source, target) pair.
///
/// A struct key rather than a concatenated string, so ids containing
/// arbitrary characters can never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeKey {
	pub source: String,
	pub target: String,
}

impl EdgeKey {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// Key of the edge running the opposite way.
	pub fn reversed(&self) -> EdgeKey {
		EdgeKey {
			source: self.target.clone(),
			target: self.source.clone(),
		}
	}
}

impl std::fmt::Display for EdgeKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} -> {}", self.source, self.target)
	}
}
