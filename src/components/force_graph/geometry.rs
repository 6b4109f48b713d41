//! Edge path resolution: straight segments, one-sided arcs for
//! bidirectional pairs, and node-radius endpoint trimming.

use super::store::GraphError;
use super::types::Vec2;

/// Radius of a node's drawn circle.
pub const NODE_RADIUS: f64 = 30.0;
/// Radius used when the edge's target is the selected node.
pub const SELECTED_NODE_RADIUS: f64 = 40.0;

/// Distance below which endpoints are treated as coincident and no path is
/// produced (the trigonometry divides by the distance).
const MIN_SPAN: f64 = 1e-9;

/// Resolved drawing geometry for one edge. Endpoints are trimmed so arrows
/// land on the target node's boundary rather than its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgePath {
	/// Coincident endpoints: nothing to draw.
	Empty,
	/// Straight segment from the source center to the trimmed endpoint.
	Line { from: Vec2, to: Vec2 },
	/// Circular arc bulging to one side of the chord. `radius` equals the
	/// node distance, so a reverse pair separates into mirrored arcs.
	Arc {
		from: Vec2,
		to: Vec2,
		radius: f64,
		/// Center of the arc's circle, for canvas `arc()` rasterization.
		center: Vec2,
	},
}

impl EdgePath {
	/// Trimmed endpoint the arrowhead attaches to, if any.
	pub fn head(&self) -> Option<Vec2> {
		match *self {
			EdgePath::Empty => None,
			EdgePath::Line { to, .. } | EdgePath::Arc { to, .. } => Some(to),
		}
	}
}

/// Compute the drawn path for an edge from `source` to `target`.
///
/// `target_radius` is the target node's visual radius (larger when
/// selected); the path stops that far short of the target center.
/// Coincident endpoints fall back to [`EdgePath::Empty`] rather than
/// producing NaN coordinates.
pub fn edge_path(source: Vec2, target: Vec2, curved: bool, target_radius: f64) -> EdgePath {
	let d = target - source;
	let dr = d.length();
	if dr < MIN_SPAN {
		return EdgePath::Empty;
	}
	let offset = d * (target_radius / dr);

	if !curved {
		return EdgePath::Line {
			from: source,
			to: target - offset,
		};
	}

	// Rotate the chord by asin(r / 2dr) so the trimmed endpoint sits on a
	// circle of radius dr; the rotation direction picks the bulge side,
	// and the reverse edge (negated chord) bulges the other way.
	let sin = (target_radius / (2.0 * dr)).clamp(-1.0, 1.0);
	let cos = (1.0 - sin * sin).sqrt();
	let swept = Vec2::new(d.x * cos + d.y * sin, d.y * cos - d.x * sin);
	let to = source + swept - offset;

	match arc_center(source, to, dr) {
		Ok(center) => EdgePath::Arc {
			from: source,
			to,
			radius: dr,
			center,
		},
		Err(_) => EdgePath::Line {
			from: source,
			to: target - offset,
		},
	}
}

/// Center of the circle of radius `r` through `from` and `to`, on the side
/// that sweeps the minor arc clockwise (SVG sweep flag 1, y-down).
pub fn arc_center(from: Vec2, to: Vec2, r: f64) -> Result<Vec2, GraphError> {
	let chord = to - from;
	let c = chord.length();
	if c < MIN_SPAN || r < MIN_SPAN {
		return Err(GraphError::DegenerateGeometry);
	}
	// Half-chord can exceed r by floating error when the sweep is shallow.
	let h2 = r * r - (c / 2.0) * (c / 2.0);
	let h = h2.max(0.0).sqrt();
	let mid = Vec2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
	let u = chord * (1.0 / c);
	// Perpendicular on the clockwise-sweep side.
	Ok(mid + Vec2::new(-u.y, u.x) * h)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn straight_edge_trims_to_target_radius() {
		let path = edge_path(Vec2::ZERO, Vec2::new(100.0, 0.0), false, NODE_RADIUS);
		assert_eq!(
			path,
			EdgePath::Line {
				from: Vec2::ZERO,
				to: Vec2::new(70.0, 0.0),
			}
		);
	}

	#[test]
	fn selected_target_trims_further() {
		let path = edge_path(Vec2::ZERO, Vec2::new(100.0, 0.0), false, SELECTED_NODE_RADIUS);
		assert_eq!(path.head(), Some(Vec2::new(60.0, 0.0)));
	}

	#[test]
	fn coincident_endpoints_yield_empty_path() {
		let p = Vec2::new(42.0, 17.0);
		assert_eq!(edge_path(p, p, true, NODE_RADIUS), EdgePath::Empty);
		assert_eq!(edge_path(p, p, false, NODE_RADIUS), EdgePath::Empty);
	}

	#[test]
	fn arc_radius_equals_node_distance() {
		let source = Vec2::ZERO;
		let target = Vec2::new(120.0, 50.0);
		let dr = (target - source).length();
		match edge_path(source, target, true, NODE_RADIUS) {
			EdgePath::Arc {
				from,
				to,
				radius,
				center,
			} => {
				assert!((radius - dr).abs() < 1e-9);
				assert_eq!(from, source);
				// Both endpoints sit on the arc's circle.
				assert!(((center - from).length() - radius).abs() < 1e-6);
				assert!(((center - to).length() - radius).abs() < 1e-6);
			}
			other => panic!("expected arc, got {other:?}"),
		}
	}

	#[test]
	fn reverse_arcs_bulge_on_opposite_sides() {
		let a = Vec2::ZERO;
		let b = Vec2::new(150.0, 0.0);
		let (EdgePath::Arc { center: c_ab, .. }, EdgePath::Arc { center: c_ba, .. }) = (
			edge_path(a, b, true, NODE_RADIUS),
			edge_path(b, a, true, NODE_RADIUS),
		) else {
			panic!("expected arcs");
		};
		// The chord lies on the x axis; opposite bulges means arc centers on
		// opposite sides of it.
		assert!(c_ab.y * c_ba.y < 0.0, "centers {c_ab:?} / {c_ba:?}");
	}

	#[test]
	fn arc_center_rejects_degenerate_input() {
		let p = Vec2::new(1.0, 1.0);
		assert_eq!(arc_center(p, p, 50.0), Err(GraphError::DegenerateGeometry));
		assert_eq!(
			arc_center(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0),
			Err(GraphError::DegenerateGeometry)
		);
	}
}
