//! Iterative force-directed layout: charge repulsion, spring attraction,
//! centering, and alpha-cooled velocity integration.
//!
//! The simulator follows the d3-force model. A "temperature" scalar `alpha`
//! scales every force and relaxes geometrically toward `alpha_target` each
//! tick; once both fall below `alpha_min` the simulator goes [`Phase::Idle`]
//! and stops mutating positions until a mutation or drag wakes it again.
//!
//! Positions and velocities live on the store's nodes; the simulator owns
//! only the resolved springs (edge endpoints as node indices) and the
//! cooling state. Forces are accumulated into velocities for every node
//! before integration, so no node ever sees a half-applied tick.

use super::store::{GraphStore, Node};
use super::types::Vec2;

/// Tunable physics constants. Defaults match the reference layout feel.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
	/// Pairwise charge strength; negative repels. Force falls off with 1/d.
	pub charge_strength: f64,
	/// Spring rest length for every edge.
	pub link_distance: f64,
	/// Fraction of velocity lost per tick (friction).
	pub velocity_decay: f64,
	/// Alpha below which the layout is considered settled.
	pub alpha_min: f64,
	/// Geometric cooling rate applied to alpha each tick.
	pub alpha_decay: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			charge_strength: -250.0,
			link_distance: 100.0,
			velocity_decay: 0.2,
			alpha_min: 0.001,
			// Reaches alpha_min from 1.0 in ~300 ticks.
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
		}
	}
}

/// Simulator macro-state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// Alpha is decaying; ticks advance positions.
	Settling,
	/// Alpha hit the floor; positions are frozen until perturbed.
	Idle,
}

/// An edge resolved to node indices, with the degree-based strength and
/// bias d3 uses so high-degree hubs are not yanked around by every spring.
#[derive(Clone, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the source end.
	bias: f64,
}

/// Force-directed layout integrator over a [`GraphStore`]'s nodes.
#[derive(Debug)]
pub struct ForceSimulator {
	config: SimulationConfig,
	springs: Vec<Spring>,
	center: Vec2,
	alpha: f64,
	alpha_target: f64,
	phase: Phase,
}

impl ForceSimulator {
	pub fn new(config: SimulationConfig, center: Vec2) -> Self {
		Self {
			config,
			springs: Vec::new(),
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			phase: Phase::Settling,
		}
	}

	/// Point the centering force pulls the layout centroid toward.
	pub fn set_center(&mut self, center: Vec2) {
		self.center = center;
	}

	/// Rebuild springs from the store's current edges. Call after any
	/// mutation; node indices are only valid until the next mutation.
	pub fn seed(&mut self, store: &GraphStore) {
		let mut degree = vec![0usize; store.node_count()];
		let resolved: Vec<(usize, usize)> = store
			.edges()
			.iter()
			.filter_map(|e| {
				Some((store.node_index(&e.source)?, store.node_index(&e.target)?))
			})
			.collect();
		for &(s, t) in &resolved {
			degree[s] += 1;
			degree[t] += 1;
		}
		self.springs = resolved
			.into_iter()
			.map(|(source, target)| Spring {
				source,
				target,
				strength: 1.0 / degree[source].min(degree[target]).max(1) as f64,
				bias: degree[source] as f64
					/ (degree[source] + degree[target]).max(1) as f64,
			})
			.collect();
	}

	/// Restart cooling from the given alpha (0.5 for incremental growth, so
	/// the existing layout is nudged rather than re-scrambled).
	pub fn restart(&mut self, alpha: f64) {
		self.alpha = alpha.clamp(0.0, 1.0);
		self.phase = Phase::Settling;
	}

	/// Raise or lower the cooling floor. A positive target wakes the
	/// simulator without resetting alpha, avoiding a jarring full reheat;
	/// a zero target lets it decay back to idle.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
		if self.alpha_target >= self.config.alpha_min {
			self.phase = Phase::Settling;
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Advance one tick. Returns false (and leaves every position intact)
	/// when idle.
	pub fn tick(&mut self, nodes: &mut [Node]) -> bool {
		if self.phase == Phase::Idle {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_charge(nodes);
		self.apply_springs(nodes);
		self.apply_center(nodes);
		self.integrate(nodes);

		if self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min {
			self.phase = Phase::Idle;
		}
		true
	}

	/// Pairwise many-body repulsion, O(n^2). Force magnitude is
	/// `charge * alpha / d`, with distance^2 floored so near-coincident
	/// nodes get a strong, finite push instead of NaN.
	fn apply_charge(&self, nodes: &mut [Node]) {
		let charge = self.config.charge_strength;
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let (mut dx, mut dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
				if dx == 0.0 && dy == 0.0 {
					// Deterministic nudge for exactly coincident nodes.
					(dx, dy) = (1e-6, 1e-6);
				}
				let mut d2 = dx * dx + dy * dy;
				if d2 < 1.0 {
					d2 = d2.sqrt();
				}
				let w = charge * self.alpha / d2;
				nodes[i].vx += dx * w;
				nodes[i].vy += dy * w;
				nodes[j].vx -= dx * w;
				nodes[j].vy -= dy * w;
			}
		}
	}

	/// Spring force per edge, pulling the pair toward the rest length and
	/// splitting the correction by the degree bias.
	fn apply_springs(&self, nodes: &mut [Node]) {
		let rest = self.config.link_distance;
		for spring in &self.springs {
			let (s, t) = (spring.source, spring.target);
			let mut dx = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
			let mut dy = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
			if dx == 0.0 && dy == 0.0 {
				(dx, dy) = (1e-6, 1e-6);
			}
			let len = (dx * dx + dy * dy).sqrt();
			let l = (len - rest) / len * self.alpha * spring.strength;
			let (fx, fy) = (dx * l, dy * l);
			nodes[t].vx -= fx * spring.bias;
			nodes[t].vy -= fy * spring.bias;
			nodes[s].vx += fx * (1.0 - spring.bias);
			nodes[s].vy += fy * (1.0 - spring.bias);
		}
	}

	/// Translate the whole layout so its centroid drifts onto the canvas
	/// center. Position-based, so it never adds energy to the system.
	fn apply_center(&self, nodes: &mut [Node]) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (mut sx, mut sy) = (0.0, 0.0);
		for node in nodes.iter() {
			sx += node.x;
			sy += node.y;
		}
		let (ox, oy) = (sx / n - self.center.x, sy / n - self.center.y);
		for node in nodes.iter_mut() {
			node.x -= ox;
			node.y -= oy;
		}
	}

	/// Fold velocities into positions with friction. Pinned nodes are
	/// forced to their pin and their velocity cleared, per axis.
	fn integrate(&self, nodes: &mut [Node]) {
		let keep = 1.0 - self.config.velocity_decay;
		for node in nodes.iter_mut() {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}
}
