//! Circular initial placement of systems.

use std::f64::consts::PI;

use super::types::{Position, System};

/// Tunables for [`circular_layout_with`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParams {
	/// Radius added per system.
	pub radius_step: f64,
	/// Radius never grows past this.
	pub max_radius: f64,
	/// Narrowest node box.
	pub min_node_width: f64,
	/// Width allotted per label character.
	pub char_width: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			radius_step: 50.0,
			max_radius: 300.0,
			min_node_width: 150.0,
			char_width: 8.0,
		}
	}
}

/// Initial placement of one system.
#[derive(Clone, Debug, PartialEq)]
pub struct NodePlacement {
	/// Top-left corner of the node box.
	pub position: Position,
	/// Width of the node box.
	pub visual_width: f64,
}

/// Places systems evenly on a circle, in input order, using default params.
pub fn circular_layout(systems: &[System]) -> Vec<NodePlacement> {
	circular_layout_with(systems, &LayoutParams::default())
}

/// Places systems evenly on a circle centred at `(r, r)` so every coordinate
/// is non-negative. The first system sits at angle 0.
pub fn circular_layout_with(systems: &[System], params: &LayoutParams) -> Vec<NodePlacement> {
	let n = systems.len();
	let radius = layout_radius(n, params);
	systems
		.iter()
		.enumerate()
		.map(|(i, system)| {
			let angle = (i as f64 / n as f64) * 2.0 * PI;
			NodePlacement {
				position: Position::new(
					radius * angle.cos() + radius,
					radius * angle.sin() + radius,
				),
				visual_width: node_width(&system.name, params),
			}
		})
		.collect()
}

/// `min(n * step, max)`.
pub fn layout_radius(n: usize, params: &LayoutParams) -> f64 {
	(n as f64 * params.radius_step).min(params.max_radius)
}

/// Grows with the label but never below the minimum.
pub fn node_width(name: &str, params: &LayoutParams) -> f64 {
	(name.chars().count() as f64 * params.char_width).max(params.min_node_width)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn systems(n: usize) -> Vec<System> {
		(0..n)
			.map(|i| System::new(format!("s{i}"), format!("System {i}")))
			.collect()
	}

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn radius_is_capped() {
		let params = LayoutParams::default();
		assert_eq!(layout_radius(10, &params), 300.0);
		assert_eq!(layout_radius(2, &params), 100.0);
		assert_eq!(layout_radius(6, &params), 300.0);
		assert_eq!(layout_radius(5, &params), 250.0);
	}

	#[test]
	fn width_has_floor() {
		let params = LayoutParams::default();
		assert_eq!(node_width("A", &params), 150.0);
		assert_eq!(node_width("abcdefghijklmnopqrst", &params), 160.0);
	}

	#[test]
	fn empty_input_gives_empty_layout() {
		assert!(circular_layout(&[]).is_empty());
	}

	#[test]
	fn single_system_sits_at_angle_zero() {
		let layout = circular_layout(&systems(1));
		assert_eq!(layout.len(), 1);
		assert!(close(layout[0].position.x, 100.0));
		assert!(close(layout[0].position.y, 50.0));
	}

	#[test]
	fn two_systems_are_opposite() {
		let layout = circular_layout(&systems(2));
		assert!(close(layout[0].position.x, 200.0));
		assert!(close(layout[0].position.y, 100.0));
		assert!(close(layout[1].position.x, 0.0));
		assert!(close(layout[1].position.y, 100.0));
	}

	#[test]
	fn coordinates_are_non_negative() {
		for n in 1..20 {
			for placement in circular_layout(&systems(n)) {
				assert!(placement.position.x > -1e-9, "x negative for n={n}");
				assert!(placement.position.y > -1e-9, "y negative for n={n}");
			}
		}
	}

	#[test]
	fn layout_is_deterministic() {
		let input = systems(7);
		assert_eq!(circular_layout(&input), circular_layout(&input));
	}

	#[test]
	fn order_matters() {
		let mut input = systems(3);
		let before = circular_layout(&input);
		input.swap(0, 1);
		let after = circular_layout(&input);
		assert_ne!(before[0].position, after[1].position);
	}
}
