//! Quality and volume to visual encoding of a connection.

use super::types::{Connection, Quality};

/// Line thickness when a connection carries no volume.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
const MIN_STROKE_WIDTH: f64 = 1.0;
const MAX_STROKE_WIDTH: f64 = 5.0;
const VOLUME_PER_STROKE: f64 = 20.0;

/// Visual encoding of one connection quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityStyle {
	/// Stroke colour as `#rrggbb`.
	pub color: &'static str,
	/// Protocol shown for this quality.
	pub protocol_label: &'static str,
	/// Whether the line is animated.
	pub animated: bool,
}

/// Fully resolved style for an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Stroke colour as `#rrggbb`.
	pub color: String,
	/// Protocol shown for this connection.
	pub protocol_label: String,
	/// Whether the line is animated.
	pub animated: bool,
	/// Line thickness.
	pub stroke_width: f64,
}

/// Fixed quality → style table. Unrecognized qualities get the gray arm.
pub fn quality_style(quality: Quality) -> QualityStyle {
	match quality {
		Quality::Automated => QualityStyle {
			color: "#4ade80",
			protocol_label: "HL7 FHIR",
			animated: true,
		},
		Quality::SemiAutomated => QualityStyle {
			color: "#fb923c",
			protocol_label: "HL7 v2",
			animated: false,
		},
		Quality::Manual => QualityStyle {
			color: "#ef4444",
			protocol_label: "Manual Entry",
			animated: false,
		},
		Quality::Unrecognized => QualityStyle {
			color: "#888888",
			protocol_label: "Unknown",
			animated: false,
		},
	}
}

/// `clamp(volume / 20, 1, 5)`, or the default when volume is absent or NaN.
pub fn stroke_width(volume: Option<f64>) -> f64 {
	match volume {
		Some(v) if !v.is_nan() => (v / VOLUME_PER_STROKE).clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH),
		_ => DEFAULT_STROKE_WIDTH,
	}
}

/// Resolves colour, label, animation and thickness for a connection.
pub fn resolve_style(connection: &Connection) -> EdgeStyle {
	let style = quality_style(connection.quality);
	EdgeStyle {
		color: style.color.to_string(),
		protocol_label: style.protocol_label.to_string(),
		animated: style.animated,
		stroke_width: stroke_width(connection.volume),
	}
}
