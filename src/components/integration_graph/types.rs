//! Topology model and the renderer-facing node/edge records derived from it.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a [`System`], assigned by the caller.
pub type SystemId = String;

/// Errors surfaced while building a [`Topology`].
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
	/// Two systems in the input share the same id.
	#[error("duplicate system id: {0}")]
	DuplicateSystemId(SystemId),
	/// The topology document could not be parsed.
	#[error("invalid topology document: {0}")]
	Parse(#[from] serde_json::Error),
}

/// A participant in the integration landscape (EHR, lab system, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct System {
	/// Unique id within one topology.
	pub id: SystemId,
	/// Display label.
	pub name: String,
}

impl System {
	/// Convenience constructor.
	pub fn new(id: impl Into<SystemId>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
		}
	}
}

/// Whether data flows one way or both ways across a connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
	/// Data flows from source to target only.
	#[default]
	OneWay,
	/// Data flows both ways.
	Bidirectional,
}

/// Automation level of a data exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quality {
	/// Fully automated interface.
	Automated,
	/// Partly automated, some human handling.
	SemiAutomated,
	/// Data is keyed in by hand.
	Manual,
	/// Anything else, including user-drawn connections with no quality.
	#[default]
	#[serde(other)]
	Unrecognized,
}

/// A data-exchange relationship between two systems.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
	/// Sending system.
	pub source: SystemId,
	/// Receiving system.
	pub target: SystemId,
	/// Flow direction.
	#[serde(default)]
	pub direction: Direction,
	/// Automation level.
	#[serde(default, deserialize_with = "lenient_quality")]
	pub quality: Quality,
	/// Messages per period, when known.
	#[serde(default)]
	pub volume: Option<f64>,
}

/// Anything that is not one of the known quality names, including `null`
/// and non-string values, reads as [`Quality::Unrecognized`].
fn lenient_quality<'de, D>(deserializer: D) -> Result<Quality, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(value
		.and_then(|v| serde_json::from_value(v).ok())
		.unwrap_or_default())
}

impl Connection {
	/// A one-way connection with no volume.
	pub fn new(source: impl Into<SystemId>, target: impl Into<SystemId>, quality: Quality) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			direction: Direction::OneWay,
			quality,
			volume: None,
		}
	}

	/// Sets the direction.
	pub fn with_direction(mut self, direction: Direction) -> Self {
		self.direction = direction;
		self
	}

	/// Sets the message volume.
	pub fn with_volume(mut self, volume: f64) -> Self {
		self.volume = Some(volume);
		self
	}
}

/// Validated set of systems and connections describing one landscape.
///
/// System ids are unique. Connections may reference unknown ids; those are
/// kept and later dropped by the renderer when it cannot find an anchor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
	systems: Vec<System>,
	connections: Vec<Connection>,
}

#[derive(Deserialize)]
struct TopologyDocument {
	#[serde(default)]
	systems: Vec<System>,
	#[serde(default)]
	connections: Vec<Connection>,
}

impl Topology {
	/// Builds a topology, rejecting duplicate system ids.
	pub fn new(systems: Vec<System>, connections: Vec<Connection>) -> Result<Self, TopologyError> {
		let mut seen = HashSet::with_capacity(systems.len());
		for system in &systems {
			if !seen.insert(system.id.as_str()) {
				return Err(TopologyError::DuplicateSystemId(system.id.clone()));
			}
		}
		Ok(Self {
			systems,
			connections,
		})
	}

	/// Parses `{"systems": [...], "connections": [...]}`.
	pub fn from_json(json: &str) -> Result<Self, TopologyError> {
		let doc: TopologyDocument = serde_json::from_str(json)?;
		Self::new(doc.systems, doc.connections)
	}

	/// Systems in input order.
	pub fn systems(&self) -> &[System] {
		&self.systems
	}

	/// Connections in input order.
	pub fn connections(&self) -> &[Connection] {
		&self.connections
	}

	/// Looks up a system by id.
	pub fn system(&self, id: &str) -> Option<&System> {
		self.systems.iter().find(|s| s.id == id)
	}

	/// Connections whose source or target is not a known system.
	pub fn dangling_connections(&self) -> Vec<&Connection> {
		let ids: HashSet<&str> = self.systems.iter().map(|s| s.id.as_str()).collect();
		self.connections
			.iter()
			.filter(|c| !ids.contains(c.source.as_str()) || !ids.contains(c.target.as_str()))
			.collect()
	}
}

/// Presentation options supplied alongside the topology.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagramOptions {
	/// Heading shown over the diagram.
	pub title: Option<String>,
	/// Secondary heading.
	pub subtitle: Option<String>,
	/// Draw each edge's protocol label on the diagram.
	pub show_export_labels: bool,
}

/// A point in diagram space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Convenience constructor.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Renderer-facing box for one system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	/// Same as the system id.
	pub id: SystemId,
	/// Same as the system name.
	pub label: String,
	/// Top-left corner; owned by the renderer after seeding.
	pub position: Position,
	/// Box width wide enough for the label.
	pub visual_width: f64,
	/// Selection flag maintained by the renderer.
	#[serde(default)]
	pub selected: bool,
}

/// Semantic attributes carried through to the renderer untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
	/// Flow direction of the source connection.
	pub direction: Direction,
	/// Automation level of the source connection.
	pub quality: Quality,
	/// Message volume of the source connection.
	pub volume: Option<f64>,
}

/// Renderer-facing line for one connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	/// Stable id, `e{index}`.
	pub id: String,
	/// Source node id.
	pub source: SystemId,
	/// Target node id.
	pub target: SystemId,
	/// Stroke colour as `#rrggbb`.
	pub color: String,
	/// Whether the renderer should animate the line.
	pub animated: bool,
	/// Line thickness.
	pub stroke_width: f64,
	/// Protocol name derived from the quality.
	pub protocol_label: String,
	/// Visible label; set only when export labels are shown.
	pub label: Option<String>,
	/// Original connection attributes.
	pub metadata: EdgeMetadata,
	/// Selection flag maintained by the renderer.
	#[serde(default)]
	pub selected: bool,
}
