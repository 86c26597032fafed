//! Turns a topology into the initial node and edge records.

use std::collections::HashSet;

use log::{debug, warn};

use super::layout::circular_layout;
use super::style::resolve_style;
use super::types::{Connection, DiagramOptions, Edge, EdgeMetadata, Node, Topology};

/// Initial renderer-facing view of a topology.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphProjection {
	/// One node per system, in system order.
	pub nodes: Vec<Node>,
	/// One edge per connection, in connection order.
	pub edges: Vec<Edge>,
}

/// Lays out every system and styles every connection. Edge ids are the
/// connection's position in the input, so identical input projects
/// identically.
pub fn project(topology: &Topology, options: &DiagramOptions) -> GraphProjection {
	let systems = topology.systems();
	let nodes: Vec<Node> = systems
		.iter()
		.zip(circular_layout(systems))
		.map(|(system, placement)| Node {
			id: system.id.clone(),
			label: system.name.clone(),
			position: placement.position,
			visual_width: placement.visual_width,
			selected: false,
		})
		.collect();

	let known: HashSet<&str> = systems.iter().map(|s| s.id.as_str()).collect();
	let edges: Vec<Edge> = topology
		.connections()
		.iter()
		.enumerate()
		.map(|(i, connection)| {
			if !known.contains(connection.source.as_str()) || !known.contains(connection.target.as_str()) {
				warn!(
					"connection e{} references unknown system ({} -> {})",
					i, connection.source, connection.target
				);
			}
			build_edge(format!("e{i}"), connection, options.show_export_labels)
		})
		.collect();

	debug!("projected {} nodes, {} edges", nodes.len(), edges.len());
	GraphProjection { nodes, edges }
}

pub(crate) fn build_edge(id: String, connection: &Connection, show_label: bool) -> Edge {
	let style = resolve_style(connection);
	Edge {
		id,
		source: connection.source.clone(),
		target: connection.target.clone(),
		color: style.color,
		animated: style.animated,
		stroke_width: style.stroke_width,
		label: show_label.then(|| style.protocol_label.clone()),
		protocol_label: style.protocol_label,
		metadata: EdgeMetadata {
			direction: connection.direction,
			quality: connection.quality,
			volume: connection.volume,
		},
		selected: false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::integration_graph::types::{Quality, System};
	use pretty_assertions::assert_eq;

	fn topology() -> Topology {
		Topology::new(
			vec![System::new("ehr", "EHR"), System::new("lab", "Lab")],
			vec![
				Connection::new("ehr", "lab", Quality::Automated).with_volume(100.0),
				Connection::new("lab", "ehr", Quality::Manual),
			],
		)
		.unwrap()
	}

	#[test]
	fn edge_ids_follow_input_order() {
		let projection = project(&topology(), &DiagramOptions::default());
		let ids: Vec<&str> = projection.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["e0", "e1"]);
	}

	#[test]
	fn projection_is_reproducible() {
		let options = DiagramOptions::default();
		assert_eq!(project(&topology(), &options), project(&topology(), &options));
	}

	#[test]
	fn nodes_carry_system_identity() {
		let projection = project(&topology(), &DiagramOptions::default());
		assert_eq!(projection.nodes[0].id, "ehr");
		assert_eq!(projection.nodes[0].label, "EHR");
		assert_eq!(projection.nodes[1].visual_width, 150.0);
	}

	#[test]
	fn labels_follow_export_toggle() {
		let hidden = project(&topology(), &DiagramOptions::default());
		assert_eq!(hidden.edges[0].label, None);
		assert_eq!(hidden.edges[0].protocol_label, "HL7 FHIR");

		let shown = project(
			&topology(),
			&DiagramOptions {
				show_export_labels: true,
				..DiagramOptions::default()
			},
		);
		assert_eq!(shown.edges[0].label.as_deref(), Some("HL7 FHIR"));
		assert_eq!(shown.edges[1].label.as_deref(), Some("Manual Entry"));
	}

	#[test]
	fn dangling_edge_is_still_projected() {
		let topology = Topology::new(
			vec![System::new("ehr", "EHR")],
			vec![Connection::new("ehr", "pacs", Quality::SemiAutomated)],
		)
		.unwrap();
		let projection = project(&topology, &DiagramOptions::default());
		assert_eq!(projection.edges.len(), 1);
		assert_eq!(projection.edges[0].target, "pacs");
	}

	#[test]
	fn metadata_is_carried_through() {
		let projection = project(&topology(), &DiagramOptions::default());
		let meta = &projection.edges[0].metadata;
		assert_eq!(meta.quality, Quality::Automated);
		assert_eq!(meta.volume, Some(100.0));
	}
}
