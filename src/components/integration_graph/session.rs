//! Live, append-only diagram state fed by renderer events.

use std::collections::HashSet;

use log::{debug, info};
use serde::Serialize;

use super::projection::{GraphProjection, build_edge};
use super::types::{Connection, Direction, Edge, Node, Position, Quality, SystemId};

/// Incremental node update coming from the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeChange {
	/// The node was moved.
	Position {
		/// Node id.
		id: SystemId,
		/// New top-left corner.
		position: Position,
		/// Whether a drag is still in progress.
		dragging: bool,
	},
	/// The node was (de)selected.
	Select {
		/// Node id.
		id: SystemId,
		/// New selection state.
		selected: bool,
	},
}

/// Incremental edge update coming from the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgeChange {
	/// The edge was (de)selected.
	Select {
		/// Edge id.
		id: String,
		/// New selection state.
		selected: bool,
	},
}

/// A link drawn by the user between two nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectRequest {
	/// Node the gesture started on.
	pub source: SystemId,
	/// Node the gesture ended on.
	pub target: SystemId,
}

#[derive(Serialize)]
struct Snapshot<'a> {
	nodes: &'a [Node],
	edges: &'a [Edge],
}

/// Live node/edge state for one diagram view.
///
/// The edge set only grows: seeding replaces it, `on_connect` appends to it,
/// nothing removes from it.
#[derive(Clone, Debug, Default)]
pub struct DiagramSession {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	user_connections: Vec<ConnectRequest>,
	show_labels: bool,
	dragging: Option<SystemId>,
	revision: u64,
}

impl DiagramSession {
	/// A session seeded from a projection.
	pub fn new(projection: GraphProjection, show_labels: bool) -> Self {
		let mut session = Self {
			show_labels,
			..Self::default()
		};
		session.seed(projection.nodes, projection.edges);
		session
	}

	/// Replaces the whole state and clears the edit log.
	pub fn seed(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		debug!("seeding session with {} nodes, {} edges", nodes.len(), edges.len());
		self.nodes = nodes;
		self.edges = edges;
		self.user_connections.clear();
		self.dragging = None;
		self.revision += 1;
	}

	/// Merges renderer node updates. Unknown ids are skipped.
	pub fn on_nodes_changed(&mut self, changes: impl IntoIterator<Item = NodeChange>) {
		let mut touched = false;
		for change in changes {
			match change {
				NodeChange::Position {
					id,
					position,
					dragging,
				} => {
					let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
						continue;
					};
					node.position = position;
					touched = true;
					if dragging {
						self.dragging = Some(id);
					} else {
						debug!("node {} dropped at ({:.1}, {:.1})", id, position.x, position.y);
						if self.dragging.as_deref() == Some(id.as_str()) {
							self.dragging = None;
						}
					}
				}
				NodeChange::Select { id, selected } => {
					if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
						node.selected = selected;
						touched = true;
					}
				}
			}
		}
		if touched {
			self.revision += 1;
		}
	}

	/// Merges renderer edge updates. Unknown ids are skipped.
	pub fn on_edges_changed(&mut self, changes: impl IntoIterator<Item = EdgeChange>) {
		let mut touched = false;
		for change in changes {
			match change {
				EdgeChange::Select { id, selected } => {
					if let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) {
						edge.selected = selected;
						touched = true;
					}
				}
			}
		}
		if touched {
			self.revision += 1;
		}
	}

	/// Appends a user-drawn edge and returns its id. It carries no quality,
	/// so it takes the unrecognized style.
	pub fn on_connect(&mut self, request: ConnectRequest) -> String {
		let connection = Connection {
			source: request.source.clone(),
			target: request.target.clone(),
			direction: Direction::OneWay,
			quality: Quality::Unrecognized,
			volume: None,
		};
		let id = self.next_edge_id();
		info!("user connected {} -> {} as {}", request.source, request.target, id);
		self.edges.push(build_edge(id.clone(), &connection, self.show_labels));
		self.user_connections.push(request);
		self.revision += 1;
		id
	}

	fn next_edge_id(&self) -> String {
		let taken: HashSet<&str> = self.edges.iter().map(|e| e.id.as_str()).collect();
		(self.edges.len()..)
			.map(|n| format!("e{n}"))
			.find(|id| !taken.contains(id.as_str()))
			.unwrap_or_default()
	}

	/// Current nodes.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Current edges.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Looks up an edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Node being dragged, between the first and the final position change.
	pub fn dragging_node(&self) -> Option<&str> {
		self.dragging.as_deref()
	}

	/// Ids of the currently selected nodes.
	pub fn selected_nodes(&self) -> Vec<&str> {
		self.nodes
			.iter()
			.filter(|n| n.selected)
			.map(|n| n.id.as_str())
			.collect()
	}

	/// Connections the user drew since seeding, oldest first.
	pub fn user_connections(&self) -> &[ConnectRequest] {
		&self.user_connections
	}

	/// Bumped on every accepted change.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Current nodes and edges as JSON.
	pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(&Snapshot {
			nodes: &self.nodes,
			edges: &self.edges,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::integration_graph::projection::project;
	use crate::components::integration_graph::types::{DiagramOptions, System, Topology};
	use pretty_assertions::assert_eq;

	fn seeded() -> DiagramSession {
		let topology = Topology::new(
			vec![System::new("sysA", "A"), System::new("sysB", "B")],
			vec![
				Connection::new("sysA", "sysB", Quality::Automated),
				Connection::new("sysB", "sysA", Quality::Manual),
			],
		)
		.unwrap();
		DiagramSession::new(project(&topology, &DiagramOptions::default()), false)
	}

	fn connect(session: &mut DiagramSession, source: &str, target: &str) -> Edge {
		let id = session.on_connect(ConnectRequest {
			source: source.into(),
			target: target.into(),
		});
		session.edge(&id).cloned().unwrap()
	}

	#[test]
	fn connect_appends_default_styled_edge() {
		let mut session = seeded();
		let edge = connect(&mut session, "sysA", "sysB");
		assert_eq!(session.edges().len(), 3);
		assert_eq!(edge.id, "e2");
		assert_eq!(edge.color, "#888888");
		assert_eq!(edge.protocol_label, "Unknown");
		assert!(!edge.animated);
		assert_eq!(edge.stroke_width, 2.0);
		assert_eq!(edge.label, None);
		assert_eq!(session.user_connections().len(), 1);
	}

	#[test]
	fn connect_returns_id_of_appended_edge() {
		let mut session = seeded();
		let id = session.on_connect(ConnectRequest {
			source: "sysB".into(),
			target: "sysA".into(),
		});
		assert_eq!(session.edges().last().map(|e| e.id.as_str()), Some(id.as_str()));
		assert_eq!(session.edge(&id).map(|e| e.source.as_str()), Some("sysB"));
	}

	#[test]
	fn drag_is_tracked_until_drop() {
		let mut session = seeded();
		assert_eq!(session.dragging_node(), None);
		session.on_nodes_changed([NodeChange::Position {
			id: "sysA".into(),
			position: Position::new(5.0, 5.0),
			dragging: true,
		}]);
		assert_eq!(session.dragging_node(), Some("sysA"));
		session.on_nodes_changed([NodeChange::Position {
			id: "sysA".into(),
			position: Position::new(8.0, 9.0),
			dragging: false,
		}]);
		assert_eq!(session.dragging_node(), None);
		assert_eq!(session.node("sysA").map(|n| n.position), Some(Position::new(8.0, 9.0)));

		// unknown ids do not start a drag
		session.on_nodes_changed([NodeChange::Position {
			id: "ghost".into(),
			position: Position::new(0.0, 0.0),
			dragging: true,
		}]);
		assert_eq!(session.dragging_node(), None);
	}

	#[test]
	fn connect_ids_never_collide() {
		let mut session = seeded();
		let mut edges = session.edges().to_vec();
		edges[0].id = "e2".into();
		let nodes = session.nodes().to_vec();
		session.seed(nodes, edges);
		let edge = connect(&mut session, "sysA", "sysB");
		assert_eq!(edge.id, "e3");
		let again = connect(&mut session, "sysB", "sysA");
		assert_eq!(again.id, "e4");
	}

	#[test]
	fn connect_honours_label_toggle() {
		let mut session = DiagramSession::new(GraphProjection::default(), true);
		let edge = connect(&mut session, "x", "y");
		assert_eq!(edge.id, "e0");
		assert_eq!(edge.label.as_deref(), Some("Unknown"));
	}

	#[test]
	fn position_changes_are_merged() {
		let mut session = seeded();
		let before = session.revision();
		session.on_nodes_changed([NodeChange::Position {
			id: "sysB".into(),
			position: Position::new(12.0, 34.0),
			dragging: true,
		}]);
		assert_eq!(session.node("sysB").map(|n| n.position), Some(Position::new(12.0, 34.0)));
		assert_eq!(session.revision(), before + 1);
	}

	#[test]
	fn unknown_ids_are_ignored() {
		let mut session = seeded();
		let before = session.revision();
		session.on_nodes_changed([NodeChange::Select {
			id: "nope".into(),
			selected: true,
		}]);
		session.on_edges_changed([EdgeChange::Select {
			id: "e99".into(),
			selected: true,
		}]);
		assert_eq!(session.revision(), before);
		assert!(session.selected_nodes().is_empty());
	}

	#[test]
	fn selection_changes_are_merged() {
		let mut session = seeded();
		session.on_nodes_changed([NodeChange::Select {
			id: "sysA".into(),
			selected: true,
		}]);
		session.on_edges_changed([EdgeChange::Select {
			id: "e1".into(),
			selected: true,
		}]);
		assert_eq!(session.selected_nodes(), vec!["sysA"]);
		assert!(session.edge("e1").is_some_and(|e| e.selected));
	}

	#[test]
	fn seed_replaces_state() {
		let mut session = seeded();
		connect(&mut session, "sysA", "sysB");
		session.seed(vec![], vec![]);
		assert!(session.nodes().is_empty());
		assert!(session.edges().is_empty());
		assert!(session.user_connections().is_empty());
	}

	#[test]
	fn snapshot_uses_renderer_field_names() {
		let session = seeded();
		let json = session.snapshot_json().unwrap();
		assert!(json.contains("\"visualWidth\":"), "got: {json}");
		assert!(json.contains("\"strokeWidth\":"), "got: {json}");
		assert!(json.contains("\"protocolLabel\":\"HL7 FHIR\""), "got: {json}");
	}
}
