use super::projection::project;
use super::session::{ConnectRequest, DiagramSession, NodeChange};
use super::types::{DiagramOptions, Node, Position, SystemId, Topology};

pub const NODE_HEIGHT: f64 = 40.0;
pub const HIT_PADDING: f64 = 4.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Margin kept around the circle when fitting it into the canvas.
const FIT_MARGIN: f64 = 80.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<SystemId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Shift-drag from one node towards another.
#[derive(Clone, Debug, Default)]
pub struct ConnectGesture {
	pub source: Option<SystemId>,
	/// Cursor in graph space, for the preview line.
	pub cursor: Position,
}

pub struct CanvasState {
	pub session: DiagramSession,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub connect: ConnectGesture,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl CanvasState {
	pub fn new(topology: &Topology, options: &DiagramOptions, width: f64, height: f64) -> Self {
		let session = DiagramSession::new(project(topology, options), options.show_export_labels);
		let mut state = Self {
			session,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			connect: ConnectGesture::default(),
			width,
			height,
			flow_time: 0.0,
		};
		state.fit_to_view();
		state
	}

	/// Centres the node bounding box in the canvas, shrinking if needed.
	pub fn fit_to_view(&mut self) {
		let nodes = self.session.nodes();
		if nodes.is_empty() {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		}
		let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
		let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
		for node in nodes {
			min_x = min_x.min(node.position.x);
			min_y = min_y.min(node.position.y);
			max_x = max_x.max(node.position.x + node.visual_width);
			max_y = max_y.max(node.position.y + NODE_HEIGHT);
		}
		let (bw, bh) = (max_x - min_x, max_y - min_y);
		let k = ((self.width - FIT_MARGIN) / bw)
			.min((self.height - FIT_MARGIN) / bh)
			.clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (min_x + bw / 2.0) * k,
			y: self.height / 2.0 - (min_y + bh / 2.0) * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node whose box contains the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<&Node> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// later nodes paint on top
		self.session.nodes().iter().rev().find(|node| {
			gx >= node.position.x - HIT_PADDING
				&& gx <= node.position.x + node.visual_width + HIT_PADDING
				&& gy >= node.position.y - HIT_PADDING
				&& gy <= node.position.y + NODE_HEIGHT + HIT_PADDING
		})
	}

	/// Selects the node under the cursor (clearing other selections) and
	/// starts either a drag or, with shift held, a connect gesture.
	pub fn press(&mut self, sx: f64, sy: f64, shift: bool) {
		let hit = self
			.node_at_position(sx, sy)
			.map(|n| (n.id.clone(), n.position));
		let Some((id, node_pos)) = hit else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
			return;
		};

		let changes: Vec<NodeChange> = self
			.session
			.nodes()
			.iter()
			.filter(|n| n.selected != (n.id == id))
			.map(|n| NodeChange::Select {
				id: n.id.clone(),
				selected: n.id == id,
			})
			.collect();
		self.session.on_nodes_changed(changes);

		if shift {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.connect = ConnectGesture {
				source: Some(id),
				cursor: Position::new(gx, gy),
			};
		} else {
			self.drag = DragState {
				active: true,
				node_id: Some(id),
				start_x: sx,
				start_y: sy,
				node_start: node_pos,
			};
		}
	}

	pub fn move_to(&mut self, sx: f64, sy: f64) {
		if self.connect.source.is_some() {
			let (gx, gy) = self.screen_to_graph(sx, sy);
			self.connect.cursor = Position::new(gx, gy);
		} else if self.drag.active {
			if let Some(id) = self.drag.node_id.clone() {
				let position = self.dragged_position(sx, sy);
				self.session.on_nodes_changed([NodeChange::Position {
					id,
					position,
					dragging: true,
				}]);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Ends whatever gesture is running; a connect gesture released over a
	/// different node appends an edge.
	pub fn release(&mut self, sx: f64, sy: f64) {
		if let Some(source) = self.connect.source.take() {
			let target = self
				.node_at_position(sx, sy)
				.map(|n| n.id.clone())
				.filter(|id| *id != source);
			if let Some(target) = target {
				self.session.on_connect(ConnectRequest { source, target });
			}
		}
		if self.drag.active {
			if let Some(id) = self.drag.node_id.take() {
				let position = self.dragged_position(sx, sy);
				self.session.on_nodes_changed([NodeChange::Position {
					id,
					position,
					dragging: false,
				}]);
			}
		}
		self.cancel();
	}

	/// Abandons any gesture; a node being dragged stays where it is.
	pub fn cancel(&mut self) {
		if let Some(id) = self.drag.node_id.take() {
			if let Some(position) = self.session.node(&id).map(|n| n.position) {
				self.session.on_nodes_changed([NodeChange::Position {
					id,
					position,
					dragging: false,
				}]);
			}
		}
		self.drag = DragState::default();
		self.pan.active = false;
		self.connect.source = None;
	}

	pub fn zoom(&mut self, sx: f64, sy: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	fn dragged_position(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			self.drag.node_start.x + (sx - self.drag.start_x) / self.transform.k,
			self.drag.node_start.y + (sy - self.drag.start_y) / self.transform.k,
		)
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
