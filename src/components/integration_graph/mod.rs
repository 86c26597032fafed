//! Integration topology diagram: model, layout, styling, projection and the
//! live session behind the interactive canvas.

mod canvas;
mod component;
pub mod layout;
pub mod projection;
mod render;
pub mod session;
pub mod style;
pub mod types;

pub use component::IntegrationDiagram;
pub use layout::{LayoutParams, NodePlacement, circular_layout, circular_layout_with};
pub use projection::{GraphProjection, project};
pub use session::{ConnectRequest, DiagramSession, EdgeChange, NodeChange};
pub use style::{EdgeStyle, QualityStyle, resolve_style};
pub use types::{
	Connection, DiagramOptions, Direction, Edge, EdgeMetadata, Node, Position, Quality, System,
	SystemId, Topology, TopologyError,
};
