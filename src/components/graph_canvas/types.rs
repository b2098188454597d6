use serde::Serialize;

/// Top-left corner of a node box in graph space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Position {
	/// Horizontal graph coordinate.
	pub x: f64,
	/// Vertical graph coordinate, growing downwards.
	pub y: f64,
}

/// Side of a node box where an edge attaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
	/// Left edge, middle.
	Left,
	/// Right edge, middle.
	Right,
}

/// Background colour of a node box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeFill {
	/// Process nodes.
	Yellow,
	/// Data nodes.
	LightGreen,
	/// The "Load more" placeholder.
	LightBlue,
}

impl NodeFill {
	/// CSS colour name.
	pub fn css(self) -> &'static str {
		match self {
			NodeFill::Yellow => "yellow",
			NodeFill::LightGreen => "lightgreen",
			NodeFill::LightBlue => "lightblue",
		}
	}
}

/// Line style of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStroke {
	#[default]
	/// Data edges.
	Solid,
	/// Outgoing process edges.
	Dashed,
}

/// A positioned, labelled node box.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
	/// Node uuid, or the placeholder id.
	pub id: String,
	/// Text drawn inside the box.
	pub label: String,
	/// Top-left corner.
	pub position: Position,
	/// Where outgoing edges leave.
	pub source_side: HandleSide,
	/// Where incoming edges arrive.
	pub target_side: HandleSide,
	/// Background colour; white when unset.
	pub fill: Option<NodeFill>,
}

impl GraphNode {
	/// Node with edges leaving on the right and arriving on the left.
	pub fn new(id: impl Into<String>, label: impl Into<String>, x: f64, y: f64) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			position: Position { x, y },
			source_side: HandleSide::Right,
			target_side: HandleSide::Left,
			fill: None,
		}
	}

	/// Same node with a background colour.
	pub fn with_fill(mut self, fill: NodeFill) -> Self {
		self.fill = Some(fill);
		self
	}
}

/// A directed edge between two node ids.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphEdge {
	/// `<other>-<central>` regardless of direction.
	pub id: String,
	/// Node the edge leaves.
	pub source: String,
	/// Node the edge points at.
	pub target: String,
	/// Line style.
	pub stroke: EdgeStroke,
}

/// Everything the canvas draws.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphLayout {
	/// Subject node first, then links in category order.
	pub nodes: Vec<GraphNode>,
	/// One edge per linked node.
	pub edges: Vec<GraphEdge>,
}
