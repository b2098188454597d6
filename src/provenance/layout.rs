//! Layout Builder: fixed two-column placement of the subject's links.
//!
//! Incoming links sit in the left column, outgoing links in the right one. Each
//! category stacks from its own start offset relative to the subject node; no
//! collision handling is done, large pages simply overlap.

use super::types::{Category, Direction, LinkBundle};
use crate::components::graph_canvas::{EdgeStroke, GraphEdge, GraphLayout, GraphNode, NodeFill};
use crate::config::{ExplorerConfig, LayoutOrigins};

/// Id of the synthetic "Load more" node.
pub const PLACEHOLDER_ID: &str = "abc";
/// Label of the synthetic "Load more" node.
pub const PLACEHOLDER_LABEL: &str = "Load more";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
	/// Oldest first, growing away from the start offset.
	Forward,
	/// Newest first.
	Reverse,
}

/// Placement and styling of one category.
#[derive(Clone, Copy, Debug)]
struct CategoryPolicy {
	category: Category,
	y_offset: f64,
	y_step: f64,
	order: Order,
	fill: NodeFill,
	stroke: EdgeStroke,
	placeholder: bool,
}

/// Only outgoing process links are dashed; incoming ones stay solid.
const POLICIES: [CategoryPolicy; 4] = [
	CategoryPolicy {
		category: Category::InputLogical,
		y_offset: -200.0,
		y_step: -50.0,
		order: Order::Reverse,
		fill: NodeFill::Yellow,
		stroke: EdgeStroke::Solid,
		placeholder: false,
	},
	CategoryPolicy {
		category: Category::InputData,
		y_offset: 0.0,
		y_step: 100.0,
		order: Order::Forward,
		fill: NodeFill::LightGreen,
		stroke: EdgeStroke::Solid,
		placeholder: true,
	},
	CategoryPolicy {
		category: Category::OutputLogical,
		y_offset: -150.0,
		y_step: -100.0,
		order: Order::Reverse,
		fill: NodeFill::Yellow,
		stroke: EdgeStroke::Dashed,
		placeholder: false,
	},
	CategoryPolicy {
		category: Category::OutputData,
		y_offset: 0.0,
		y_step: 100.0,
		order: Order::Forward,
		fill: NodeFill::LightGreen,
		stroke: EdgeStroke::Solid,
		placeholder: false,
	},
];

/// The subject node, labelled with its own uuid.
pub fn central_node(config: &ExplorerConfig) -> GraphNode {
	GraphNode::new(
		config.subject_uuid.clone(),
		config.subject_uuid.clone(),
		config.origins.central_x,
		config.origins.central_y,
	)
}

/// Place every link of `bundle` around `central`.
///
/// Pure: the same bundle and central node always give the same layout.
pub fn build_layout(bundle: &LinkBundle, central: &GraphNode, origins: &LayoutOrigins) -> GraphLayout {
	let mut layout = GraphLayout {
		nodes: vec![central.clone()],
		edges: Vec::new(),
	};

	for policy in &POLICIES {
		let set = bundle.get(policy.category);
		let direction = policy.category.direction();
		let x = match direction {
			Direction::Incoming => origins.input_x,
			Direction::Outgoing => origins.output_x,
		};
		let mut y = central.position.y + policy.y_offset;

		let mut place = |id: &str, label: &str, fill: NodeFill| {
			layout
				.nodes
				.push(GraphNode::new(id, label, x, y).with_fill(fill));
			layout
				.edges
				.push(edge_to_central(id, &central.id, direction, policy.stroke));
			y += policy.y_step;
		};

		match policy.order {
			Order::Forward => set
				.links
				.iter()
				.for_each(|link| place(&link.uuid, &link.uuid, policy.fill)),
			Order::Reverse => set
				.links
				.iter()
				.rev()
				.for_each(|link| place(&link.uuid, &link.uuid, policy.fill)),
		}

		if policy.placeholder && set.is_truncated() {
			place(PLACEHOLDER_ID, PLACEHOLDER_LABEL, NodeFill::LightBlue);
		}
	}

	layout
}

fn edge_to_central(other: &str, central: &str, direction: Direction, stroke: EdgeStroke) -> GraphEdge {
	let (source, target) = match direction {
		Direction::Incoming => (other, central),
		Direction::Outgoing => (central, other),
	};
	GraphEdge {
		id: format!("{}-{}", other, central),
		source: source.to_string(),
		target: target.to_string(),
		stroke,
	}
}
