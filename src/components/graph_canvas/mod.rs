mod component;
mod render;
mod state;
mod types;

pub use component::GraphCanvas;
pub use types::{EdgeStroke, GraphEdge, GraphLayout, GraphNode, HandleSide, NodeFill, Position};
