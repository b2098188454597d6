use std::fmt;

use serde::Deserialize;

use crate::config::ExplorerConfig;

/// A node related to the subject. The API sends more fields; only `uuid` is used.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LinkDescriptor {
	/// Related node identifier.
	pub uuid: String,
}

/// One page of links plus the server-side total for the same query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkSet {
	/// Matches on the server, regardless of page size.
	pub total_count: usize,
	/// Links in ascending creation time.
	pub links: Vec<LinkDescriptor>,
}

impl LinkSet {
	/// Whether the server holds links beyond this page.
	pub fn is_truncated(&self) -> bool {
		self.links.len() < self.total_count
	}
}

/// Link direction relative to the subject node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
	/// Links pointing into the subject.
	Incoming,
	/// Links leaving the subject.
	Outgoing,
}

impl Direction {
	/// Path segment and response field name.
	pub fn as_str(self) -> &'static str {
		match self {
			Direction::Incoming => "incoming",
			Direction::Outgoing => "outgoing",
		}
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The four link groups drawn around the subject, in bundle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
	/// Incoming process links.
	InputLogical,
	/// Incoming data links.
	InputData,
	/// Outgoing process links.
	OutputLogical,
	/// Outgoing data links.
	OutputData,
}

impl Category {
	/// Fetch and layout order.
	pub const ALL: [Category; 4] = [
		Category::InputLogical,
		Category::InputData,
		Category::OutputLogical,
		Category::OutputData,
	];

	/// Link direction queried for this category.
	pub fn direction(self) -> Direction {
		match self {
			Category::InputLogical | Category::InputData => Direction::Incoming,
			Category::OutputLogical | Category::OutputData => Direction::Outgoing,
		}
	}

	/// Whether this category holds process nodes rather than data nodes.
	pub fn is_logical(self) -> bool {
		matches!(self, Category::InputLogical | Category::OutputLogical)
	}

	/// `full_type` filter for this category.
	pub fn full_type(self, config: &ExplorerConfig) -> &str {
		if self.is_logical() {
			&config.process_filter
		} else {
			&config.data_filter
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Category::InputLogical => "logical inputs",
			Category::InputData => "data inputs",
			Category::OutputLogical => "logical outputs",
			Category::OutputData => "data outputs",
		})
	}
}

/// The four link sets fetched for one subject.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkBundle {
	/// Incoming process links.
	pub input_logical: LinkSet,
	/// Incoming data links.
	pub input_data: LinkSet,
	/// Outgoing process links.
	pub output_logical: LinkSet,
	/// Outgoing data links.
	pub output_data: LinkSet,
}

impl LinkBundle {
	/// Link set for one category.
	pub fn get(&self, category: Category) -> &LinkSet {
		match category {
			Category::InputLogical => &self.input_logical,
			Category::InputData => &self.input_data,
			Category::OutputLogical => &self.output_logical,
			Category::OutputData => &self.output_data,
		}
	}

	/// Mutable link set for one category.
	pub fn get_mut(&mut self, category: Category) -> &mut LinkSet {
		match category {
			Category::InputLogical => &mut self.input_logical,
			Category::InputData => &mut self.input_data,
			Category::OutputLogical => &mut self.output_logical,
			Category::OutputData => &mut self.output_data,
		}
	}
}
