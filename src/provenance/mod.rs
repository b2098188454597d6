//! Provenance links of one AiiDA node: fetching them and laying them out.

mod error;
mod fetch;
mod layout;
mod types;

pub use error::FetchError;
pub use fetch::{
	BundleFetch, HttpLinkSource, LinkSource, PartialBundle, TOTAL_COUNT_HEADER, check_response,
	fetch_all_links, parse_link_page,
};
pub use layout::{PLACEHOLDER_ID, PLACEHOLDER_LABEL, build_layout, central_node};
pub use types::{Category, Direction, LinkBundle, LinkDescriptor, LinkSet};
