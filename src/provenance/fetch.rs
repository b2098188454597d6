//! Link Fetcher: pages of incoming/outgoing links from the AiiDA REST API.
//!
//! Queries look like
//! `{api}/nodes/{uuid}/links/{incoming|outgoing}?orderby=+ctime&full_type="…"&limit=n&offset=m`,
//! with the server-side total in the `X-Total-Count` response header.

use std::future::Future;

use log::{debug, error, warn};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::error::FetchError;
use super::types::{Category, Direction, LinkBundle, LinkDescriptor, LinkSet};
use crate::config::ExplorerConfig;

/// Header carrying the number of matches before paging.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Anything that can answer a links query for the configured subject.
pub trait LinkSource {
	/// Fetch one page of links filtered by `full_type`, oldest first.
	fn fetch_links(
		&self,
		full_type: &str,
		limit: usize,
		direction: Direction,
		offset: usize,
	) -> impl Future<Output = Result<LinkSet, FetchError>>;
}

/// [`LinkSource`] backed by HTTP. Uses the browser's `fetch` on WASM.
#[derive(Clone, Debug)]
pub struct HttpLinkSource {
	client: reqwest::Client,
	api_root: String,
	subject_uuid: String,
}

impl HttpLinkSource {
	/// Source for the API and subject named in `config`.
	pub fn new(config: &ExplorerConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			api_root: config.api_root().to_string(),
			subject_uuid: config.subject_uuid.clone(),
		}
	}

	/// URL of one page of links.
	pub fn links_url(&self, full_type: &str, limit: usize, direction: Direction, offset: usize) -> String {
		format!(
			"{}/nodes/{}/links/{}?orderby=+ctime&full_type=\"{}\"&limit={}&offset={}",
			self.api_root, self.subject_uuid, direction, full_type, limit, offset
		)
	}

	async fn get_page(&self, url: &str, direction: Direction) -> Result<LinkSet, FetchError> {
		let transport = |source| FetchError::Transport {
			url: url.to_string(),
			source,
		};

		let response = self.client.get(url).send().await.map_err(transport)?;
		let total_header = check_response(url, response.status(), response.headers())?;
		let body = response.text().await.map_err(transport)?;
		parse_link_page(direction, total_header.as_deref(), &body)
	}
}

impl LinkSource for HttpLinkSource {
	async fn fetch_links(
		&self,
		full_type: &str,
		limit: usize,
		direction: Direction,
		offset: usize,
	) -> Result<LinkSet, FetchError> {
		let url = self.links_url(full_type, limit, direction, offset);
		debug!("GET {}", url);
		let page = self.get_page(&url, direction).await;
		if let Err(e) = &page {
			error!("Error fetching {} links: {}", direction, e);
		}
		page
	}
}

/// Reject non-success statuses and pull out the raw `X-Total-Count` value.
pub fn check_response(
	url: &str,
	status: StatusCode,
	headers: &HeaderMap,
) -> Result<Option<String>, FetchError> {
	if !status.is_success() {
		return Err(FetchError::Status {
			url: url.to_string(),
			status: status.as_u16(),
		});
	}
	Ok(headers
		.get(TOTAL_COUNT_HEADER)
		.and_then(|v| v.to_str().ok())
		.map(str::to_owned))
}

#[derive(Deserialize)]
struct LinksResponse {
	#[serde(default)]
	data: Option<LinksData>,
}

#[derive(Deserialize)]
struct LinksData {
	incoming: Option<Vec<LinkDescriptor>>,
	outgoing: Option<Vec<LinkDescriptor>>,
}

/// Turn a response body and its `X-Total-Count` value into a [`LinkSet`].
///
/// Only the array matching `direction` is read. A missing or non-numeric total
/// falls back to the number of links returned.
pub fn parse_link_page(
	direction: Direction,
	total_count: Option<&str>,
	body: &str,
) -> Result<LinkSet, FetchError> {
	let response: LinksResponse = serde_json::from_str(body)?;
	let links = response
		.data
		.and_then(|data| match direction {
			Direction::Incoming => data.incoming,
			Direction::Outgoing => data.outgoing,
		})
		.ok_or(FetchError::MissingLinks(direction))?;

	let total_count = match total_count.map(|raw| raw.trim().parse::<usize>()) {
		Some(Ok(n)) => n,
		Some(Err(_)) | None => {
			warn!(
				"{} header missing or invalid ({:?}); assuming no further {} links",
				TOTAL_COUNT_HEADER, total_count, direction
			);
			links.len()
		}
	};

	Ok(LinkSet { total_count, links })
}

/// Per-category outcome of [`fetch_all_links`], in bundle order.
#[derive(Debug)]
pub struct BundleFetch {
	results: Vec<(Category, Result<LinkSet, FetchError>)>,
}

/// A bundle with failed categories left empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialBundle {
	/// Links that did arrive.
	pub bundle: LinkBundle,
	/// Categories whose fetch failed.
	pub failed: Vec<Category>,
}

impl BundleFetch {
	/// Categories that failed, in bundle order.
	pub fn failed(&self) -> impl Iterator<Item = Category> + '_ {
		self.results
			.iter()
			.filter(|(_, r)| r.is_err())
			.map(|(c, _)| *c)
	}

	/// All four sets, or the first error in bundle order.
	pub fn into_complete(self) -> Result<LinkBundle, FetchError> {
		let mut bundle = LinkBundle::default();
		for (category, result) in self.results {
			*bundle.get_mut(category) = result?;
		}
		Ok(bundle)
	}

	/// Whatever arrived, with failed categories recorded instead of blanking
	/// the whole bundle.
	pub fn into_partial(self) -> PartialBundle {
		let mut partial = PartialBundle::default();
		for (category, result) in self.results {
			match result {
				Ok(set) => *partial.bundle.get_mut(category) = set,
				Err(_) => partial.failed.push(category),
			}
		}
		partial
	}
}

/// Fetch the first page of all four categories, one after another.
pub async fn fetch_all_links<S: LinkSource>(source: &S, config: &ExplorerConfig) -> BundleFetch {
	let mut results = Vec::with_capacity(Category::ALL.len());
	for category in Category::ALL {
		let result = source
			.fetch_links(category.full_type(config), config.limit, category.direction(), 0)
			.await;
		results.push((category, result));
	}
	let fetch = BundleFetch { results };
	debug!("{:?}", fetch);
	fetch
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::HashMap;

	use futures::executor::block_on;
	use reqwest::header::{HeaderName, HeaderValue};

	use super::*;
	use crate::config::{DATA_FILTER, PROCESS_FILTER};

	fn set(total: usize, ids: &[&str]) -> LinkSet {
		LinkSet {
			total_count: total,
			links: ids
				.iter()
				.map(|id| LinkDescriptor { uuid: id.to_string() })
				.collect(),
		}
	}

	/// In-memory source; a missing entry behaves like a failed request.
	#[derive(Default)]
	struct StubSource {
		pages: HashMap<(Direction, String), LinkSet>,
		calls: RefCell<Vec<(String, usize, Direction, usize)>>,
	}

	impl StubSource {
		fn with(mut self, direction: Direction, full_type: &str, page: LinkSet) -> Self {
			self.pages.insert((direction, full_type.to_string()), page);
			self
		}
	}

	impl LinkSource for StubSource {
		async fn fetch_links(
			&self,
			full_type: &str,
			limit: usize,
			direction: Direction,
			offset: usize,
		) -> Result<LinkSet, FetchError> {
			self.calls
				.borrow_mut()
				.push((full_type.to_string(), limit, direction, offset));
			self.pages
				.get(&(direction, full_type.to_string()))
				.cloned()
				.ok_or(FetchError::MissingLinks(direction))
		}
	}

	fn full_stub() -> StubSource {
		StubSource::default()
			.with(Direction::Incoming, PROCESS_FILTER, set(1, &["calc"]))
			.with(Direction::Incoming, DATA_FILTER, set(5, &["a", "b", "c"]))
			.with(Direction::Outgoing, PROCESS_FILTER, set(0, &[]))
			.with(Direction::Outgoing, DATA_FILTER, set(2, &["x", "y"]))
	}

	#[test]
	fn url_matches_rest_layout() {
		let source = HttpLinkSource::new(&ExplorerConfig::default());
		assert_eq!(
			source.links_url(DATA_FILTER, 3, Direction::Incoming, 6),
			"https://aiida.materialscloud.org/autowannier/api/v4/nodes/\
			 9333b9e3-ae02-4c5c-9e9a-9e666b20c211/links/incoming\
			 ?orderby=+ctime&full_type=\"data.%25%7C%25\"&limit=3&offset=6"
		);
	}

	#[test]
	fn success_status_yields_total_header_case_insensitively() {
		let mut headers = HeaderMap::new();
		headers.insert(
			HeaderName::from_bytes(b"X-TOTAL-COUNT").unwrap(),
			HeaderValue::from_static("42"),
		);
		let total = check_response("http://api/nodes", StatusCode::OK, &headers).unwrap();
		assert_eq!(total.as_deref(), Some("42"));

		let mut headers = HeaderMap::new();
		headers.insert("x-total-count", HeaderValue::from_static("7"));
		let total = check_response("http://api/nodes", StatusCode::OK, &headers).unwrap();
		assert_eq!(total.as_deref(), Some("7"));
	}

	#[test]
	fn success_without_total_header_is_none() {
		let total = check_response("http://api/nodes", StatusCode::OK, &HeaderMap::new()).unwrap();
		assert_eq!(total, None);
	}

	#[test]
	fn error_status_is_reported_with_url() {
		let mut headers = HeaderMap::new();
		headers.insert("x-total-count", HeaderValue::from_static("3"));
		let err = check_response("http://api/nodes/x", StatusCode::NOT_FOUND, &headers).unwrap_err();
		match err {
			FetchError::Status { url, status } => {
				assert_eq!(url, "http://api/nodes/x");
				assert_eq!(status, 404);
			}
			other => panic!("unexpected error {other:?}"),
		}
		assert!(matches!(
			check_response("u", StatusCode::BAD_GATEWAY, &HeaderMap::new()),
			Err(FetchError::Status { status: 502, .. })
		));
	}

	#[test]
	fn parses_matching_direction_only() {
		let body = r#"{"data": {
			"incoming": [{"uuid": "in-1", "link_label": "structure"}],
			"outgoing": [{"uuid": "out-1"}, {"uuid": "out-2"}]
		}}"#;

		let incoming = parse_link_page(Direction::Incoming, Some("4"), body).unwrap();
		assert_eq!(incoming, set(4, &["in-1"]));

		let outgoing = parse_link_page(Direction::Outgoing, Some("2"), body).unwrap();
		assert_eq!(outgoing, set(2, &["out-1", "out-2"]));
	}

	#[test]
	fn missing_total_falls_back_to_page_length() {
		let body = r#"{"data": {"incoming": [{"uuid": "a"}, {"uuid": "b"}]}}"#;
		let page = parse_link_page(Direction::Incoming, None, body).unwrap();
		assert_eq!(page.total_count, 2);
		assert!(!page.is_truncated());

		let page = parse_link_page(Direction::Incoming, Some("many"), body).unwrap();
		assert_eq!(page.total_count, 2);
	}

	#[test]
	fn missing_direction_array_is_an_error() {
		let body = r#"{"data": {"incoming": []}}"#;
		let err = parse_link_page(Direction::Outgoing, Some("0"), body).unwrap_err();
		assert!(matches!(err, FetchError::MissingLinks(Direction::Outgoing)));

		let err = parse_link_page(Direction::Incoming, Some("0"), "{}").unwrap_err();
		assert!(matches!(err, FetchError::MissingLinks(Direction::Incoming)));
	}

	#[test]
	fn non_json_body_is_a_decode_error() {
		let err = parse_link_page(Direction::Incoming, Some("0"), "<html>502</html>").unwrap_err();
		assert!(matches!(err, FetchError::Decode(_)));
	}

	#[test]
	fn fetches_categories_sequentially_in_bundle_order() {
		let stub = full_stub();
		let config = ExplorerConfig::default();
		let bundle = block_on(fetch_all_links(&stub, &config))
			.into_complete()
			.unwrap();

		assert_eq!(
			*stub.calls.borrow(),
			vec![
				(PROCESS_FILTER.to_string(), 3, Direction::Incoming, 0),
				(DATA_FILTER.to_string(), 3, Direction::Incoming, 0),
				(PROCESS_FILTER.to_string(), 3, Direction::Outgoing, 0),
				(DATA_FILTER.to_string(), 3, Direction::Outgoing, 0),
			]
		);
		assert_eq!(bundle.input_logical, set(1, &["calc"]));
		assert_eq!(bundle.input_data, set(5, &["a", "b", "c"]));
		assert_eq!(bundle.output_logical, set(0, &[]));
		assert_eq!(bundle.output_data, set(2, &["x", "y"]));
	}

	#[test]
	fn one_failure_blanks_the_complete_bundle() {
		let stub = StubSource::default()
			.with(Direction::Incoming, PROCESS_FILTER, set(0, &[]))
			.with(Direction::Incoming, DATA_FILTER, set(1, &["a"]))
			.with(Direction::Outgoing, DATA_FILTER, set(0, &[]));
		let fetch = block_on(fetch_all_links(&stub, &ExplorerConfig::default()));

		assert_eq!(fetch.failed().collect::<Vec<_>>(), vec![Category::OutputLogical]);
		// every category is still attempted
		assert_eq!(stub.calls.borrow().len(), 4);
		assert!(matches!(
			fetch.into_complete(),
			Err(FetchError::MissingLinks(Direction::Outgoing))
		));
	}

	#[test]
	fn partial_bundle_keeps_successful_categories() {
		let stub = StubSource::default()
			.with(Direction::Incoming, DATA_FILTER, set(1, &["a"]))
			.with(Direction::Outgoing, DATA_FILTER, set(1, &["z"]));
		let partial = block_on(fetch_all_links(&stub, &ExplorerConfig::default())).into_partial();

		assert_eq!(
			partial.failed,
			vec![Category::InputLogical, Category::OutputLogical]
		);
		assert_eq!(partial.bundle.input_data, set(1, &["a"]));
		assert_eq!(partial.bundle.output_data, set(1, &["z"]));
		assert_eq!(partial.bundle.input_logical, LinkSet::default());
	}

	#[test]
	fn limit_comes_from_config() {
		let stub = full_stub();
		let config = ExplorerConfig {
			limit: 10,
			..ExplorerConfig::default()
		};
		block_on(fetch_all_links(&stub, &config));
		assert!(stub.calls.borrow().iter().all(|(_, limit, _, _)| *limit == 10));
	}
}
