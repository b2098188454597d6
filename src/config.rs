//! Explorer configuration: which API to talk to, which node to centre on and
//! where the layout places things.
//!
//! Defaults point at the Materials Cloud autowannier database. A deployment can
//! replace any field with a JSON block in the page (see [`ExplorerConfig::from_json`]),
//! and `api`, `uuid` and `limit` can then be overridden from the page URL,
//! e.g. `/?uuid=<node>&limit=5`.

use serde::Deserialize;
use thiserror::Error;

/// AiiDA REST API root.
pub const DEFAULT_API_URL: &str = "https://aiida.materialscloud.org/autowannier/api/v4/";
/// Node shown when no `uuid` is given.
pub const DEFAULT_SUBJECT_UUID: &str = "9333b9e3-ae02-4c5c-9e9a-9e666b20c211";
/// Links fetched per category.
pub const DEFAULT_LIMIT: usize = 3;

/// `process.%|%`, already percent-encoded for the query string.
pub const PROCESS_FILTER: &str = "process.%25%7C%25";
/// `data.%|%`, already percent-encoded for the query string.
pub const DATA_FILTER: &str = "data.%25%7C%25";

/// Errors raised while applying URL overrides.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	/// A numeric override could not be parsed.
	#[error("invalid value {value:?} for `{key}`: expected {expected}")]
	InvalidValue {
		/// Query key.
		key: &'static str,
		/// Raw value from the URL.
		value: String,
		/// What was expected instead.
		expected: &'static str,
	},
	/// A text override was present but empty.
	#[error("`{0}` must not be empty")]
	Empty(&'static str),
	/// The embedded JSON configuration did not parse.
	#[error("invalid explorer configuration: {0}")]
	Malformed(String),
}

/// Fixed coordinates of the layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutOrigins {
	/// x of the subject node.
	pub central_x: f64,
	/// y of the subject node; every category stacks relative to it.
	pub central_y: f64,
	/// Column for incoming links.
	pub input_x: f64,
	/// Column for outgoing links.
	pub output_x: f64,
}

impl Default for LayoutOrigins {
	fn default() -> Self {
		Self {
			central_x: 600.0,
			central_y: 600.0,
			input_x: 200.0,
			output_x: 1000.0,
		}
	}
}

/// Everything the fetcher and layout builder need to know.
///
/// Missing fields in JSON take their default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// REST API root, with or without trailing slash.
	pub api_url: String,
	/// Node whose links are shown.
	pub subject_uuid: String,
	/// Page size per category.
	pub limit: usize,
	/// `full_type` filter matching process nodes.
	pub process_filter: String,
	/// `full_type` filter matching data nodes.
	pub data_filter: String,
	/// Layout coordinates.
	pub origins: LayoutOrigins,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			subject_uuid: DEFAULT_SUBJECT_UUID.to_string(),
			limit: DEFAULT_LIMIT,
			process_filter: PROCESS_FILTER.to_string(),
			data_filter: DATA_FILTER.to_string(),
			origins: LayoutOrigins::default(),
		}
	}
}

impl ExplorerConfig {
	/// Parse a JSON object such as
	/// `{"subject_uuid": "…", "limit": 5, "origins": {"central_y": 400}}`.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))
	}

	/// Apply overrides looked up by query key (`api`, `uuid`, `limit`).
	///
	/// Unknown keys are never asked for, so extra query parameters are ignored.
	pub fn with_overrides(
		mut self,
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<Self, ConfigError> {
		if let Some(api) = lookup("api") {
			let api = api.trim();
			if api.is_empty() {
				return Err(ConfigError::Empty("api"));
			}
			self.api_url = api.to_string();
		}
		if let Some(uuid) = lookup("uuid") {
			let uuid = uuid.trim();
			if uuid.is_empty() {
				return Err(ConfigError::Empty("uuid"));
			}
			self.subject_uuid = uuid.to_string();
		}
		if let Some(raw) = lookup("limit") {
			self.limit = match raw.trim().parse::<usize>() {
				Ok(n) if n > 0 => n,
				_ => {
					return Err(ConfigError::InvalidValue {
						key: "limit",
						value: raw,
						expected: "a positive integer",
					});
				}
			};
		}
		Ok(self)
	}

	/// API root without a trailing slash.
	pub fn api_root(&self) -> &str {
		self.api_url.trim_end_matches('/')
	}
}
