use thiserror::Error;

use super::types::Direction;

/// Why a page of links could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
	/// The request never produced a response, or the body could not be read.
	#[error("request to {url} failed: {source}")]
	Transport {
		/// Requested URL.
		url: String,
		/// Underlying client error.
		#[source]
		source: reqwest::Error,
	},

	/// The server answered with a non-success status.
	#[error("HTTP {status} from {url}")]
	Status {
		/// Requested URL.
		url: String,
		/// Status code.
		status: u16,
	},

	/// The body was not JSON of the expected shape.
	#[error("malformed links response: {0}")]
	Decode(#[from] serde_json::Error),

	/// The body had no `data.incoming` / `data.outgoing` array.
	#[error("response has no `data.{0}` array")]
	MissingLinks(Direction),
}
