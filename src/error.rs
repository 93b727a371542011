//! Client-level error types shared by the dispatcher, transports, and configuration.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, I/O).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the requested type.
	#[error("Response body could not be decoded at `{}`.", .source.path())]
	Decode {
		/// Structured decoding failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},

	/// The API key was rejected (HTTP 401).
	#[error("Unauthorized: the API key was rejected.")]
	Unauthorized,
	/// The API key lacks permission for the resource (HTTP 403).
	#[error("Forbidden: insufficient permissions for this resource.")]
	Forbidden,
	/// The resource does not exist (HTTP 404).
	#[error("Not found: the requested resource does not exist.")]
	NotFound,
	/// The server throttled the request (HTTP 429).
	///
	/// This is the server's quota, unrelated to the local [`RateLimiter`](crate::rate_limit::RateLimiter).
	#[error("Too many requests: the server rate limit was exceeded.")]
	RateLimited {
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Any other non-success HTTP status.
	#[error("API error ({status}): {message}.")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Message from the response body, the status text, or a generic fallback.
		message: String,
	},
	/// The local rate limiter was shut down while the caller was waiting or before it asked.
	#[error("The request rate limiter has been shut down.")]
	LimiterClosed,
}
impl Error {
	/// Returns the HTTP status code tied to this error, if the server produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unauthorized => Some(401),
			Self::Forbidden => Some(403),
			Self::NotFound => Some(404),
			Self::RateLimited { .. } => Some(429),
			Self::Api { status, .. } => Some(*status),
			_ => None,
		}
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
	fn from(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Decode { source }
	}
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No API key was supplied.
	#[error("API key is required.")]
	MissingApiKey,
	/// No base URL was supplied.
	#[error("Base URL is required.")]
	MissingBaseUrl,
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than HTTP(S).
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Rate limit of zero would block every request.
	#[error("The rate limit must allow at least one request per second.")]
	ZeroRateLimit,
	/// Throttle window of zero length could never reset.
	#[error("The rate limit window must be positive.")]
	ZeroRateWindow,
	/// Debug logging was requested from a build without the `tracing` feature.
	#[error("Debug logging requires the `tracing` feature.")]
	DebugWithoutTracing,
	/// Cache timeout of zero would expire every entry on insertion.
	#[error("The cache timeout must be positive.")]
	ZeroCacheTimeout,
	/// An environment value could not be parsed.
	#[error("Environment variable `{name}` has an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// Client construction happened outside a Tokio runtime.
	#[error("A Tokio runtime is required to start the cache sweeper and rate limiter.")]
	NoRuntime,
	/// Request path combined with the base URL did not form a valid URL.
	#[error("Request URL is invalid.")]
	InvalidRequestUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request payload could not be serialized.")]
	Serialize {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_is_exposed_for_http_variants() {
		assert_eq!(Error::NotFound.status(), Some(404));
		assert_eq!(Error::RateLimited { retry_after: None }.status(), Some(429));
		assert_eq!(Error::Api { status: 502, message: "Bad Gateway".into() }.status(), Some(502));
		assert_eq!(Error::LimiterClosed.status(), None);
	}

	#[test]
	fn transport_error_keeps_its_source() {
		let io = std::io::Error::other("socket closed");
		let err: Error = TransportError::network(io).into();

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));

		let source = StdError::source(&err)
			.expect("Transparent transport errors should expose the network error as source.");

		assert_eq!(source.to_string(), "socket closed");
	}

	#[test]
	fn api_error_message_includes_status() {
		let err = Error::Api { status: 500, message: "database offline".into() };

		assert_eq!(err.to_string(), "API error (500): database offline.");
	}
}
