// self
use crate::{_prelude::*, http::ResponseMetadata, request::ApiRequest};

/// Hooks invoked around every dispatch.
///
/// All methods default to no-ops, so implementors override only what they need. Hooks run
/// inline on the dispatching task and must not block.
pub trait DispatchObserver
where
	Self: Send + Sync,
{
	/// Called right before the request goes to the transport.
	fn on_request(&self, request: &ApiRequest) {
		let _ = request;
	}

	/// Called after a 2xx response was parsed.
	fn on_response(&self, request: &ApiRequest, metadata: &ResponseMetadata) {
		let _ = (request, metadata);
	}

	/// Called when a GET was answered from the cache.
	fn on_cache_hit(&self, request: &ApiRequest) {
		let _ = request;
	}

	/// Called when the dispatch fails after leaving the cache.
	fn on_error(&self, request: &ApiRequest, error: &Error) {
		let _ = (request, error);
	}
}

/// Observer that logs each dispatch at debug level; registered when `debug` is enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;
impl DispatchObserver for LogObserver {
	fn on_request(&self, request: &ApiRequest) {
		#[cfg(feature = "tracing")]
		tracing::debug!(
			method = request.method.as_str(),
			path = %request.path,
			query = ?request.query,
			body = ?request.body,
			"Dispatching API request."
		);
		#[cfg(not(feature = "tracing"))]
		let _ = request;
	}

	fn on_response(&self, request: &ApiRequest, metadata: &ResponseMetadata) {
		#[cfg(feature = "tracing")]
		tracing::debug!(
			method = request.method.as_str(),
			path = %request.path,
			status = metadata.status,
			"API request succeeded."
		);
		#[cfg(not(feature = "tracing"))]
		let _ = (request, metadata);
	}

	fn on_cache_hit(&self, request: &ApiRequest) {
		#[cfg(feature = "tracing")]
		tracing::debug!(
			method = request.method.as_str(),
			path = %request.path,
			"Served API request from cache."
		);
		#[cfg(not(feature = "tracing"))]
		let _ = request;
	}

	fn on_error(&self, request: &ApiRequest, error: &Error) {
		#[cfg(feature = "tracing")]
		tracing::debug!(
			method = request.method.as_str(),
			path = %request.path,
			status = error.status(),
			error = %error,
			"API request failed."
		);
		#[cfg(not(feature = "tracing"))]
		let _ = (request, error);
	}
}
