//! Request descriptors handed from resource wrappers to the dispatcher.
//!
//! An [`ApiRequest`] carries the method, resource path, optional query object, and optional
//! JSON body. It also derives the cache key: the method and path plus a SHA-256 fingerprint
//! of the canonical (key-sorted) JSON of the query and body, so semantically identical
//! requests always share a key regardless of field order.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use serde_json::Map;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError};

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// Idempotent read; the only method served from cache.
	Get,
	/// Create.
	Post,
	/// Full update.
	Put,
	/// Partial update.
	Patch,
	/// Delete.
	Delete,
}
impl Method {
	/// Returns the canonical upper-case token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}

	/// Returns true for reads that may be answered from cache.
	pub const fn is_read(self) -> bool {
		matches!(self, Method::Get)
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// API resource families, used as span and metric labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
	/// `/members`.
	Members,
	/// `/memberships`.
	Memberships,
	/// `/subscriptions`.
	Subscriptions,
	/// `/transactions`.
	Transactions,
	/// `/analytics`.
	Analytics,
	/// Anything issued through the raw dispatcher.
	Other,
}
impl Resource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Resource::Members => "members",
			Resource::Memberships => "memberships",
			Resource::Subscriptions => "subscriptions",
			Resource::Transactions => "transactions",
			Resource::Analytics => "analytics",
			Resource::Other => "other",
		}
	}
}
impl Display for Resource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Describes a single API call.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the base URL, e.g. `/members/42`.
	pub path: String,
	/// Query parameters as a JSON object with null members removed.
	pub query: Option<Value>,
	/// JSON body.
	pub body: Option<Value>,
	/// Resource family label.
	pub resource: Resource,
}
impl ApiRequest {
	/// Creates a request without query or body.
	pub fn new(method: Method, resource: Resource, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: None, body: None, resource }
	}

	/// Shorthand for a `GET` request.
	pub fn get(resource: Resource, path: impl Into<String>) -> Self {
		Self::new(Method::Get, resource, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(resource: Resource, path: impl Into<String>) -> Self {
		Self::new(Method::Post, resource, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(resource: Resource, path: impl Into<String>) -> Self {
		Self::new(Method::Put, resource, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(resource: Resource, path: impl Into<String>) -> Self {
		Self::new(Method::Patch, resource, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(resource: Resource, path: impl Into<String>) -> Self {
		Self::new(Method::Delete, resource, path)
	}

	/// Serializes `query` into the query object. `None` or an all-null object clears it.
	pub fn with_query<Q>(mut self, query: &Q) -> Result<Self, ConfigError>
	where
		Q: ?Sized + Serialize,
	{
		let value =
			serde_json::to_value(query).map_err(|source| ConfigError::Serialize { source })?;

		self.query = strip_nulls(value);

		Ok(self)
	}

	/// Serializes `body` into the JSON payload.
	pub fn with_body<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let value =
			serde_json::to_value(body).map_err(|source| ConfigError::Serialize { source })?;

		self.body = if value.is_null() { None } else { Some(value) };

		Ok(self)
	}

	/// Derives the cache key for this request.
	pub fn cache_key(&self) -> String {
		let mut envelope = Map::new();

		envelope.insert("body".into(), self.body.as_ref().map(canonicalize).unwrap_or(Value::Null));
		envelope
			.insert("query".into(), self.query.as_ref().map(canonicalize).unwrap_or(Value::Null));

		let digest = Sha256::digest(Value::Object(envelope).to_string().as_bytes());

		format!("{} {}?{}", self.method, self.path, STANDARD_NO_PAD.encode(digest))
	}

	/// Flattens the query object into ordered `(key, value)` pairs.
	///
	/// Strings are sent raw, numbers and booleans as their JSON text, arrays repeat the key,
	/// and nested objects are sent as compact JSON.
	pub fn query_pairs(&self) -> Vec<(String, String)> {
		let Some(Value::Object(map)) = self.query.as_ref().map(canonicalize) else {
			return Vec::new();
		};
		let mut pairs = Vec::with_capacity(map.len());

		for (key, value) in map {
			match value {
				Value::Array(items) =>
					for item in items {
						if let Some(rendered) = render_scalar(&item) {
							pairs.push((key.clone(), rendered));
						}
					},
				other =>
					if let Some(rendered) = render_scalar(&other) {
						pairs.push((key, rendered));
					},
			}
		}

		pairs
	}

	/// Joins the path onto `base` and appends the query pairs.
	pub fn url(&self, base: &Url) -> Result<Url, ConfigError> {
		let joined =
			format!("{}/{}", base.as_str().trim_end_matches('/'), self.path.trim_start_matches('/'));
		let mut url = Url::parse(&joined).map_err(|source| ConfigError::InvalidRequestUrl { source })?;
		let pairs = self.query_pairs();

		if !pairs.is_empty() {
			url.query_pairs_mut().extend_pairs(pairs);
		}

		Ok(url)
	}
}

/// Returns a copy of `value` with every object's keys in sorted order.
pub(crate) fn canonicalize(value: &Value) -> Value {
	match value {
		Value::Object(map) => {
			let mut entries = map.iter().collect::<Vec<_>>();

			entries.sort_by(|(a, _), (b, _)| a.cmp(b));

			Value::Object(entries.into_iter().map(|(k, v)| (k.clone(), canonicalize(v))).collect())
		},
		Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
		other => other.clone(),
	}
}

fn strip_nulls(value: Value) -> Option<Value> {
	match value {
		Value::Null => None,
		Value::Object(map) => {
			let kept = map.into_iter().filter(|(_, v)| !v.is_null()).collect::<Map<_, _>>();

			if kept.is_empty() { None } else { Some(Value::Object(kept)) }
		},
		other => Some(other),
	}
}

fn render_scalar(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Number(n) => Some(n.to_string()),
		other => Some(other.to_string()),
	}
}
