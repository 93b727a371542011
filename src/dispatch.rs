//! Shared request pipeline behind every resource handle.
//!
//! [`Dispatcher::dispatch`] answers a `GET` from the [`ResponseCache`] when a live entry
//! exists. Everything else waits for a [`RateLimiter`] slot, goes out through the
//! [`ApiHttpClient`], has its status mapped onto [`Error`], and on success is parsed, cached
//! per [`CachePolicy`], and decoded into the caller's type. Failures are never cached and a
//! consumed limiter slot is never refunded.

// self
use crate::{
	_prelude::*,
	cache::ResponseCache,
	config::{ApiKey, CachePolicy, ClientConfig},
	error::ConfigError,
	http::{ApiHttpClient, HttpRequest, ResponseMetadata},
	obs::{self, DispatchObserver, DispatchOutcome, DispatchSpan, LogObserver},
	rate_limit::RateLimiter,
	request::ApiRequest,
};

const FALLBACK_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Cache-aware, throttled request executor shared by all resource handles.
pub struct Dispatcher<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Transport used for every outbound call.
	pub http_client: Arc<C>,
	base_url: Url,
	api_key: ApiKey,
	cache_policy: CachePolicy,
	cache: ResponseCache,
	limiter: RateLimiter,
	observers: Vec<Arc<dyn DispatchObserver>>,
}
impl<C> Dispatcher<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Builds a dispatcher and starts its cache sweeper and limiter timer.
	///
	/// Must be called inside a Tokio runtime. When `config.debug` is set a [`LogObserver`]
	/// is registered automatically.
	pub fn new(config: &ClientConfig, http_client: impl Into<Arc<C>>) -> Result<Self, ConfigError> {
		config.validate()?;

		let cache = ResponseCache::new(config.cache_timeout)?;
		let limiter = RateLimiter::new(config.rate_limit_requests)?;
		let mut observers = Vec::<Arc<dyn DispatchObserver>>::new();

		if config.debug {
			observers.push(Arc::new(LogObserver));
		}

		Ok(Self {
			http_client: http_client.into(),
			base_url: config.base_url.clone(),
			api_key: config.api_key.clone(),
			cache_policy: config.cache_policy,
			cache,
			limiter,
			observers,
		})
	}

	/// Registers an additional observer.
	pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
		self.observers.push(observer);

		self
	}

	/// Executes `request` and decodes the JSON payload into `T`.
	pub async fn dispatch<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let span = DispatchSpan::new(request.resource, request.method, &request.path);

		span.instrument(async { self.fetch(&request).await.and_then(decode) }).await
	}

	/// Executes `request` and returns the raw JSON payload.
	pub async fn dispatch_value(&self, request: ApiRequest) -> Result<Value> {
		self.dispatch(request).await
	}

	/// Response cache shared by every handle.
	pub fn cache(&self) -> &ResponseCache {
		&self.cache
	}

	/// Request throttle shared by every handle.
	pub fn limiter(&self) -> &RateLimiter {
		&self.limiter
	}

	/// Base URL requests are resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Active cache write policy.
	pub fn cache_policy(&self) -> CachePolicy {
		self.cache_policy
	}

	/// Stops the background tasks; queued and later requests fail with [`Error::LimiterClosed`].
	pub fn shutdown(&self) {
		self.cache.shutdown();
		self.limiter.shutdown();
	}

	async fn fetch(&self, request: &ApiRequest) -> Result<Value> {
		obs::record_dispatch_outcome(request.resource, DispatchOutcome::Attempt);

		let key = request.cache_key();
		let cached = if request.method.is_read() { self.cache.get(&key) } else { None };

		if let Some(value) = cached {
			obs::record_dispatch_outcome(request.resource, DispatchOutcome::CacheHit);
			self.observers.iter().for_each(|o| o.on_cache_hit(request));

			return Ok(value);
		}

		match self.send(request).await {
			Ok((metadata, value)) => {
				obs::record_dispatch_outcome(request.resource, DispatchOutcome::Success);
				self.observers.iter().for_each(|o| o.on_response(request, &metadata));

				if self.cache_policy.stores(request.method) {
					self.cache.set(key, value.clone());
				}

				Ok(value)
			},
			Err(e) => {
				obs::record_dispatch_outcome(request.resource, DispatchOutcome::Failure);
				self.observers.iter().for_each(|o| o.on_error(request, &e));

				Err(e)
			},
		}
	}

	async fn send(&self, request: &ApiRequest) -> Result<(ResponseMetadata, Value)> {
		self.limiter.acquire().await?;

		let url = request.url(&self.base_url)?;
		let body = request
			.body
			.as_ref()
			.map(serde_json::to_vec)
			.transpose()
			.map_err(|source| ConfigError::Serialize { source })?;
		let http_request = HttpRequest {
			method: request.method,
			url,
			headers: vec![
				("Authorization".into(), self.api_key.bearer()),
				("Content-Type".into(), "application/json".into()),
				("Accept".into(), "application/json".into()),
			],
			body,
		};

		self.observers.iter().for_each(|o| o.on_request(request));

		let response = self.http_client.execute(http_request).await?;

		if !response.metadata.is_success() {
			return Err(map_status(&response.metadata, &response.body));
		}

		let value = parse_body(&response.body)?;

		Ok((response.metadata, value))
	}
}
impl<C> Debug for Dispatcher<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("base_url", &self.base_url.as_str())
			.field("api_key", &self.api_key)
			.field("cache_policy", &self.cache_policy)
			.field("cache", &self.cache)
			.field("limiter", &self.limiter)
			.field("observers", &self.observers.len())
			.finish()
	}
}

/// Maps a non-2xx response onto the error taxonomy.
pub fn map_status(metadata: &ResponseMetadata, body: &[u8]) -> Error {
	match metadata.status {
		401 => Error::Unauthorized,
		403 => Error::Forbidden,
		404 => Error::NotFound,
		429 => Error::RateLimited { retry_after: metadata.retry_after },
		status => Error::Api { status, message: error_message(metadata, body) },
	}
}

fn error_message(metadata: &ResponseMetadata, body: &[u8]) -> String {
	serde_json::from_slice::<Value>(body)
		.ok()
		.and_then(|payload| payload.get("message").and_then(Value::as_str).map(str::to_owned))
		.filter(|message| !message.trim().is_empty())
		.or_else(|| metadata.status_text.clone().filter(|text| !text.trim().is_empty()))
		.unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.into())
}

fn parse_body(body: &[u8]) -> Result<Value> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	let mut deserializer = serde_json::Deserializer::from_slice(body);

	Ok(serde_path_to_error::deserialize(&mut deserializer)?)
}

fn decode<T>(value: Value) -> Result<T>
where
	T: DeserializeOwned,
{
	Ok(serde_path_to_error::deserialize(value)?)
}
