// self
use crate::{
	_prelude::*,
	config::{ApiKey, CachePolicy, ClientConfig, DEFAULT_CACHE_TIMEOUT, DEFAULT_RATE_LIMIT},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// API key, required.
	pub api_key: Option<ApiKey>,
	/// Raw base URL, required.
	pub base_url: Option<String>,
	/// Cache TTL.
	pub cache_timeout: Duration,
	/// Request starts admitted per second.
	pub rate_limit_requests: u32,
	/// Enables the logging observer.
	pub debug: bool,
	/// Which responses get cached.
	pub cache_policy: CachePolicy,
}
impl ClientConfigBuilder {
	/// Creates a builder seeded with the defaults.
	pub fn new() -> Self {
		Self {
			api_key: None,
			base_url: None,
			cache_timeout: DEFAULT_CACHE_TIMEOUT,
			rate_limit_requests: DEFAULT_RATE_LIMIT,
			debug: false,
			cache_policy: CachePolicy::default(),
		}
	}

	/// Sets the API key.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(ApiKey::new(key));

		self
	}

	/// Sets the API root URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Overrides the cache TTL (defaults to five minutes).
	pub fn cache_timeout(mut self, ttl: Duration) -> Self {
		self.cache_timeout = ttl;

		self
	}

	/// Overrides the per-second request budget (defaults to 100).
	pub fn rate_limit_requests(mut self, limit: u32) -> Self {
		self.rate_limit_requests = limit;

		self
	}

	/// Toggles debug logging of every dispatch; needs the `tracing` feature.
	pub fn debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Overrides the cache write policy.
	pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
		self.cache_policy = policy;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let api_key = self.api_key.ok_or(ConfigError::MissingApiKey)?;
		let raw_url = self.base_url.ok_or(ConfigError::MissingBaseUrl)?;

		if raw_url.trim().is_empty() {
			return Err(ConfigError::MissingBaseUrl);
		}

		let base_url =
			Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidBaseUrl { source })?;
		let config = ClientConfig {
			api_key,
			base_url,
			cache_timeout: self.cache_timeout,
			rate_limit_requests: self.rate_limit_requests,
			debug: self.debug,
			cache_policy: self.cache_policy,
		};

		config.validate()?;

		Ok(config)
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}
