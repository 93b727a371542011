//! Client configuration: credentials, base URL, cache TTL, throttle budget, and debug logging.
//!
//! [`ClientConfig`] is plain data that deserializes from the camelCase layout used by the
//! JavaScript SDK (`apiKey`, `baseUrl`, `cacheTimeout`, `rateLimitRequests`, `debug`).
//! Use [`ClientConfig::builder`] or [`ClientConfig::from_env`] to get a validated value.

/// Builder API for assembling validated configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError, request::Method};

/// Default cache TTL (five minutes).
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(300_000);
/// Default request starts admitted per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Redacted API key wrapper keeping the credential out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);
impl ApiKey {
	/// Wraps a new key string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner key. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the `Authorization` header value.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}

	fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}
impl Debug for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ApiKey").field(&"<redacted>").finish()
	}
}
impl Display for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Which successful responses the dispatcher writes into the cache.
///
/// Reads only ever consult the cache for `GET`, whatever the policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CachePolicy {
	/// Cache every successful response, mutations included, under its own key.
	#[default]
	AllMethods,
	/// Cache successful `GET` responses only.
	ReadsOnly,
}
impl CachePolicy {
	/// Returns true when a successful response to `method` should be stored.
	pub const fn stores(self, method: Method) -> bool {
		match self {
			CachePolicy::AllMethods => true,
			CachePolicy::ReadsOnly => method.is_read(),
		}
	}
}

/// Settings consumed by [`MemberPressClient`](crate::MemberPressClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	/// Credential sent as `Authorization: Bearer <key>`.
	pub api_key: ApiKey,
	/// API root, e.g. `https://example.com/wp-json/mp/v1`.
	pub base_url: Url,
	/// Cache TTL, expressed in milliseconds on the wire.
	#[serde(default = "default_cache_timeout", with = "duration_millis")]
	pub cache_timeout: Duration,
	/// Request starts admitted per one-second window.
	#[serde(default = "default_rate_limit")]
	pub rate_limit_requests: u32,
	/// Registers the logging observer when true.
	///
	/// The observer emits `tracing` events, so validation rejects this flag when the crate
	/// is built without the `tracing` feature.
	#[serde(default)]
	pub debug: bool,
	/// Which responses get cached.
	#[serde(default)]
	pub cache_policy: CachePolicy,
}
impl ClientConfig {
	/// Creates a new builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::new()
	}

	/// Loads configuration from `MP_API_KEY`, `MP_API_URL`, `MP_CACHE_TIMEOUT_MS`,
	/// `MP_RATE_LIMIT`, and `MP_DEBUG`.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Same as [`from_env`](Self::from_env) but reads variables through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&'static str) -> Option<String>,
	{
		let mut builder = Self::builder();

		if let Some(key) = lookup("MP_API_KEY") {
			builder = builder.api_key(key);
		}
		if let Some(url) = lookup("MP_API_URL") {
			builder = builder.base_url(url);
		}
		if let Some(raw) = lookup("MP_CACHE_TIMEOUT_MS") {
			let millis = parse_env("MP_CACHE_TIMEOUT_MS", &raw)?;

			builder = builder.cache_timeout(Duration::from_millis(millis));
		}
		if let Some(raw) = lookup("MP_RATE_LIMIT") {
			builder = builder.rate_limit_requests(parse_env("MP_RATE_LIMIT", &raw)?);
		}
		if let Some(raw) = lookup("MP_DEBUG") {
			let debug = match raw.trim().to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" | "on" => true,
				"" | "0" | "false" | "no" | "off" => false,
				_ => return Err(ConfigError::InvalidEnv { name: "MP_DEBUG", value: raw }),
			};

			builder = builder.debug(debug);
		}

		builder.build()
	}

	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.api_key.is_blank() {
			return Err(ConfigError::MissingApiKey);
		}
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.rate_limit_requests == 0 {
			return Err(ConfigError::ZeroRateLimit);
		}
		if self.cache_timeout.is_zero() {
			return Err(ConfigError::ZeroCacheTimeout);
		}
		if self.debug && !cfg!(feature = "tracing") {
			return Err(ConfigError::DebugWithoutTracing);
		}

		Ok(())
	}
}

fn default_cache_timeout() -> Duration {
	DEFAULT_CACHE_TIMEOUT
}

fn default_rate_limit() -> u32 {
	DEFAULT_RATE_LIMIT
}

fn parse_env<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
	T: FromStr,
{
	raw.trim().parse().map_err(|_| ConfigError::InvalidEnv { name, value: raw.to_owned() })
}

mod duration_millis {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_key_formatters_redact() {
		let key = ApiKey::new("mp-live-123");

		assert_eq!(format!("{key:?}"), "ApiKey(\"<redacted>\")");
		assert_eq!(format!("{key}"), "<redacted>");
		assert_eq!(key.bearer(), "Bearer mp-live-123");
	}

	#[test]
	fn deserializes_js_layout_with_defaults() {
		let config: ClientConfig = serde_json::from_str(
			"{\"apiKey\":\"k\",\"baseUrl\":\"https://example.com/wp-json/mp/v1\"}",
		)
		.expect("Minimal config should deserialize.");

		assert_eq!(config.cache_timeout, DEFAULT_CACHE_TIMEOUT);
		assert_eq!(config.rate_limit_requests, DEFAULT_RATE_LIMIT);
		assert!(!config.debug);
		assert_eq!(config.cache_policy, CachePolicy::AllMethods);
		assert!(config.validate().is_ok());

		let config: ClientConfig = serde_json::from_str(
			"{\"apiKey\":\"k\",\"baseUrl\":\"https://example.com\",\"cacheTimeout\":1500,\"rateLimitRequests\":5,\"debug\":true,\"cachePolicy\":\"readsOnly\"}",
		)
		.expect("Full config should deserialize.");

		assert_eq!(config.cache_timeout, Duration::from_millis(1500));
		assert_eq!(config.rate_limit_requests, 5);
		assert!(config.debug);
		assert_eq!(config.cache_policy, CachePolicy::ReadsOnly);
	}

	#[test]
	fn from_lookup_reads_variables() {
		let env: HashMap<&str, &str> = HashMap::from([
			("MP_API_KEY", "env-key"),
			("MP_API_URL", "https://env.example.com/wp-json/mp/v1"),
			("MP_CACHE_TIMEOUT_MS", "2500"),
			("MP_RATE_LIMIT", "7"),
			("MP_DEBUG", "off"),
		]);
		let config = ClientConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
			.expect("Environment config should build.");

		assert_eq!(config.api_key.expose(), "env-key");
		assert_eq!(config.base_url.as_str(), "https://env.example.com/wp-json/mp/v1");
		assert_eq!(config.cache_timeout, Duration::from_millis(2500));
		assert_eq!(config.rate_limit_requests, 7);
		assert!(!config.debug);
	}

	#[test]
	fn from_lookup_rejects_garbage_numbers() {
		let err = ClientConfig::from_lookup(|name| match name {
			"MP_API_KEY" => Some("k".into()),
			"MP_API_URL" => Some("https://example.com".into()),
			"MP_RATE_LIMIT" => Some("lots".into()),
			_ => None,
		})
		.expect_err("Non-numeric rate limit should be rejected.");

		assert!(matches!(err, ConfigError::InvalidEnv { name: "MP_RATE_LIMIT", .. }));
	}

	#[test]
	fn from_lookup_requires_credentials() {
		let err = ClientConfig::from_lookup(|_| None)
			.expect_err("Missing variables should fail validation.");

		assert!(matches!(err, ConfigError::MissingApiKey));
	}

	#[test]
	fn reads_only_policy_skips_mutations() {
		assert!(CachePolicy::AllMethods.stores(Method::Post));
		assert!(CachePolicy::ReadsOnly.stores(Method::Get));
		assert!(!CachePolicy::ReadsOnly.stores(Method::Patch));
	}

	#[test]
	fn debug_flag_needs_tracing() {
		let result = ClientConfig::builder()
			.api_key("k")
			.base_url("https://example.com")
			.debug(true)
			.build();

		#[cfg(feature = "tracing")]
		assert!(result.is_ok());
		#[cfg(not(feature = "tracing"))]
		assert!(matches!(result, Err(ConfigError::DebugWithoutTracing)));
	}
}
