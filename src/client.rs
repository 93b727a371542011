//! Entry point tying the resource handles to one shared dispatcher.

// self
use crate::{
	_prelude::*,
	cache::ResponseCache,
	config::ClientConfig,
	dispatch::Dispatcher,
	error::ConfigError,
	http::ApiHttpClient,
	resources::{AnalyticsApi, MemberApi, MembershipApi, SubscriptionApi, TransactionApi},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// [`MemberPressClient`] backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestMemberPressClient = MemberPressClient<ReqwestHttpClient>;

/// MemberPress API client.
///
/// Cloning is cheap; clones share the cache, the rate limiter, and the transport. Call
/// [`shutdown`](Self::shutdown) (or drop the last clone) to stop the background tasks.
pub struct MemberPressClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	dispatcher: Arc<Dispatcher<C>>,
}
impl<C> MemberPressClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Builds a client over a caller-supplied transport.
	///
	/// Must be called inside a Tokio runtime.
	pub fn with_http_client(
		config: &ClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		Ok(Self::from_dispatcher(Dispatcher::new(config, http_client)?))
	}

	/// Wraps a preassembled dispatcher, e.g. one carrying extra observers.
	pub fn from_dispatcher(dispatcher: Dispatcher<C>) -> Self {
		Self { dispatcher: Arc::new(dispatcher) }
	}

	/// Member endpoints.
	pub fn members(&self) -> MemberApi<'_, C> {
		MemberApi::new(&self.dispatcher)
	}

	/// Membership endpoints.
	pub fn memberships(&self) -> MembershipApi<'_, C> {
		MembershipApi::new(&self.dispatcher)
	}

	/// Subscription endpoints.
	pub fn subscriptions(&self) -> SubscriptionApi<'_, C> {
		SubscriptionApi::new(&self.dispatcher)
	}

	/// Transaction endpoints.
	pub fn transactions(&self) -> TransactionApi<'_, C> {
		TransactionApi::new(&self.dispatcher)
	}

	/// Analytics reports.
	pub fn analytics(&self) -> AnalyticsApi<'_, C> {
		AnalyticsApi::new(&self.dispatcher)
	}

	/// Shared dispatcher, for raw requests.
	pub fn dispatcher(&self) -> &Dispatcher<C> {
		&self.dispatcher
	}

	/// Shared response cache.
	pub fn cache(&self) -> &ResponseCache {
		self.dispatcher.cache()
	}

	/// Stops the cache sweeper and the rate limiter for every clone.
	pub fn shutdown(&self) {
		self.dispatcher.shutdown();
	}
}
#[cfg(feature = "reqwest")]
impl MemberPressClient<ReqwestHttpClient> {
	/// Builds a client using a fresh reqwest transport.
	///
	/// Must be called inside a Tokio runtime.
	pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()?;

		Self::with_http_client(config, ReqwestHttpClient::with_client(client))
	}
}
impl<C> Clone for MemberPressClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self { dispatcher: self.dispatcher.clone() }
	}
}
impl<C> Debug for MemberPressClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemberPressClient").field("dispatcher", &self.dispatcher).finish()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig::builder()
			.api_key("key")
			.base_url("https://example.com/wp-json/mp/v1")
			.build()
			.expect("Test config should build.")
	}

	#[tokio::test]
	async fn clones_share_one_cache() {
		let client = ReqwestMemberPressClient::new(&config()).expect("Client should build.");
		let clone = client.clone();

		client.cache().set("shared", Value::Bool(true));

		assert_eq!(clone.cache().get("shared"), Some(Value::Bool(true)));

		clone.shutdown();

		assert!(client.dispatcher().limiter().is_closed());
	}

	#[test]
	fn new_requires_a_runtime() {
		let err = ReqwestMemberPressClient::new(&config()).expect_err("No runtime is running.");

		assert!(matches!(err, ConfigError::NoRuntime));
	}
}
