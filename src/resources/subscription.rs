//! Subscriptions: a member's recurring enrollment in a plan.

// self
use crate::{
	_prelude::*,
	dispatch::Dispatcher,
	http::ApiHttpClient,
	request::{ApiRequest, Resource},
	resources::Id,
};

/// Billing state of a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
	/// Billing normally.
	Active,
	/// Stopped for good.
	Cancelled,
	/// Ran past its end date.
	Expired,
	/// Temporarily suspended.
	Paused,
}
impl SubscriptionStatus {
	/// Wire token.
	pub const fn as_str(self) -> &'static str {
		match self {
			SubscriptionStatus::Active => "active",
			SubscriptionStatus::Cancelled => "cancelled",
			SubscriptionStatus::Expired => "expired",
			SubscriptionStatus::Paused => "paused",
		}
	}
}
impl Display for SubscriptionStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stored payment instrument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
	/// Identifier.
	pub id: Id,
	/// Instrument kind, e.g. `card`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Last four digits, for cards.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_four: Option<String>,
	/// Expiry as sent by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expiry_date: Option<String>,
}

/// Subscription record as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
	/// Identifier.
	pub id: Id,
	/// Owning member.
	pub member_id: Id,
	/// Plan (membership) subscribed to.
	pub plan_id: Id,
	/// Billing state.
	pub status: SubscriptionStatus,
	/// Start instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub start_date: Option<OffsetDateTime>,
	/// End instant, for fixed-term or cancelled subscriptions.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub end_date: Option<OffsetDateTime>,
	/// Next renewal instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub renewal_date: Option<OffsetDateTime>,
	/// Instrument charged on renewal.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payment_method: Option<PaymentMethod>,
}

/// Payload for [`SubscriptionApi::create`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
	/// Owning member.
	pub member_id: Id,
	/// Plan to enroll in.
	pub plan_id: Id,
	/// Initial state; the server picks one when unset.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<SubscriptionStatus>,
}
impl NewSubscription {
	/// Enrolls `member_id` in `plan_id`.
	pub fn new(member_id: Id, plan_id: Id) -> Self {
		Self { member_id, plan_id, status: None }
	}
}

/// Partial update; unset fields are left untouched by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
	/// Move to another plan.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub plan_id: Option<Id>,
	/// New billing state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<SubscriptionStatus>,
	/// New end instant.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "time::serde::rfc3339::option"
	)]
	pub end_date: Option<OffsetDateTime>,
	/// New renewal instant.
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		with = "time::serde::rfc3339::option"
	)]
	pub renewal_date: Option<OffsetDateTime>,
}

/// Query filter for [`SubscriptionApi::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFilter {
	/// Only subscriptions in this state.
	pub status: Option<SubscriptionStatus>,
	/// Only subscriptions owned by this member.
	pub member_id: Option<Id>,
	/// Only subscriptions to this plan.
	pub plan_id: Option<Id>,
	/// 1-based page number.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
}

#[derive(Serialize)]
struct StatusChange {
	status: SubscriptionStatus,
}

/// `/subscriptions` endpoints.
pub struct SubscriptionApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	dispatcher: &'a Dispatcher<C>,
}
impl<'a, C> SubscriptionApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Wraps a dispatcher.
	pub fn new(dispatcher: &'a Dispatcher<C>) -> Self {
		Self { dispatcher }
	}

	/// `POST /subscriptions`.
	pub async fn create(self, subscription: &NewSubscription) -> Result<Subscription> {
		let request =
			ApiRequest::post(Resource::Subscriptions, "/subscriptions").with_body(subscription)?;

		self.dispatcher.dispatch(request).await
	}

	/// `GET /subscriptions/{id}`.
	pub async fn get(self, id: Id) -> Result<Subscription> {
		self.dispatcher
			.dispatch(ApiRequest::get(Resource::Subscriptions, format!("/subscriptions/{id}")))
			.await
	}

	/// `PUT /subscriptions/{id}`.
	pub async fn update(self, id: Id, update: &SubscriptionUpdate) -> Result<Subscription> {
		let request = ApiRequest::put(Resource::Subscriptions, format!("/subscriptions/{id}"))
			.with_body(update)?;

		self.dispatcher.dispatch(request).await
	}

	/// `DELETE /subscriptions/{id}`.
	pub async fn delete(self, id: Id) -> Result<()> {
		let request = ApiRequest::delete(Resource::Subscriptions, format!("/subscriptions/{id}"));

		self.dispatcher.dispatch_value(request).await.map(|_| ())
	}

	/// `GET /subscriptions` with optional filters.
	pub async fn list(self, filter: Option<&SubscriptionFilter>) -> Result<Vec<Subscription>> {
		let request =
			ApiRequest::get(Resource::Subscriptions, "/subscriptions").with_query(&filter)?;

		self.dispatcher.dispatch(request).await
	}

	/// `PATCH /subscriptions/{id}/status`.
	pub async fn update_status(self, id: Id, status: SubscriptionStatus) -> Result<Subscription> {
		let request =
			ApiRequest::patch(Resource::Subscriptions, format!("/subscriptions/{id}/status"))
				.with_body(&StatusChange { status })?;

		self.dispatcher.dispatch(request).await
	}

	/// Moves the subscription to [`SubscriptionStatus::Paused`].
	pub async fn pause(self, id: Id) -> Result<Subscription> {
		self.update_status(id, SubscriptionStatus::Paused).await
	}

	/// Moves the subscription back to [`SubscriptionStatus::Active`].
	pub async fn resume(self, id: Id) -> Result<Subscription> {
		self.update_status(id, SubscriptionStatus::Active).await
	}

	/// Moves the subscription to [`SubscriptionStatus::Cancelled`].
	pub async fn cancel(self, id: Id) -> Result<Subscription> {
		self.update_status(id, SubscriptionStatus::Cancelled).await
	}
}
impl<C> Clone for SubscriptionApi<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		*self
	}
}
impl<C> Copy for SubscriptionApi<'_, C> where C: ?Sized + ApiHttpClient {}
