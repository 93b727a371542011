//! Transactions: payments, refunds, and plan changes.

// self
use crate::{
	_prelude::*,
	dispatch::Dispatcher,
	http::ApiHttpClient,
	request::{ApiRequest, Resource},
	resources::Id,
};

/// Settlement state of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
	/// Settled.
	Completed,
	/// Declined or errored.
	Failed,
	/// Reversed by a refund.
	Refunded,
	/// Awaiting settlement.
	Pending,
}

/// What a transaction pays for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
	/// One-off payment.
	Payment,
	/// Money returned to the member.
	Refund,
	/// Recurring charge.
	Subscription,
	/// Move to a pricier plan.
	Upgrade,
	/// Move to a cheaper plan.
	Downgrade,
}

/// Transaction record as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	/// Identifier.
	pub id: Id,
	/// Paying member.
	pub member_id: Id,
	/// Subscription charged, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subscription_id: Option<Id>,
	/// Amount in major currency units.
	pub amount: f64,
	/// ISO 4217 code.
	pub currency: String,
	/// Settlement state.
	pub status: TransactionStatus,
	/// Transaction kind.
	#[serde(rename = "type")]
	pub kind: TransactionType,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}

/// Payload for [`TransactionApi::create`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
	/// Paying member.
	pub member_id: Id,
	/// Subscription to charge.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subscription_id: Option<Id>,
	/// Amount in major currency units.
	pub amount: f64,
	/// ISO 4217 code.
	pub currency: String,
	/// Transaction kind; the server defaults it when unset.
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<TransactionType>,
}
impl NewTransaction {
	/// Creates a payload for `amount` in `currency` billed to `member_id`.
	pub fn new(member_id: Id, amount: f64, currency: impl Into<String>) -> Self {
		Self { member_id, subscription_id: None, amount, currency: currency.into(), kind: None }
	}

	/// Charges the given subscription.
	pub fn subscription(mut self, subscription_id: Id) -> Self {
		self.subscription_id = Some(subscription_id);

		self
	}
}

/// Query filter for [`TransactionApi::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
	/// Only transactions in this state.
	pub status: Option<TransactionStatus>,
	/// Only transactions of this kind.
	#[serde(rename = "type")]
	pub kind: Option<TransactionType>,
	/// Only transactions paid by this member.
	pub member_id: Option<Id>,
	/// Only transactions charged to this subscription.
	pub subscription_id: Option<Id>,
	/// Inclusive lower date bound.
	#[serde(with = "crate::resources::iso_date::option")]
	pub start_date: Option<time::Date>,
	/// Inclusive upper date bound.
	#[serde(with = "crate::resources::iso_date::option")]
	pub end_date: Option<time::Date>,
	/// 1-based page number.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
}

#[derive(Serialize)]
struct Refund {
	amount: f64,
}

/// `/transactions` endpoints.
pub struct TransactionApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	dispatcher: &'a Dispatcher<C>,
}
impl<'a, C> TransactionApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Wraps a dispatcher.
	pub fn new(dispatcher: &'a Dispatcher<C>) -> Self {
		Self { dispatcher }
	}

	/// `POST /transactions`.
	pub async fn create(self, transaction: &NewTransaction) -> Result<Transaction> {
		let request =
			ApiRequest::post(Resource::Transactions, "/transactions").with_body(transaction)?;

		self.dispatcher.dispatch(request).await
	}

	/// `GET /transactions/{id}`.
	pub async fn get(self, id: Id) -> Result<Transaction> {
		self.dispatcher
			.dispatch(ApiRequest::get(Resource::Transactions, format!("/transactions/{id}")))
			.await
	}

	/// `GET /transactions` with optional filters.
	pub async fn list(self, filter: Option<&TransactionFilter>) -> Result<Vec<Transaction>> {
		let request =
			ApiRequest::get(Resource::Transactions, "/transactions").with_query(&filter)?;

		self.dispatcher.dispatch(request).await
	}

	/// `POST /transactions/{id}/refund`; a full refund when `amount` is `None`.
	pub async fn refund(self, id: Id, amount: Option<f64>) -> Result<Transaction> {
		let request = ApiRequest::post(Resource::Transactions, format!("/transactions/{id}/refund"))
			.with_body(&amount.map(|amount| Refund { amount }))?;

		self.dispatcher.dispatch(request).await
	}

	/// Lists transactions paid by `member_id`; any member in `filter` is overridden.
	pub async fn by_member(
		self,
		member_id: Id,
		filter: Option<&TransactionFilter>,
	) -> Result<Vec<Transaction>> {
		let filter =
			TransactionFilter { member_id: Some(member_id), ..filter.cloned().unwrap_or_default() };

		self.list(Some(&filter)).await
	}

	/// Lists transactions charged to `subscription_id`; any subscription in `filter` is overridden.
	pub async fn by_subscription(
		self,
		subscription_id: Id,
		filter: Option<&TransactionFilter>,
	) -> Result<Vec<Transaction>> {
		let filter = TransactionFilter {
			subscription_id: Some(subscription_id),
			..filter.cloned().unwrap_or_default()
		};

		self.list(Some(&filter)).await
	}
}
impl<C> Clone for TransactionApi<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		*self
	}
}
impl<C> Copy for TransactionApi<'_, C> where C: ?Sized + ApiHttpClient {}
