//! Analytics: read-only aggregate reports.

// self
use crate::{
	_prelude::*,
	dispatch::Dispatcher,
	http::ApiHttpClient,
	request::{ApiRequest, Resource},
	resources::Id,
};

/// Bucket size for report histories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
	/// Daily buckets.
	Day,
	/// Weekly buckets.
	Week,
	/// Monthly buckets.
	Month,
	/// Yearly buckets.
	Year,
}

/// Query filter shared by every report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilter {
	/// Inclusive lower date bound.
	#[serde(with = "crate::resources::iso_date::option")]
	pub start_date: Option<time::Date>,
	/// Inclusive upper date bound.
	#[serde(with = "crate::resources::iso_date::option")]
	pub end_date: Option<time::Date>,
	/// History bucket size.
	pub interval: Option<Interval>,
	/// Restrict to one member.
	pub member_id: Option<Id>,
	/// Restrict to one plan.
	pub plan_id: Option<Id>,
}
impl AnalyticsFilter {
	/// Filter covering `start..=end`.
	pub fn between(start: time::Date, end: time::Date) -> Self {
		Self { start_date: Some(start), end_date: Some(end), ..Default::default() }
	}

	/// Sets the history bucket size.
	pub fn interval(mut self, interval: Interval) -> Self {
		self.interval = Some(interval);

		self
	}
}

/// Revenue totals and per-bucket amounts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueMetrics {
	/// All revenue in the range.
	pub total: f64,
	/// Revenue from recurring charges.
	pub recurring: f64,
	/// Revenue from one-off payments.
	pub one_time: f64,
	/// ISO 4217 code.
	pub currency: String,
	/// Per-bucket history.
	#[serde(default)]
	pub history: Vec<RevenuePoint>,
}

/// One revenue bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
	/// Bucket label.
	pub date: String,
	/// Revenue in the bucket.
	pub amount: f64,
}

/// Member activity summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
	/// Members with at least one session.
	pub active_members: u64,
	/// Mean session length.
	pub average_session_duration: f64,
	/// Session count.
	pub total_sessions: u64,
	/// Per-bucket history.
	#[serde(default)]
	pub history: Vec<EngagementPoint>,
}

/// One engagement bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementPoint {
	/// Bucket label.
	pub date: String,
	/// Sessions in the bucket.
	pub sessions: u64,
}

/// Cancellation summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnMetrics {
	/// Churn rate for the range.
	pub rate: f64,
	/// Members lost.
	pub total: u64,
	/// Members who cancelled.
	pub voluntary: u64,
	/// Members lost to failed payments.
	pub involuntary: u64,
	/// Per-bucket history.
	#[serde(default)]
	pub history: Vec<ChurnPoint>,
}

/// One churn bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnPoint {
	/// Bucket label.
	pub date: String,
	/// Churn rate in the bucket.
	pub rate: f64,
}

/// Member count growth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberGrowthMetrics {
	/// Members at the end of the range.
	pub total: u64,
	/// Growth over the range.
	pub growth: f64,
	/// Per-bucket history.
	#[serde(default)]
	pub history: Vec<MemberGrowthPoint>,
}

/// One growth bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberGrowthPoint {
	/// Bucket label.
	pub date: String,
	/// Members in the bucket.
	pub count: u64,
}

/// Subscription funnel summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionMetrics {
	/// Subscriptions active at the end of the range.
	pub active_subscriptions: u64,
	/// Trials that converted to paid.
	pub trial_conversions: u64,
	/// Plan upgrades.
	pub upgrades: u64,
	/// Plan downgrades.
	pub downgrades: u64,
	/// Per-bucket history.
	#[serde(default)]
	pub history: Vec<SubscriptionPoint>,
}

/// One subscription funnel bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPoint {
	/// Bucket label.
	pub date: String,
	/// Active subscriptions.
	pub active: u64,
	/// Trials started.
	pub trials: u64,
	/// Trials converted.
	pub conversions: u64,
}

/// `/analytics` reports.
pub struct AnalyticsApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	dispatcher: &'a Dispatcher<C>,
}
impl<'a, C> AnalyticsApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Wraps a dispatcher.
	pub fn new(dispatcher: &'a Dispatcher<C>) -> Self {
		Self { dispatcher }
	}

	/// `GET /analytics/revenue`.
	pub async fn revenue(self, filter: Option<&AnalyticsFilter>) -> Result<RevenueMetrics> {
		self.report("/analytics/revenue", filter).await
	}

	/// `GET /analytics/engagement`.
	pub async fn engagement(self, filter: Option<&AnalyticsFilter>) -> Result<EngagementMetrics> {
		self.report("/analytics/engagement", filter).await
	}

	/// `GET /analytics/churn`.
	pub async fn churn(self, filter: Option<&AnalyticsFilter>) -> Result<ChurnMetrics> {
		self.report("/analytics/churn", filter).await
	}

	/// `GET /analytics/member-growth`.
	pub async fn member_growth(
		self,
		filter: Option<&AnalyticsFilter>,
	) -> Result<MemberGrowthMetrics> {
		self.report("/analytics/member-growth", filter).await
	}

	/// `GET /analytics/subscriptions`.
	pub async fn subscription_metrics(
		self,
		filter: Option<&AnalyticsFilter>,
	) -> Result<SubscriptionMetrics> {
		self.report("/analytics/subscriptions", filter).await
	}

	async fn report<T>(self, path: &'static str, filter: Option<&AnalyticsFilter>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = ApiRequest::get(Resource::Analytics, path).with_query(&filter)?;

		self.dispatcher.dispatch(request).await
	}
}
impl<C> Clone for AnalyticsApi<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		*self
	}
}
impl<C> Copy for AnalyticsApi<'_, C> where C: ?Sized + ApiHttpClient {}
