//! Members: the people holding subscriptions.

// crates.io
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	dispatch::Dispatcher,
	http::ApiHttpClient,
	request::{ApiRequest, Resource},
	resources::{Id, Subscription},
};

/// Lifecycle state of a member account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
	/// In good standing.
	Active,
	/// Lapsed or disabled.
	Inactive,
	/// Awaiting confirmation.
	Pending,
	/// Closed by the member or an administrator.
	Cancelled,
}
impl MemberStatus {
	/// Wire token.
	pub const fn as_str(self) -> &'static str {
		match self {
			MemberStatus::Active => "active",
			MemberStatus::Inactive => "inactive",
			MemberStatus::Pending => "pending",
			MemberStatus::Cancelled => "cancelled",
		}
	}
}
impl Display for MemberStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Member record as returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
	/// Identifier.
	pub id: Id,
	/// Login e-mail.
	pub email: String,
	/// Given name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Account state.
	pub status: MemberStatus,
	/// Subscriptions embedded by the server, if any.
	#[serde(default)]
	pub subscriptions: Vec<Subscription>,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Last modification instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub updated_at: Option<OffsetDateTime>,
}

/// Payload for [`MemberApi::create`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
	/// Login e-mail.
	pub email: String,
	/// Given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
}
impl NewMember {
	/// Creates a payload with only the e-mail set.
	pub fn new(email: impl Into<String>) -> Self {
		Self { email: email.into(), first_name: None, last_name: None }
	}

	/// Sets the given and family names.
	pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
		self.first_name = Some(first.into());
		self.last_name = Some(last.into());

		self
	}
}

/// Partial update; unset fields are left untouched by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
	/// New e-mail.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// New given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// New family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// New account state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<MemberStatus>,
}

/// Query filter for [`MemberApi::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFilter {
	/// Only members in this state.
	pub status: Option<MemberStatus>,
	/// Free-text search over names and e-mail.
	pub search: Option<String>,
	/// 1-based page number.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
}

/// Reply of [`MemberApi::check_access`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheck {
	/// Whether the member may use the membership.
	#[serde(default)]
	pub has_access: bool,
	/// When access lapses, as sent by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<String>,
	/// Any further fields, preserved verbatim.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[derive(Serialize)]
struct StatusChange {
	status: MemberStatus,
}

#[derive(Serialize)]
struct BulkUpdate<'a> {
	ids: &'a [Id],
	#[serde(flatten)]
	data: &'a MemberUpdate,
}

/// `/members` endpoints.
pub struct MemberApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	dispatcher: &'a Dispatcher<C>,
}
impl<'a, C> MemberApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Wraps a dispatcher.
	pub fn new(dispatcher: &'a Dispatcher<C>) -> Self {
		Self { dispatcher }
	}

	/// `POST /members`.
	pub async fn create(self, member: &NewMember) -> Result<Member> {
		let request = ApiRequest::post(Resource::Members, "/members").with_body(member)?;

		self.dispatcher.dispatch(request).await
	}

	/// `GET /members/{id}`.
	pub async fn get(self, id: Id) -> Result<Member> {
		self.dispatcher.dispatch(ApiRequest::get(Resource::Members, format!("/members/{id}"))).await
	}

	/// `PUT /members/{id}`.
	pub async fn update(self, id: Id, update: &MemberUpdate) -> Result<Member> {
		let request =
			ApiRequest::put(Resource::Members, format!("/members/{id}")).with_body(update)?;

		self.dispatcher.dispatch(request).await
	}

	/// `DELETE /members/{id}`.
	pub async fn delete(self, id: Id) -> Result<()> {
		self.dispatcher
			.dispatch_value(ApiRequest::delete(Resource::Members, format!("/members/{id}")))
			.await
			.map(|_| ())
	}

	/// `GET /members` with optional filters.
	pub async fn list(self, filter: Option<&MemberFilter>) -> Result<Vec<Member>> {
		let request = ApiRequest::get(Resource::Members, "/members").with_query(&filter)?;

		self.dispatcher.dispatch(request).await
	}

	/// `PATCH /members/{id}/status`.
	pub async fn update_status(self, id: Id, status: MemberStatus) -> Result<Member> {
		let request = ApiRequest::patch(Resource::Members, format!("/members/{id}/status"))
			.with_body(&StatusChange { status })?;

		self.dispatcher.dispatch(request).await
	}

	/// `PUT /members/bulk`, applying the same update to every id.
	pub async fn bulk_update(self, ids: &[Id], update: &MemberUpdate) -> Result<Vec<Member>> {
		let request = ApiRequest::put(Resource::Members, "/members/bulk")
			.with_body(&BulkUpdate { ids, data: update })?;

		self.dispatcher.dispatch(request).await
	}

	/// `GET /members/{id}/access/{membership_id}`.
	pub async fn check_access(self, id: Id, membership_id: Id) -> Result<AccessCheck> {
		let request =
			ApiRequest::get(Resource::Members, format!("/members/{id}/access/{membership_id}"));

		self.dispatcher.dispatch(request).await
	}
}
impl<C> Clone for MemberApi<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		*self
	}
}
impl<C> Copy for MemberApi<'_, C> where C: ?Sized + ApiHttpClient {}
