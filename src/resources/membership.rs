//! Memberships: the plans members can subscribe to.

// crates.io
use serde_json::Map;
// self
use crate::{
	_prelude::*,
	dispatch::Dispatcher,
	http::ApiHttpClient,
	request::{ApiRequest, Resource},
	resources::Id,
};

/// Membership plan. Fields beyond `id` and `title` vary by site and are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Membership {
	/// Identifier.
	pub id: Id,
	/// Display title.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Remaining fields, preserved verbatim.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Query filter for [`MembershipApi::list`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipFilter {
	/// Free-text search over titles.
	pub search: Option<String>,
	/// 1-based page number.
	pub page: Option<u32>,
	/// Page size.
	pub limit: Option<u32>,
}

/// `/memberships` endpoints.
pub struct MembershipApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	dispatcher: &'a Dispatcher<C>,
}
impl<'a, C> MembershipApi<'a, C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Wraps a dispatcher.
	pub fn new(dispatcher: &'a Dispatcher<C>) -> Self {
		Self { dispatcher }
	}

	/// `GET /memberships` with optional filters.
	pub async fn list(self, filter: Option<&MembershipFilter>) -> Result<Vec<Membership>> {
		let request = ApiRequest::get(Resource::Memberships, "/memberships").with_query(&filter)?;

		self.dispatcher.dispatch(request).await
	}

	/// `GET /memberships/{id}`.
	pub async fn get(self, id: Id) -> Result<Membership> {
		self.dispatcher
			.dispatch(ApiRequest::get(Resource::Memberships, format!("/memberships/{id}")))
			.await
	}
}
impl<C> Clone for MembershipApi<'_, C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		*self
	}
}
impl<C> Copy for MembershipApi<'_, C> where C: ?Sized + ApiHttpClient {}
