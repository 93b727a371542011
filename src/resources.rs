//! Typed wrappers over the REST resources.
//!
//! Each handle borrows the client's [`Dispatcher`](crate::dispatch::Dispatcher), builds an
//! [`ApiRequest`](crate::request::ApiRequest) for one endpoint, and decodes the JSON reply
//! into the matching model. Handles are `Copy` and hold no state of their own; their futures
//! borrow only the dispatcher, so several calls can be awaited side by side.

// crates.io
use time::Date;

pub mod analytics;
pub mod member;
pub mod membership;
pub mod subscription;
pub mod transaction;

pub use analytics::*;
pub use member::*;
pub use membership::*;
pub use subscription::*;
pub use transaction::*;

/// Server-assigned identifier.
pub type Id = u64;

// Filters send calendar dates as `YYYY-MM-DD`.
time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");
