//! In-process response cache with a uniform TTL and a background sweeper.
//!
//! Reads check expiry themselves and evict stale entries on the spot, so the sweeper is pure
//! housekeeping: it bounds memory for keys that are written once and never read again. The
//! sweeper runs on the current Tokio runtime every `min(ttl, 60s)`, holds only a weak handle
//! to the map, and is aborted by [`ResponseCache::shutdown`] or when the cache is dropped.

// crates.io
use tokio::{
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Upper bound on the sweep period.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

type EntryMap = Arc<Mutex<HashMap<String, CacheEntry>>>;

#[derive(Clone, Debug)]
struct CacheEntry {
	value: Value,
	expires_at: Instant,
}
impl CacheEntry {
	fn is_expired_at(&self, now: Instant) -> bool {
		now > self.expires_at
	}
}

/// TTL cache of decoded JSON responses keyed by request fingerprint.
#[derive(Debug)]
pub struct ResponseCache {
	entries: EntryMap,
	ttl: Duration,
	sweeper: Mutex<Option<JoinHandle<()>>>,
}
impl ResponseCache {
	/// Creates a cache and spawns its sweeper on the current Tokio runtime.
	pub fn new(ttl: Duration) -> Result<Self, ConfigError> {
		if ttl.is_zero() {
			return Err(ConfigError::ZeroCacheTimeout);
		}

		let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
		let entries = EntryMap::default();
		let sweeper = runtime.spawn(sweep_loop(Arc::downgrade(&entries), sweep_interval(ttl)));

		Ok(Self { entries, ttl, sweeper: Mutex::new(Some(sweeper)) })
	}

	/// Configured time-to-live.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Stores `value` under `key`, replacing any existing entry.
	pub fn set(&self, key: impl Into<String>, value: Value) {
		let entry = CacheEntry { value, expires_at: Instant::now() + self.ttl };

		self.entries.lock().insert(key.into(), entry);
	}

	/// Returns the live value under `key`, evicting it if it has expired.
	pub fn get(&self, key: &str) -> Option<Value> {
		let now = Instant::now();
		let mut guard = self.entries.lock();

		match guard.get(key) {
			Some(entry) if entry.is_expired_at(now) => {
				guard.remove(key);

				None
			},
			Some(entry) => Some(entry.value.clone()),
			None => None,
		}
	}

	/// Removes every entry.
	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	/// Number of stored entries, including stale ones not yet swept.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns true when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Evicts every expired entry and returns how many were removed.
	pub fn sweep_expired(&self) -> usize {
		sweep(&self.entries)
	}

	/// Stops the background sweeper. Reads and writes keep working.
	pub fn shutdown(&self) {
		if let Some(handle) = self.sweeper.lock().take() {
			handle.abort();
		}
	}

	/// Returns true while the sweeper task is running.
	pub fn is_sweeping(&self) -> bool {
		self.sweeper.lock().as_ref().is_some_and(|handle| !handle.is_finished())
	}
}
impl Drop for ResponseCache {
	fn drop(&mut self) {
		self.shutdown();
	}
}

/// Sweep cadence for a given TTL.
pub fn sweep_interval(ttl: Duration) -> Duration {
	ttl.min(MAX_SWEEP_INTERVAL)
}

fn sweep(entries: &Mutex<HashMap<String, CacheEntry>>) -> usize {
	let now = Instant::now();
	let mut guard = entries.lock();
	let before = guard.len();

	guard.retain(|_, entry| entry.expires_at >= now);

	before - guard.len()
}

async fn sweep_loop(entries: Weak<Mutex<HashMap<String, CacheEntry>>>, period: Duration) {
	let mut ticker = time::interval_at(Instant::now() + period, period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		let Some(entries) = entries.upgrade() else {
			break;
		};
		let evicted = sweep(&entries);

		#[cfg(feature = "tracing")]
		{
			if evicted > 0 {
				tracing::trace!(evicted, "Swept expired cache entries.");
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = evicted;
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn set_then_get_returns_value_until_ttl() {
		let cache = ResponseCache::new(Duration::from_secs(10)).expect("Cache should start.");

		cache.set("GET /members/1", json!({ "id": 1 }));

		assert_eq!(cache.get("GET /members/1"), Some(json!({ "id": 1 })));

		time::advance(Duration::from_secs(10)).await;

		assert_eq!(cache.get("GET /members/1"), Some(json!({ "id": 1 })));

		time::advance(Duration::from_millis(1)).await;

		assert_eq!(cache.get("GET /members/1"), None);
		assert!(cache.is_empty(), "Expired reads must evict the entry.");
	}

	#[tokio::test(start_paused = true)]
	async fn set_overwrites_and_refreshes_expiry() {
		let cache = ResponseCache::new(Duration::from_secs(10)).expect("Cache should start.");

		cache.set("k", json!("old"));
		time::advance(Duration::from_secs(8)).await;
		cache.set("k", json!("new"));
		time::advance(Duration::from_secs(8)).await;

		assert_eq!(cache.get("k"), Some(json!("new")));
	}

	#[tokio::test]
	async fn clear_removes_everything() {
		let cache = ResponseCache::new(Duration::from_secs(60)).expect("Cache should start.");

		cache.set("a", json!(1));
		cache.set("b", json!(2));
		cache.clear();

		assert_eq!(cache.get("a"), None);
		assert_eq!(cache.get("b"), None);
		assert_eq!(cache.len(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn manual_sweep_evicts_only_stale_entries() {
		let cache = ResponseCache::new(Duration::from_secs(5)).expect("Cache should start.");

		cache.shutdown();
		cache.set("stale", json!(1));
		time::advance(Duration::from_secs(4)).await;
		cache.set("fresh", json!(2));
		time::advance(Duration::from_secs(2)).await;

		assert_eq!(cache.sweep_expired(), 1);
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get("fresh"), Some(json!(2)));
	}

	#[tokio::test(start_paused = true)]
	async fn background_sweep_shrinks_unread_entries() {
		let cache = ResponseCache::new(Duration::from_secs(2)).expect("Cache should start.");

		cache.set("never-read-1", json!(1));
		cache.set("never-read-2", json!(2));

		assert_eq!(cache.len(), 2);

		// Two sweep periods: the first tick lands exactly on the expiry instant.
		time::sleep(Duration::from_secs(5)).await;

		assert_eq!(cache.len(), 0);
	}

	#[tokio::test]
	async fn shutdown_stops_the_sweeper() {
		let cache = ResponseCache::new(Duration::from_secs(1)).expect("Cache should start.");

		assert!(cache.is_sweeping());

		cache.shutdown();

		assert!(!cache.is_sweeping());

		cache.set("still-works", json!(true));

		assert_eq!(cache.get("still-works"), Some(json!(true)));
	}

	#[test]
	fn construction_requires_a_runtime() {
		let err = ResponseCache::new(Duration::from_secs(1))
			.expect_err("Building outside a runtime should fail.");

		assert!(matches!(err, ConfigError::NoRuntime));
	}

	#[test]
	fn sweep_interval_is_capped_at_one_minute() {
		assert_eq!(sweep_interval(Duration::from_secs(5)), Duration::from_secs(5));
		assert_eq!(sweep_interval(Duration::from_secs(300)), MAX_SWEEP_INTERVAL);
	}
}
