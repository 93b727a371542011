//! Per-second request admission throttle.
//!
//! [`RateLimiter`] admits at most `limit` request *starts* per window. The running counter is
//! never decremented when a request finishes; it only resets when the window timer fires, at
//! which point queued callers are released front-first up to the limit. This bounds how many
//! requests begin each second, independent of how long each one takes, so it must not be
//! read as a concurrency semaphore.
//!
//! The window timer is an owned Tokio task. [`RateLimiter::shutdown`] aborts it and rejects
//! every queued caller with [`Error::LimiterClosed`], so nobody is left suspended forever.

// crates.io
use tokio::{
	sync::oneshot,
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Fixed admission window.
pub const WINDOW: Duration = Duration::from_secs(1);

type SharedState = Arc<Mutex<LimiterState>>;

#[derive(Debug)]
struct LimiterState {
	limit: u32,
	running: u32,
	waiters: VecDeque<oneshot::Sender<()>>,
	closed: bool,
}
impl LimiterState {
	fn rotate(&mut self) -> usize {
		let mut released = 0;

		self.running = 0;

		while self.running < self.limit {
			let Some(waiter) = self.waiters.pop_front() else {
				break;
			};

			// A send error means the caller dropped its `acquire` future; skip it for free.
			if waiter.send(()).is_ok() {
				self.running += 1;
				released += 1;
			}
		}

		released
	}
}

/// Fixed-window throttle on request starts with a FIFO wait queue.
#[derive(Debug)]
pub struct RateLimiter {
	state: SharedState,
	window: Duration,
	ticker: Mutex<Option<JoinHandle<()>>>,
}
impl RateLimiter {
	/// Creates a limiter admitting `limit` starts per second.
	pub fn new(limit: u32) -> Result<Self, ConfigError> {
		Self::with_window(limit, WINDOW)
	}

	/// Creates a limiter with a custom window length.
	pub fn with_window(limit: u32, window: Duration) -> Result<Self, ConfigError> {
		if limit == 0 {
			return Err(ConfigError::ZeroRateLimit);
		}
		if window.is_zero() {
			return Err(ConfigError::ZeroRateWindow);
		}

		let runtime = tokio::runtime::Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;
		let state = Arc::new(Mutex::new(LimiterState {
			limit,
			running: 0,
			waiters: VecDeque::new(),
			closed: false,
		}));
		let ticker = runtime.spawn(window_loop(Arc::downgrade(&state), window));

		Ok(Self { state, window, ticker: Mutex::new(Some(ticker)) })
	}

	/// Waits until a start is permitted in the current or a later window.
	pub async fn acquire(&self) -> Result<()> {
		let permit = {
			let mut state = self.state.lock();

			if state.closed {
				return Err(Error::LimiterClosed);
			}
			if state.running < state.limit {
				state.running += 1;

				return Ok(());
			}

			let (tx, rx) = oneshot::channel();

			state.waiters.push_back(tx);

			rx
		};

		permit.await.map_err(|_| Error::LimiterClosed)
	}

	/// Resets the window immediately and releases queued callers; returns how many went through.
	///
	/// The background timer calls this once per window.
	pub fn rotate_window(&self) -> usize {
		self.state.lock().rotate()
	}

	/// Starts admitted per window.
	pub fn limit(&self) -> u32 {
		self.state.lock().limit
	}

	/// Window length.
	pub fn window(&self) -> Duration {
		self.window
	}

	/// Starts admitted so far in the current window.
	pub fn running(&self) -> u32 {
		self.state.lock().running
	}

	/// Callers currently waiting for a later window.
	pub fn queued(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Returns true once [`shutdown`](Self::shutdown) has been called.
	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}

	/// Stops the window timer and rejects every queued and future caller.
	pub fn shutdown(&self) {
		if let Some(handle) = self.ticker.lock().take() {
			handle.abort();
		}

		let mut state = self.state.lock();

		state.closed = true;
		// Dropping the senders wakes each waiter with `LimiterClosed`.
		state.waiters.clear();
	}
}
impl Drop for RateLimiter {
	fn drop(&mut self) {
		self.shutdown();
	}
}

async fn window_loop(state: Weak<Mutex<LimiterState>>, window: Duration) {
	let mut ticker = time::interval_at(Instant::now() + window, window);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		let Some(state) = state.upgrade() else {
			break;
		};
		let released = state.lock().rotate();

		#[cfg(feature = "tracing")]
		{
			if released > 0 {
				tracing::trace!(released, "Released queued requests into the new window.");
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = released;
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const NEVER: Duration = Duration::from_secs(3600);

	async fn settle() {
		for _ in 0..16 {
			tokio::task::yield_now().await;
		}
	}

	fn spawn_marked(
		limiter: &Arc<RateLimiter>,
		marks: &Arc<Mutex<Vec<u32>>>,
		id: u32,
	) -> JoinHandle<Result<()>> {
		let limiter = limiter.clone();
		let marks = marks.clone();

		tokio::spawn(async move {
			limiter.acquire().await?;
			marks.lock().push(id);

			Ok::<_, Error>(())
		})
	}

	#[tokio::test]
	async fn admits_up_to_limit_without_waiting() {
		let limiter = RateLimiter::with_window(3, NEVER).expect("Limiter should start.");

		for _ in 0..3 {
			limiter.acquire().await.expect("Under-limit acquire should succeed.");
		}

		assert_eq!(limiter.running(), 3);
		assert_eq!(limiter.queued(), 0);
	}

	#[tokio::test]
	async fn one_over_limit_waits_for_next_window() {
		let limiter = Arc::new(RateLimiter::with_window(2, NEVER).expect("Limiter should start."));
		let marks = Arc::new(Mutex::new(Vec::new()));
		let handles = (0..3).map(|id| spawn_marked(&limiter, &marks, id)).collect::<Vec<_>>();

		settle().await;

		assert_eq!(marks.lock().len(), 2);
		assert_eq!(limiter.queued(), 1);

		assert_eq!(limiter.rotate_window(), 1);

		for handle in handles {
			handle.await.expect("Task should not panic.").expect("Acquire should succeed.");
		}

		assert_eq!(marks.lock().len(), 3);
		assert_eq!(limiter.running(), 1, "Released waiters count against the new window.");
	}

	#[tokio::test]
	async fn releases_waiters_in_arrival_order() {
		let limiter = Arc::new(RateLimiter::with_window(1, NEVER).expect("Limiter should start."));
		let marks = Arc::new(Mutex::new(Vec::new()));

		limiter.acquire().await.expect("First acquire should be immediate.");

		let mut handles = Vec::new();

		for id in 1..=3 {
			handles.push(spawn_marked(&limiter, &marks, id));
			settle().await;
		}

		assert_eq!(limiter.queued(), 3);

		for expected in 1..=3_usize {
			assert_eq!(limiter.rotate_window(), 1);
			settle().await;
			assert_eq!(marks.lock().len(), expected);
		}

		assert_eq!(*marks.lock(), vec![1, 2, 3]);

		for handle in handles {
			handle.await.expect("Task should not panic.").expect("Acquire should succeed.");
		}
	}

	#[tokio::test(start_paused = true)]
	async fn background_timer_resets_the_window() {
		let limiter =
			RateLimiter::with_window(1, Duration::from_millis(50)).expect("Limiter should start.");
		let started = Instant::now();

		limiter.acquire().await.expect("First acquire should be immediate.");
		limiter.acquire().await.expect("Second acquire should pass after the window resets.");

		assert!(started.elapsed() >= Duration::from_millis(50));
		assert_eq!(limiter.running(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn cancelled_waiters_do_not_consume_slots() {
		let limiter = Arc::new(RateLimiter::with_window(1, NEVER).expect("Limiter should start."));
		let marks = Arc::new(Mutex::new(Vec::new()));

		limiter.acquire().await.expect("First acquire should be immediate.");

		let abandoned = time::timeout(Duration::from_millis(10), limiter.acquire()).await;

		assert!(abandoned.is_err(), "The over-limit acquire should still be pending.");

		let handle = spawn_marked(&limiter, &marks, 7);

		settle().await;

		assert_eq!(limiter.queued(), 2);
		assert_eq!(limiter.rotate_window(), 1);

		handle.await.expect("Task should not panic.").expect("Acquire should succeed.");

		assert_eq!(*marks.lock(), vec![7]);
		assert_eq!(limiter.queued(), 0);
	}

	#[tokio::test]
	async fn shutdown_rejects_queued_and_later_callers() {
		let limiter = Arc::new(RateLimiter::with_window(1, NEVER).expect("Limiter should start."));
		let marks = Arc::new(Mutex::new(Vec::new()));

		limiter.acquire().await.expect("First acquire should be immediate.");

		let handle = spawn_marked(&limiter, &marks, 1);

		settle().await;
		limiter.shutdown();

		let err = handle
			.await
			.expect("Task should not panic.")
			.expect_err("Queued caller should be rejected on shutdown.");

		assert!(matches!(err, Error::LimiterClosed));
		assert!(matches!(limiter.acquire().await, Err(Error::LimiterClosed)));
		assert!(limiter.is_closed());
		assert!(marks.lock().is_empty());
	}

	#[tokio::test]
	async fn zero_limit_is_rejected() {
		assert!(matches!(RateLimiter::new(0), Err(ConfigError::ZeroRateLimit)));
	}

	#[tokio::test]
	async fn zero_window_is_rejected() {
		assert!(matches!(
			RateLimiter::with_window(1, Duration::ZERO),
			Err(ConfigError::ZeroRateWindow)
		));
	}

	#[test]
	fn construction_requires_a_runtime() {
		assert!(matches!(RateLimiter::new(1), Err(ConfigError::NoRuntime)));
	}
}
