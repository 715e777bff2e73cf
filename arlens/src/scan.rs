//! Scan loop scheduling.
//!
//! A plain state machine fed with `Instant`s from the UI update loop, so the
//! "timer" is just the next repaint. Nothing here spawns work; callers ask
//! [`ScanLoop::due`] and then [`ScanLoop::begin`] a cycle.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTiming {
	/// Pause between the end of one auto cycle and the start of the next.
	pub delay: Duration,
	/// Starts closer together than this are dropped.
	pub debounce: Duration,
}

impl Default for ScanTiming {
	fn default() -> Self {
		Self {
			delay: Duration::from_millis(1800),
			debounce: Duration::from_millis(1000),
		}
	}
}

/// Why a cycle did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
	InFlight,
	Debounced,
}

#[derive(Debug)]
pub struct ScanLoop {
	timing: ScanTiming,
	auto: bool,
	/// When the next automatic cycle may start. `None` = nothing scheduled.
	next_due: Option<Instant>,
	last_start: Option<Instant>,
	in_flight: bool,
}

impl ScanLoop {
	pub fn new(timing: ScanTiming, auto: bool, now: Instant) -> Self {
		Self {
			timing,
			auto,
			next_due: auto.then_some(now),
			last_start: None,
			in_flight: false,
		}
	}

	pub fn in_flight(&self) -> bool {
		self.in_flight
	}

	pub fn set_timing(&mut self, timing: ScanTiming) {
		self.timing = timing;
	}

	/// Turning auto-scan on schedules a cycle right away; turning it off drops
	/// the pending one. An in-flight cycle is left alone either way.
	pub fn set_auto(&mut self, on: bool, now: Instant) {
		self.auto = on;
		self.next_due = on.then_some(now);
	}

	/// Whether an automatic cycle should be attempted now.
	pub fn due(&self, now: Instant, ready: bool) -> bool {
		self.auto && ready && !self.in_flight && self.next_due.is_some_and(|due| now >= due)
	}

	/// Claim the single in-flight slot for a cycle starting at `now`.
	pub fn begin(&mut self, now: Instant) -> Result<(), Skip> {
		if self.in_flight {
			return Err(Skip::InFlight);
		}
		if let Some(last) = self.last_start
			&& now.saturating_duration_since(last) < self.timing.debounce
		{
			return Err(Skip::Debounced);
		}

		self.last_start = Some(now);
		self.in_flight = true;
		self.next_due = None;
		Ok(())
	}

	/// The cycle started by [`Self::begin`] is over (successfully or not).
	pub fn finish(&mut self, now: Instant) {
		self.in_flight = false;
		self.reschedule(now);
	}

	/// An automatic cycle was due but did not start.
	pub fn skip_auto(&mut self, now: Instant) {
		self.reschedule(now);
	}

	/// Drop any pending schedule (teardown).
	pub fn cancel(&mut self) {
		self.next_due = None;
	}

	/// How long until the next automatic cycle, if one is scheduled.
	pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
		if !self.auto || self.in_flight {
			return None;
		}
		self.next_due.map(|due| due.saturating_duration_since(now))
	}

	fn reschedule(&mut self, now: Instant) {
		if self.auto {
			self.next_due = Some(now + self.timing.delay);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ms(n: u64) -> Duration {
		Duration::from_millis(n)
	}

	#[test]
	fn manual_triggers_within_500ms_start_one_cycle() {
		let t0 = Instant::now();

		// Second tap while the first is still in flight.
		let mut scan = ScanLoop::new(ScanTiming::default(), false, t0);
		assert_eq!(scan.begin(t0), Ok(()));
		assert_eq!(scan.begin(t0 + ms(500)), Err(Skip::InFlight));

		// Second tap after the first already failed fast.
		let mut scan = ScanLoop::new(ScanTiming::default(), false, t0);
		assert_eq!(scan.begin(t0), Ok(()));
		scan.finish(t0 + ms(100));
		assert_eq!(scan.begin(t0 + ms(500)), Err(Skip::Debounced));
		assert_eq!(scan.begin(t0 + ms(1000)), Ok(()));
	}

	#[test]
	fn auto_cycle_waits_delay_after_completion() {
		let t0 = Instant::now();
		let mut scan = ScanLoop::new(ScanTiming::default(), true, t0);

		assert!(scan.due(t0, true));
		assert!(!scan.due(t0, false), "camera not ready");
		scan.begin(t0).unwrap();
		assert!(!scan.due(t0 + ms(5000), true), "in flight");

		let done = t0 + ms(700);
		scan.finish(done);
		assert_eq!(scan.time_until_due(done), Some(ms(1800)));
		assert!(!scan.due(done + ms(1799), true));
		assert!(scan.due(done + ms(1800), true));
	}

	#[test]
	fn toggling_off_cancels_schedule_but_not_flight() {
		let t0 = Instant::now();
		let mut scan = ScanLoop::new(ScanTiming::default(), true, t0);
		scan.begin(t0).unwrap();

		scan.set_auto(false, t0 + ms(10));
		assert!(scan.in_flight());
		scan.finish(t0 + ms(300));
		assert!(!scan.in_flight());
		assert_eq!(scan.time_until_due(t0 + ms(300)), None);
		assert!(!scan.due(t0 + ms(60_000), true));

		scan.set_auto(true, t0 + ms(2000));
		assert!(scan.due(t0 + ms(2000), true));
	}

	#[test]
	fn cancel_clears_pending_cycle() {
		let t0 = Instant::now();
		let mut scan = ScanLoop::new(ScanTiming::default(), true, t0);
		scan.cancel();
		assert!(!scan.due(t0 + ms(10_000), true));
		assert_eq!(scan.time_until_due(t0), None);
	}

	#[test]
	fn skipped_auto_cycle_is_rescheduled() {
		let t0 = Instant::now();
		let mut scan = ScanLoop::new(ScanTiming::default(), true, t0);
		scan.skip_auto(t0);
		assert!(!scan.due(t0 + ms(1000), true));
		assert!(scan.due(t0 + ms(1800), true));
	}
}
