//! # Pad Poller Module
//!
//! Drives a [`PadBus`] through the request/response poll cycle without
//! owning a timer. Each call to [`PadPoller::tick`] performs one step and
//! returns how long the caller should sleep before the next call, so the
//! poller slots into any scheduling style (a tokio sleep loop here, but a
//! bare timer wheel would do).
//!
//! ## Poll Cycle
//!
//! | Phase | Action | Next wake |
//! |-------|--------|-----------|
//! | `Requesting` | write the poll command | response delay |
//! | `Parsing` | read and decode the response | period minus response delay |
//!
//! A decode failure leaves the previously accepted frame in place, so
//! getters keep reporting the last good state while the link recovers.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::joybus::bus::PadBus;
use crate::joybus::protocol::{
    DEFAULT_POLL_PERIOD_MS, GC_RESPONSE_DELAY_MS, N64_RESPONSE_DELAY_MS,
};

/// Where the poller sits in the request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// The next tick writes a poll command.
    Requesting,
    /// The next tick reads and decodes the response.
    Parsing,
}

/// Timing for one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Full request-to-request period.
    pub period: Duration,
    /// Wait between writing a request and reading the response.
    pub response_delay: Duration,
}

impl PollTiming {
    /// Creates a timing from an explicit period and response delay.
    #[must_use]
    pub const fn new(period: Duration, response_delay: Duration) -> Self {
        Self {
            period,
            response_delay,
        }
    }

    /// Default timing for a GameCube controller.
    #[must_use]
    pub const fn gamecube() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_POLL_PERIOD_MS),
            Duration::from_millis(GC_RESPONSE_DELAY_MS),
        )
    }

    /// Default timing for an N64 controller.
    #[must_use]
    pub const fn n64() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_POLL_PERIOD_MS),
            Duration::from_millis(N64_RESPONSE_DELAY_MS),
        )
    }
}

/// Running counters for poll outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollStats {
    /// Responses that decoded into a valid frame.
    pub frames_ok: u64,
    /// Responses that were missing, short, or malformed.
    pub frames_failed: u64,
    /// Failures since the last valid frame.
    pub consecutive_failures: u32,
    /// Whether the controller currently answers polls.
    pub link_up: bool,
}

/// Steps a [`PadBus`] through poll cycles and tracks link health.
#[derive(Debug)]
pub struct PadPoller<B: PadBus> {
    bus: B,
    phase: PollPhase,
    timing: PollTiming,
    stats: PollStats,
    link_down_threshold: u32,
    running: bool,
}

impl<B: PadBus> PadPoller<B> {
    /// Creates a stopped poller around a bus.
    ///
    /// `link_down_threshold` is the consecutive failure count at which the
    /// link is declared lost.
    pub fn new(bus: B, timing: PollTiming, link_down_threshold: u32) -> Self {
        Self {
            bus,
            phase: PollPhase::Requesting,
            timing,
            stats: PollStats::default(),
            link_down_threshold,
            running: false,
        }
    }

    /// Opens the bus and begins polling from a fresh request phase.
    ///
    /// Restarting resets the failure streak but keeps the cumulative
    /// frame counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus fails to start.
    pub async fn start(&mut self) -> Result<()> {
        self.bus.start().await?;
        self.phase = PollPhase::Requesting;
        self.stats.consecutive_failures = 0;
        self.running = true;
        Ok(())
    }

    /// Stops polling and closes the bus.
    ///
    /// Ticks after this return the full period without touching the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus fails to stop.
    pub async fn stop(&mut self) -> Result<()> {
        self.running = false;
        self.bus.stop().await
    }

    /// Performs one poll step and returns the delay until the next.
    ///
    /// In the request phase the poll command is written and the response
    /// delay returned. In the parse phase the response is decoded, stats
    /// are updated and the remainder of the period returned. A failed
    /// request write is recorded by the parse that follows it.
    pub async fn tick(&mut self) -> Duration {
        if !self.running {
            return self.timing.period;
        }

        match self.phase {
            PollPhase::Requesting => {
                if let Err(error) = self.bus.issue_request().await {
                    debug!("Poll request failed: {}", error);
                }
                self.phase = PollPhase::Parsing;
                self.timing.response_delay
            }
            PollPhase::Parsing => {
                if self.bus.decode_response().await {
                    self.record_ok();
                } else {
                    self.record_failure();
                }
                self.phase = PollPhase::Requesting;
                self.timing.period.saturating_sub(self.timing.response_delay)
            }
        }
    }

    fn record_ok(&mut self) {
        self.stats.frames_ok += 1;
        self.stats.consecutive_failures = 0;
        if !self.stats.link_up {
            self.stats.link_up = true;
            info!("Controller link established");
        }
    }

    fn record_failure(&mut self) {
        self.stats.frames_failed += 1;
        self.stats.consecutive_failures = self.stats.consecutive_failures.saturating_add(1);
        if self.stats.link_up && self.stats.consecutive_failures >= self.link_down_threshold {
            self.stats.link_up = false;
            warn!(
                "Controller link lost after {} consecutive poll failures",
                self.stats.consecutive_failures
            );
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Returns a snapshot of the poll counters.
    #[must_use]
    pub fn stats(&self) -> PollStats {
        self.stats
    }

    /// Returns whether the poller is between `start` and `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the configured timing.
    #[must_use]
    pub fn timing(&self) -> PollTiming {
        self.timing
    }

    /// Returns the bus, for reading the accepted frame.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns the bus mutably, for seeding the frame record.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JoybusPadError;
    use crate::joybus::frame::GameCubeFrame;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::Sequence;

    mock! {
        pub GcBus {}

        #[async_trait]
        impl PadBus for GcBus {
            type Frame = GameCubeFrame;

            async fn start(&mut self) -> Result<()>;
            async fn stop(&mut self) -> Result<()>;
            async fn issue_request(&mut self) -> Result<()>;
            async fn decode_response(&mut self) -> bool;
            fn frame(&self) -> &GameCubeFrame;
            fn frame_mut(&mut self) -> &mut GameCubeFrame;
        }
    }

    fn timing_ms(period: u64, response_delay: u64) -> PollTiming {
        PollTiming::new(
            Duration::from_millis(period),
            Duration::from_millis(response_delay),
        )
    }

    // ==================== Tick Cycle Tests ====================

    #[tokio::test]
    async fn test_tick_alternates_request_and_parse() {
        let mut bus = MockGcBus::new();
        let mut seq = Sequence::new();
        bus.expect_start()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        bus.expect_issue_request()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        bus.expect_decode_response()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| true);

        let mut poller = PadPoller::new(bus, timing_ms(15, 2), 5);
        poller.start().await.unwrap();
        assert_eq!(poller.phase(), PollPhase::Requesting);

        let delay = poller.tick().await;
        assert_eq!(delay, Duration::from_millis(2));
        assert_eq!(poller.phase(), PollPhase::Parsing);

        let delay = poller.tick().await;
        assert_eq!(delay, Duration::from_millis(13));
        assert_eq!(poller.phase(), PollPhase::Requesting);
        assert_eq!(poller.stats().frames_ok, 1);
    }

    #[tokio::test]
    async fn test_tick_before_any_cycle_uses_configured_timing() {
        let mut bus = MockGcBus::new();
        bus.expect_start().returning(|| Ok(()));
        bus.expect_issue_request().returning(|| Ok(()));
        bus.expect_decode_response().returning(|| true);

        let timing = PollTiming::gamecube();
        let mut poller = PadPoller::new(bus, timing, 5);
        poller.start().await.unwrap();

        assert_eq!(poller.tick().await, timing.response_delay);
        assert_eq!(
            poller.tick().await,
            timing.period - timing.response_delay
        );
    }

    #[tokio::test]
    async fn test_request_error_still_advances_to_parse() {
        let mut bus = MockGcBus::new();
        bus.expect_start().returning(|| Ok(()));
        bus.expect_issue_request()
            .times(1)
            .returning(|| Err(JoybusPadError::Serial("bus offline".to_string())));
        bus.expect_decode_response().times(1).returning(|| false);

        let mut poller = PadPoller::new(bus, timing_ms(15, 2), 5);
        poller.start().await.unwrap();

        poller.tick().await;
        assert_eq!(poller.phase(), PollPhase::Parsing);

        poller.tick().await;
        assert_eq!(poller.stats().frames_failed, 1);
    }

    #[tokio::test]
    async fn test_response_delay_longer_than_period_saturates() {
        let mut bus = MockGcBus::new();
        bus.expect_start().returning(|| Ok(()));
        bus.expect_issue_request().returning(|| Ok(()));
        bus.expect_decode_response().returning(|| true);

        let mut poller = PadPoller::new(bus, timing_ms(2, 5), 5);
        poller.start().await.unwrap();

        assert_eq!(poller.tick().await, Duration::from_millis(5));
        assert_eq!(poller.tick().await, Duration::ZERO);
    }

    // ==================== Stop Tests ====================

    #[tokio::test]
    async fn test_tick_before_start_leaves_bus_alone() {
        // Strict mock with no expectations: any bus call would panic
        let bus = MockGcBus::new();
        let mut poller = PadPoller::new(bus, timing_ms(15, 2), 5);

        assert!(!poller.is_running());
        assert_eq!(poller.tick().await, Duration::from_millis(15));
    }

    #[tokio::test]
    async fn test_stray_tick_after_stop_touches_nothing() {
        let mut bus = MockGcBus::new();
        bus.expect_start().times(1).returning(|| Ok(()));
        bus.expect_stop().times(1).returning(|| Ok(()));
        bus.expect_issue_request().times(0);
        bus.expect_decode_response().times(0);

        let mut poller = PadPoller::new(bus, timing_ms(15, 2), 5);
        poller.start().await.unwrap();
        poller.stop().await.unwrap();
        assert!(!poller.is_running());

        let delay = poller.tick().await;
        assert_eq!(delay, Duration::from_millis(15));
        assert_eq!(poller.stats(), PollStats::default());
    }

    #[tokio::test]
    async fn test_restart_resets_streak_but_keeps_counters() {
        let mut bus = MockGcBus::new();
        bus.expect_start().returning(|| Ok(()));
        bus.expect_stop().returning(|| Ok(()));
        bus.expect_issue_request().returning(|| Ok(()));
        bus.expect_decode_response().returning(|| false);

        let mut poller = PadPoller::new(bus, timing_ms(15, 2), 10);
        poller.start().await.unwrap();
        for _ in 0..4 {
            poller.tick().await;
        }
        assert_eq!(poller.stats().frames_failed, 2);
        assert_eq!(poller.stats().consecutive_failures, 2);

        poller.stop().await.unwrap();
        poller.start().await.unwrap();
        assert_eq!(poller.stats().frames_failed, 2);
        assert_eq!(poller.stats().consecutive_failures, 0);
        assert_eq!(poller.phase(), PollPhase::Requesting);
    }

    // ==================== Link Health Tests ====================

    #[tokio::test]
    async fn test_link_comes_up_on_first_valid_frame() {
        let mut bus = MockGcBus::new();
        bus.expect_start().returning(|| Ok(()));
        bus.expect_issue_request().returning(|| Ok(()));
        bus.expect_decode_response().times(1).returning(|| true);

        let mut poller = PadPoller::new(bus, timing_ms(15, 2), 5);
        poller.start().await.unwrap();
        assert!(!poller.stats().link_up);

        poller.tick().await;
        poller.tick().await;
        assert!(poller.stats().link_up);
        assert_eq!(poller.stats().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_link_drops_at_threshold_and_recovers() {
        let mut bus = MockGcBus::new();
        let mut seq = Sequence::new();
        bus.expect_start().returning(|| Ok(()));
        bus.expect_issue_request().returning(|| Ok(()));
        bus.expect_decode_response()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| true);
        bus.expect_decode_response()
            .times(3)
            .in_sequence(&mut seq)
            .returning(|| false);
        bus.expect_decode_response()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| true);

        let mut poller = PadPoller::new(bus, timing_ms(15, 2), 3);
        poller.start().await.unwrap();

        // One good frame brings the link up
        poller.tick().await;
        poller.tick().await;
        assert!(poller.stats().link_up);

        // Two failures: still up, streak growing
        for _ in 0..4 {
            poller.tick().await;
        }
        assert!(poller.stats().link_up);
        assert_eq!(poller.stats().consecutive_failures, 2);

        // Third failure crosses the threshold
        poller.tick().await;
        poller.tick().await;
        assert!(!poller.stats().link_up);
        assert_eq!(poller.stats().consecutive_failures, 3);

        // A valid frame restores the link and clears the streak
        poller.tick().await;
        poller.tick().await;
        assert!(poller.stats().link_up);
        assert_eq!(poller.stats().consecutive_failures, 0);
        assert_eq!(poller.stats().frames_ok, 2);
        assert_eq!(poller.stats().frames_failed, 3);
    }

    // ==================== Timing Preset Tests ====================

    #[test]
    fn test_family_timing_presets() {
        let gc = PollTiming::gamecube();
        assert_eq!(gc.period, Duration::from_millis(15));
        assert_eq!(gc.response_delay, Duration::from_millis(2));

        let n64 = PollTiming::n64();
        assert_eq!(n64.period, Duration::from_millis(15));
        assert_eq!(n64.response_delay, Duration::from_millis(1));
    }

    #[test]
    fn test_stats_default_is_link_down() {
        let stats = PollStats::default();
        assert_eq!(stats.frames_ok, 0);
        assert_eq!(stats.frames_failed, 0);
        assert_eq!(stats.consecutive_failures, 0);
        assert!(!stats.link_up);
    }
}
