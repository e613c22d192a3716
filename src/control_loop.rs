//! Bounded polling loop for the motions that wait on the hardware.
//!
//! The motor is started, then the encoder (and the sensors) are polled until the motion
//! reaches its goal. Each poll is followed by a pause. The loop gives up when
//! the caller cancels, the deadline passes, the poll budget is exhausted or the encoder
//! stops changing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use crate::arm_error::{ArmError, MotionPhase, StallCause};
use crate::hardware::Delay;

/// Shared flag to stop a running motion from another thread or a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step<T> {
    /// Not there yet. The encoder reading is used to detect a stalled motor.
    Pending { encoder: i64 },
    Done(T),
}

/// Counts consecutive polls with the same encoder reading.
#[derive(Debug, Clone)]
pub struct StallDetector {
    limit: u32,
    last: Option<i64>,
    unchanged: u32,
}

impl StallDetector {
    pub fn new(limit: u32) -> Self {
        StallDetector { limit, last: None, unchanged: 0 }
    }

    /// Returns true once the encoder did not change for `limit` polls in a row.
    pub fn observe(&mut self, encoder: i64) -> bool {
        if self.last == Some(encoder) {
            self.unchanged += 1;
        } else {
            self.last = Some(encoder);
            self.unchanged = 0;
        }
        self.unchanged >= self.limit
    }

    pub fn last(&self) -> Option<i64> {
        self.last
    }
}

pub struct PollingLoop<'a, D: Delay + ?Sized> {
    delay: &'a mut D,
    interval: Duration,
    max_polls: u64,
    stall_polls: u32,
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl<'a, D: Delay + ?Sized> PollingLoop<'a, D> {
    pub fn new(delay: &'a mut D, interval: Duration, max_polls: u64, stall_polls: u32) -> Self {
        PollingLoop {
            delay,
            interval,
            max_polls,
            stall_polls,
            deadline: None,
            cancel: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_cancellation(mut self, cancel: Option<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Polls `step` until it returns `Step::Done`. The argument of `step` is the poll
    /// number, starting from 0. Errors returned by `step` end the loop unchanged.
    pub fn run<T, F>(&mut self, phase: MotionPhase, mut step: F) -> Result<T, ArmError>
    where
        F: FnMut(u64) -> Result<Step<T>, ArmError>,
    {
        let mut stall = StallDetector::new(self.stall_polls);
        let mut polls: u64 = 0;
        loop {
            let encoder = stall.last().unwrap_or(0);
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                return Err(ArmError::Cancelled { phase });
            }
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(ArmError::HomingStall { phase, cause: StallCause::Deadline, encoder });
            }
            if polls >= self.max_polls {
                return Err(ArmError::HomingStall { phase, cause: StallCause::PollLimit, encoder });
            }

            match step(polls)? {
                Step::Done(value) => return Ok(value),
                Step::Pending { encoder } => {
                    if stall.observe(encoder) {
                        return Err(ArmError::HomingStall { phase, cause: StallCause::NoProgress, encoder });
                    }
                }
            }
            polls += 1;
            self.delay.delay(self.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::NoDelay;

    #[derive(Default)]
    struct CountingDelay {
        calls: u32,
        total: Duration,
    }

    impl Delay for CountingDelay {
        fn delay(&mut self, duration: Duration) {
            self.calls += 1;
            self.total += duration;
        }
    }

    #[test]
    fn test_runs_until_done() {
        let mut delay = CountingDelay::default();
        let mut polling = PollingLoop::new(&mut delay, Duration::from_millis(2), 100, 5);
        let result = polling.run(MotionPhase::Positioning, |poll| {
            Ok(if poll == 10 { Step::Done(poll) } else { Step::Pending { encoder: poll as i64 } })
        });
        assert_eq!(result, Ok(10));
        assert_eq!(delay.calls, 10);
        assert_eq!(delay.total, Duration::from_millis(20));
    }

    #[test]
    fn test_poll_limit() {
        let mut delay = NoDelay;
        let mut polling = PollingLoop::new(&mut delay, Duration::ZERO, 50, 5);
        let result: Result<(), ArmError> = polling.run(MotionPhase::Scanning, |poll| {
            Ok(Step::Pending { encoder: poll as i64 })
        });
        assert_eq!(result, Err(ArmError::HomingStall {
            phase: MotionPhase::Scanning,
            cause: StallCause::PollLimit,
            encoder: 49,
        }));
    }

    #[test]
    fn test_no_progress() {
        let mut delay = NoDelay;
        let mut polling = PollingLoop::new(&mut delay, Duration::ZERO, 1000, 3);
        let mut polls_seen = 0;
        let result: Result<(), ArmError> = polling.run(MotionPhase::Returning, |_| {
            polls_seen += 1;
            Ok(Step::Pending { encoder: 7 })
        });
        assert_eq!(result, Err(ArmError::HomingStall {
            phase: MotionPhase::Returning,
            cause: StallCause::NoProgress,
            encoder: 7,
        }));
        // First reading plus three unchanged ones
        assert_eq!(polls_seen, 4);
    }

    #[test]
    fn test_deadline() {
        let mut delay = NoDelay;
        let mut polling = PollingLoop::new(&mut delay, Duration::ZERO, 1000, 3)
            .with_deadline(Some(Instant::now()));
        let result: Result<(), ArmError> = polling.run(MotionPhase::Scanning, |_| {
            panic!("Must not poll after the deadline");
        });
        assert!(matches!(result, Err(ArmError::HomingStall { cause: StallCause::Deadline, .. })));
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        let mut delay = NoDelay;
        let mut polling = PollingLoop::new(&mut delay, Duration::ZERO, 1000, 1000)
            .with_cancellation(Some(token.clone()));
        let result: Result<(), ArmError> = polling.run(MotionPhase::Positioning, |poll| {
            if poll == 3 {
                token.cancel();
            }
            Ok(Step::Pending { encoder: poll as i64 })
        });
        assert_eq!(result, Err(ArmError::Cancelled { phase: MotionPhase::Positioning }));
    }

    #[test]
    fn test_step_error_passes_through() {
        let mut delay = NoDelay;
        let mut polling = PollingLoop::new(&mut delay, Duration::ZERO, 1000, 1000);
        let result: Result<(), ArmError> = polling.run(MotionPhase::Scanning, |_| {
            Err(crate::arm_error::HardwareError::new("sensor unplugged").into())
        });
        assert!(matches!(result, Err(ArmError::Hardware(_))));
    }

    #[test]
    fn test_stall_detector_resets_on_change() {
        let mut stall = StallDetector::new(2);
        assert!(!stall.observe(1));
        assert!(!stall.observe(1));
        assert!(!stall.observe(2));
        assert!(!stall.observe(2));
        assert!(stall.observe(2));
    }
}
