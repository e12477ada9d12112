//! Cooperative slice-by-slice driver for encode and decode jobs.
//!
//! A job never runs to completion in one call. Each [`Job::step`] processes
//! a bounded slice and hands control back with either [`Step::Continue`]
//! or [`Step::Done`]. The [`Scheduler`] is a plain host loop over those
//! steps: it forwards progress, checks for cancellation between slices and
//! stops on the first error. The slice size changes how often control is
//! returned, never the bytes produced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use super::error::StegoError;

/// Default slice size in pixels (10 000 RGBA array entries).
pub const DEFAULT_SLICE_PIXELS: usize = 2_500;

/// Progress snapshot reported after a slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// 0..=100
    pub percent: u8,
    pub status: String,
}

impl Progress {
    pub fn new(percent: u8, status: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            status: status.into(),
        }
    }
}

/// Outcome of one scheduler step.
#[derive(Debug)]
pub enum Step<T> {
    /// More slices remain.
    Continue(Progress),
    /// The job finished and produced its result.
    Done(T),
}

/// A unit of work that can be advanced one bounded slice at a time.
pub trait Job {
    type Output;

    /// Processes at most `slice_pixels` pixels worth of slots.
    ///
    /// Slices always end on a byte boundary, so a slice may round up to
    /// the next whole byte.
    fn step(&mut self, slice_pixels: usize) -> Result<Step<Self::Output>, StegoError>;

    /// Marks the job as failed with `err`, which the caller then returns.
    fn fail(&mut self, err: &StegoError);
}

/// Receives progress updates. Purely observational.
pub trait ProgressSink {
    fn report(&mut self, percent: u8, status: &str);
}

impl<F: FnMut(u8, &str)> ProgressSink for F {
    fn report(&mut self, percent: u8, status: &str) {
        self(percent, status)
    }
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8, _status: &str) {}
}

/// Shared flag for requesting cancellation of a running job.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect at the next slice boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives a [`Job`] to completion one slice at a time.
#[derive(Debug, Clone)]
pub struct Scheduler {
    slice_pixels: usize,
    cancel: Option<CancelToken>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SLICE_PIXELS)
    }
}

impl Scheduler {
    /// Creates a scheduler processing `slice_pixels` pixels per slice
    /// (at least 1).
    pub fn new(slice_pixels: usize) -> Self {
        Self {
            slice_pixels: slice_pixels.max(1),
            cancel: None,
        }
    }

    /// Attaches a cancellation token checked before every slice.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn slice_pixels(&self) -> usize {
        self.slice_pixels
    }

    /// Runs `job` until it completes, fails or is cancelled. The job is
    /// left in its terminal state for inspection.
    pub fn run<J: Job>(
        &self,
        job: &mut J,
        sink: &mut dyn ProgressSink,
    ) -> Result<J::Output, StegoError> {
        let mut slices = 0usize;
        loop {
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    let err = StegoError::Cancelled;
                    job.fail(&err);
                    debug!("job cancelled after {} slices", slices);
                    return Err(err);
                }
            }

            match job.step(self.slice_pixels) {
                Ok(Step::Continue(progress)) => {
                    slices += 1;
                    sink.report(progress.percent, &progress.status);
                }
                Ok(Step::Done(output)) => {
                    debug!("job finished in {} slices", slices + 1);
                    return Ok(output);
                }
                Err(err) => {
                    job.fail(&err);
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts down `remaining` units, `slice` at a time.
    struct Countdown {
        remaining: usize,
        fail_at: Option<usize>,
    }

    impl Job for Countdown {
        type Output = &'static str;

        fn step(&mut self, slice: usize) -> Result<Step<Self::Output>, StegoError> {
            if Some(self.remaining) == self.fail_at {
                return Err(StegoError::InvalidSignature);
            }
            self.remaining = self.remaining.saturating_sub(slice);
            if self.remaining == 0 {
                Ok(Step::Done("done"))
            } else {
                Ok(Step::Continue(Progress::new(50, "working")))
            }
        }

        fn fail(&mut self, _err: &StegoError) {}
    }

    fn countdown(remaining: usize) -> Countdown {
        Countdown {
            remaining,
            fail_at: None,
        }
    }

    #[test]
    fn test_reports_progress_between_slices() {
        let mut reports = Vec::new();
        let mut sink = |p: u8, s: &str| reports.push((p, s.to_string()));
        let out = Scheduler::new(3).run(&mut countdown(10), &mut sink).unwrap();
        assert_eq!(out, "done");
        // 10 -> 7 -> 4 -> 1 -> done
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn test_zero_slice_is_clamped() {
        assert_eq!(Scheduler::new(0).slice_pixels(), 1);
    }

    #[test]
    fn test_cancelled_before_first_slice() {
        let token = CancelToken::new();
        token.cancel();
        let result = Scheduler::new(1)
            .with_cancel(token)
            .run(&mut countdown(10), &mut NoProgress);
        assert!(matches!(result, Err(StegoError::Cancelled)));
    }

    #[test]
    fn test_cancel_from_progress_sink() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let mut seen = 0;
        let mut sink = |_: u8, _: &str| {
            seen += 1;
            if seen == 2 {
                trigger.cancel();
            }
        };
        let result = Scheduler::new(1)
            .with_cancel(token)
            .run(&mut countdown(100), &mut sink);
        assert!(matches!(result, Err(StegoError::Cancelled)));
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_step_error_stops_loop() {
        let mut job = Countdown {
            remaining: 10,
            fail_at: Some(6),
        };
        let result = Scheduler::new(2).run(&mut job, &mut NoProgress);
        assert!(matches!(result, Err(StegoError::InvalidSignature)));
    }
}
