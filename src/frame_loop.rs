//! Cooperative tick driver.
//!
//! One loop iteration is one display refresh: read the host clock, tick the
//! sequencer, draw onto the host surface (if it has one this frame), let the
//! host present the result and apply controls, then yield until the next
//! refresh. Once the [`CancelToken`] fires no further ticks are issued and
//! the host is asked to release its resources.

use image::RgbaImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::renderer::{RenderParams, Surface};
use crate::sequencer::{Sequencer, SequencerEvent, TickReport};

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the host wants after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// The environment a wall runs in: a clock, an optional surface and a way
/// to hand finished frames to the user.
pub trait FrameHost {
    /// Monotonic timestamp in milliseconds.
    fn now_ms(&mut self) -> f64;

    /// Drawing target for this frame, or `None` to skip drawing.
    fn surface(&mut self) -> Option<&mut dyn Surface>;

    /// Called after each tick and draw. The host may pause, skip or stop.
    fn after_frame(&mut self, sequencer: &mut Sequencer, report: &TickReport) -> Control;

    /// Yield until the next refresh.
    fn wait_next_frame(&mut self) {}

    /// Called once when the loop ends.
    fn release(&mut self) {}
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: u64,
    pub settled: u64,
    pub activations: u64,
}

/// Drive `sequencer` until the host stops or `cancel` fires.
pub fn run<H: FrameHost + ?Sized>(
    sequencer: &mut Sequencer,
    host: &mut H,
    render: &RenderParams,
    cancel: &CancelToken,
) -> LoopSummary {
    let mut summary = LoopSummary::default();

    while !cancel.is_cancelled() {
        let now = host.now_ms();
        let report = sequencer.frame(now, host.surface(), render);
        summary.frames += 1;
        match report.event {
            Some(SequencerEvent::Settled { .. }) => summary.settled += 1,
            Some(SequencerEvent::Activated { .. }) => summary.activations += 1,
            None => {}
        }

        if host.after_frame(sequencer, &report) == Control::Stop || cancel.is_cancelled() {
            break;
        }
        host.wait_next_frame();
    }

    host.release();
    log::debug!(
        "frame loop ended after {} frames ({} settled, {} activations)",
        summary.frames,
        summary.settled,
        summary.activations
    );
    summary
}

/// Offline host: a fixed-step virtual clock that records every frame.
///
/// Stops after `settle_target` matrices have settled (plus `tail_frames`
/// extra frames so the finished picture stays on screen), or after
/// `max_frames` as a guard.
pub struct RecordingHost {
    surface: RgbaImage,
    frame_ms: f64,
    now: f64,
    settle_target: u64,
    settled: u64,
    tail_frames: u32,
    tail_left: Option<u32>,
    max_frames: usize,
    frames: Vec<RgbaImage>,
}

impl RecordingHost {
    pub fn new(width: u32, height: u32, frame_ms: f64, settle_target: u64) -> Self {
        Self {
            surface: RgbaImage::new(width, height),
            frame_ms,
            now: 0.0,
            settle_target: settle_target.max(1),
            settled: 0,
            tail_frames: 0,
            tail_left: None,
            max_frames: 10_000,
            frames: Vec::new(),
        }
    }

    /// Keep recording this many frames after the final settlement.
    pub fn with_tail(mut self, frames: u32) -> Self {
        self.tail_frames = frames;
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames.max(1);
        self
    }

    pub fn into_frames(self) -> Vec<RgbaImage> {
        self.frames
    }
}

impl FrameHost for RecordingHost {
    fn now_ms(&mut self) -> f64 {
        let now = self.now;
        self.now += self.frame_ms;
        now
    }

    fn surface(&mut self) -> Option<&mut dyn Surface> {
        Some(&mut self.surface)
    }

    fn after_frame(&mut self, _sequencer: &mut Sequencer, report: &TickReport) -> Control {
        self.frames.push(self.surface.clone());
        if self.frames.len() >= self.max_frames {
            log::warn!("recording stopped at the {} frame limit", self.max_frames);
            return Control::Stop;
        }

        if let Some(left) = self.tail_left.as_mut() {
            if *left == 0 {
                return Control::Stop;
            }
            *left -= 1;
            return Control::Continue;
        }

        if matches!(report.event, Some(SequencerEvent::Settled { .. })) {
            self.settled += 1;
            if self.settled >= self.settle_target {
                if self.tail_frames == 0 {
                    return Control::Stop;
                }
                self.tail_left = Some(self.tail_frames - 1);
            }
        }
        Control::Continue
    }
}
