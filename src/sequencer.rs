//! Build/wait/advance sequencing across a collection of matrices.
//!
//! The [`Sequencer`] owns all simulation state and is driven by host
//! timestamps (milliseconds, monotonic, e.g. `requestAnimationFrame` time or
//! an `Instant`-derived clock). Each tick it:
//!
//! 1. checks the phase: spawns while [`Phase::Building`], switches to
//!    [`Phase::Waiting`] once the simulation settles, and activates the next
//!    matrix once the hold has elapsed
//! 2. integrates the in-flight particles
//!
//! Simulation time only accrues while playing, so pausing freezes both
//! physics and the hold timer.

use crate::models::BitmapMatrix;
use crate::particle::{DropParams, DropSimulation};
use crate::renderer::{draw_frame, RenderParams, Surface};
use crate::rng::Rng;

/// Sequencer phase. The hold start only exists while waiting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Spawning and dropping pixels of the active matrix
    Building,
    /// Settled; admiring the result since `since_ms` (simulation clock)
    Waiting { since_ms: f64 },
}

/// Something noteworthy that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// The active matrix finished building
    Settled { index: usize },
    /// A matrix was activated (hold elapsed)
    Activated { index: usize },
}

/// Outcome of one [`Sequencer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    /// Simulation milliseconds applied this tick (0 while paused)
    pub elapsed_ms: f64,
    pub spawned: usize,
    pub landed: usize,
    pub event: Option<SequencerEvent>,
}

/// Timing and physics settings for a sequencer.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    pub drop: DropParams,
    /// How long a finished matrix is held before advancing
    pub hold_ms: f64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self { drop: DropParams::default(), hold_ms: 3000.0 }
    }
}

pub struct Sequencer {
    collection: Vec<BitmapMatrix>,
    /// Replacement collection, swapped in at the next activation
    staged: Option<Vec<BitmapMatrix>>,
    active_index: usize,
    phase: Phase,
    /// `None` only when the collection is empty
    sim: Option<DropSimulation>,
    config: SequencerConfig,
    rng: Rng,
    clock_ms: f64,
    last_timestamp: Option<f64>,
    paused: bool,
}

impl Sequencer {
    /// Create a sequencer and activate the first matrix.
    pub fn new(collection: Vec<BitmapMatrix>, config: SequencerConfig, rng: Rng) -> Self {
        let mut seq = Self {
            collection,
            staged: None,
            active_index: 0,
            phase: Phase::Building,
            sim: None,
            config,
            rng,
            clock_ms: 0.0,
            last_timestamp: None,
            paused: false,
        };
        seq.activate(0);
        seq
    }

    /// Advance to host time `timestamp_ms`.
    ///
    /// The first tick (and the first after [`resume`](Self::resume)) applies
    /// zero elapsed time. While paused the timestamp is recorded but nothing
    /// else changes.
    pub fn tick(&mut self, timestamp_ms: f64) -> TickReport {
        let elapsed = match self.last_timestamp {
            Some(last) => (timestamp_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);

        if self.paused {
            return TickReport::default();
        }
        if self.sim.is_none() {
            // Nothing active, so every tick is a boundary for a staged collection
            if self.staged.is_none() {
                return TickReport::default();
            }
            self.activate(0);
            let event = self.sim.is_some().then_some(SequencerEvent::Activated { index: 0 });
            return TickReport { event, ..Default::default() };
        }
        self.clock_ms += elapsed;

        let mut report = TickReport { elapsed_ms: elapsed, ..Default::default() };
        match self.phase {
            Phase::Building => {
                let Some(sim) = self.sim.as_mut() else {
                    return report;
                };
                if sim.is_settled() {
                    self.phase = Phase::Waiting { since_ms: self.clock_ms };
                    report.event = Some(SequencerEvent::Settled { index: self.active_index });
                    log::debug!("matrix {} settled", self.active_index);
                } else {
                    report.spawned = sim.spawn(&self.config.drop, &mut self.rng);
                }
            }
            Phase::Waiting { since_ms } => {
                if self.clock_ms - since_ms > self.config.hold_ms {
                    self.advance();
                    report.event = Some(SequencerEvent::Activated { index: self.active_index });
                }
            }
        }

        if let Some(sim) = self.sim.as_mut() {
            report.landed = sim.integrate(elapsed, &self.config.drop);
        }
        log::trace!(
            "tick dt={:.1}ms spawned={} landed={} progress={:.0}%",
            elapsed,
            report.spawned,
            report.landed,
            self.progress()
        );
        report
    }

    /// Tick, then draw onto `surface` if one is available.
    ///
    /// A missing surface skips drawing for this frame only.
    pub fn frame<S: Surface + ?Sized>(
        &mut self,
        timestamp_ms: f64,
        surface: Option<&mut S>,
        render: &RenderParams,
    ) -> TickReport {
        let report = self.tick(timestamp_ms);
        if let (Some(surface), Some(sim)) = (surface, self.sim.as_ref()) {
            draw_frame(surface, sim, render);
        }
        report
    }

    /// Activate the next matrix now, discarding particles in flight.
    pub fn skip(&mut self) {
        self.advance();
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume playback. The next tick applies no elapsed time, so the
    /// paused interval never reaches the physics.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_timestamp = None;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replace the collection. Takes effect at the next activation, or on
    /// the next tick when nothing is active.
    pub fn set_collection(&mut self, collection: Vec<BitmapMatrix>) {
        self.staged = Some(collection);
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_matrix(&self) -> Option<&BitmapMatrix> {
        self.collection.get(self.active_index)
    }

    pub fn collection_len(&self) -> usize {
        self.collection.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn simulation(&self) -> Option<&DropSimulation> {
        self.sim.as_ref()
    }

    /// Build progress of the active matrix, 0-100.
    pub fn progress(&self) -> f64 {
        self.sim.as_ref().map(DropSimulation::progress).unwrap_or(0.0)
    }

    /// Simulation milliseconds accrued while playing.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    fn advance(&mut self) {
        // Length of the collection that will be active after any staged swap
        let len = self.staged.as_ref().map_or(self.collection.len(), Vec::len);
        let next = if len == 0 { 0 } else { (self.active_index + 1) % len };
        self.activate(next);
    }

    fn activate(&mut self, index: usize) {
        if let Some(staged) = self.staged.take() {
            self.collection = staged;
        }
        self.phase = Phase::Building;

        if self.collection.is_empty() {
            self.active_index = 0;
            self.sim = None;
            return;
        }

        self.active_index = index % self.collection.len();
        let matrix = &self.collection[self.active_index];
        self.sim = Some(DropSimulation::activate(matrix, &mut self.rng));
        log::info!(
            "activated '{}' ({}/{}, {}x{})",
            matrix.name(),
            self.active_index + 1,
            self.collection.len(),
            matrix.width(),
            matrix.height()
        );
    }
}
