//! Falling-pixel simulation.
//!
//! Drops the colored cells of one [`BitmapMatrix`] into place:
//!
//! 1. [`DropSimulation::activate`] collects the matrix's non-empty cells and
//!    shuffles them into a pending stack
//! 2. Each building tick [`DropSimulation::spawn`] pops up to `spawn_rate`
//!    pending pixels and starts them a few rows above the surface
//! 3. [`DropSimulation::integrate`] applies gravity, and any particle that
//!    reaches its target row is clamped there and written into the
//!    [`LandedGrid`]
//!
//! Once the pending stack and the active set are both empty the matrix is
//! settled and the landed grid equals the source grid cell for cell.
//!
//! # Example
//!
//! ```
//! use pixeldrop::particle::{DropParams, DropSimulation};
//! use pixeldrop::rng::Rng;
//! # use pixeldrop::models::BitmapMatrix;
//! # let matrix = BitmapMatrix::new("dot", vec![vec![Some("#ff0000".parse().unwrap())]]).unwrap();
//!
//! let params = DropParams::default();
//! let mut rng = Rng::new(7);
//! let mut sim = DropSimulation::activate(&matrix, &mut rng);
//! while !sim.is_settled() {
//!     sim.spawn(&params, &mut rng);
//!     sim.integrate(16.0, &params);
//! }
//! assert_eq!(sim.landed().to_rows(), *matrix.grid());
//! ```

use crate::models::{BitmapMatrix, LandedGrid, Particle, PendingPixel};
use crate::rng::Rng;

/// Tunable physics parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DropParams {
    /// Velocity gained per elapsed millisecond
    pub gravity: f64,
    /// Pending pixels popped per building tick
    pub spawn_rate: u32,
    /// Frame length that one unit of velocity moves one row in
    pub reference_frame_ms: f64,
    /// Rows above the surface a particle starts at `[min, max]`
    pub spawn_height: [f64; 2],
}

impl Default for DropParams {
    fn default() -> Self {
        Self { gravity: 0.002, spawn_rate: 2, reference_frame_ms: 16.0, spawn_height: [5.0, 15.0] }
    }
}

/// Simulation state for one activation of one matrix.
#[derive(Debug, Clone)]
pub struct DropSimulation {
    landed: LandedGrid,
    /// Shuffled; consumed from the end
    pending: Vec<PendingPixel>,
    particles: Vec<Particle>,
    total: usize,
}

impl DropSimulation {
    /// Reset state for `matrix`: empty landed grid, no particles, and a
    /// freshly shuffled pending stack of every non-empty cell.
    pub fn activate(matrix: &BitmapMatrix, rng: &mut Rng) -> Self {
        let mut pending: Vec<PendingPixel> = matrix
            .filled_cells()
            .map(|(x, y, color)| PendingPixel { x, y, color })
            .collect();
        rng.shuffle(&mut pending);

        Self {
            landed: LandedGrid::empty(matrix.width(), matrix.height()),
            total: pending.len(),
            pending,
            particles: Vec::new(),
        }
    }

    /// Pop up to `spawn_rate` pending pixels into the active set.
    ///
    /// Returns the number of particles spawned.
    pub fn spawn(&mut self, params: &DropParams, rng: &mut Rng) -> usize {
        let mut spawned = 0;
        for _ in 0..params.spawn_rate {
            let Some(pixel) = self.pending.pop() else {
                break;
            };
            let offset = rng.range(params.spawn_height[0], params.spawn_height[1]);
            self.particles.push(Particle::spawn(pixel, offset));
            spawned += 1;
        }
        spawned
    }

    /// Advance every active particle by `elapsed_ms`.
    ///
    /// Particles that reach their target row are clamped to it, written into
    /// the landed grid and removed. Returns the number that landed.
    pub fn integrate(&mut self, elapsed_ms: f64, params: &DropParams) -> usize {
        let step = elapsed_ms / params.reference_frame_ms;
        let landed = &mut self.landed;
        let before = self.particles.len();

        self.particles.retain_mut(|p| {
            p.velocity += params.gravity * elapsed_ms;
            p.y += p.velocity * step;

            let target = p.target_y as f64;
            if p.y >= target {
                p.y = target;
                p.landed = true;
                landed.set(p.x, p.target_y, p.color);
                return false;
            }
            true
        });

        before - self.particles.len()
    }

    /// Spawn then integrate: one building tick.
    pub fn advance(&mut self, elapsed_ms: f64, params: &DropParams, rng: &mut Rng) -> usize {
        self.spawn(params, rng);
        self.integrate(elapsed_ms, params)
    }

    /// True once nothing is pending and nothing is in flight.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty() && self.particles.is_empty()
    }

    /// Build progress as a percentage of cells that have left the pending
    /// stack. A matrix with no filled cells counts as complete.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.total - self.pending.len()) as f64 / self.total as f64 * 100.0
    }

    pub fn landed(&self) -> &LandedGrid {
        &self.landed
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of non-empty cells in the active matrix.
    pub fn total(&self) -> usize {
        self.total
    }
}
