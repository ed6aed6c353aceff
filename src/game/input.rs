//! Positional input.
//!
//! The core does not know where targets come from: a hand tracker, a mouse, a replay, or
//! the built-in [`Autopilot`]. Every tick, an [`InputSource`] produces one
//! [`InputSample`]: a target point and whether the source currently sees anything.

use super::level::LevelRunner;
use crate::error::Result;
use crate::math::Vec2;
use log::debug;

/// A target point, either normalized to the maze or in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// `(0, 0)` is the maze's top-left corner and `(1, 1)` its bottom-right corner.
    Normalized(Vec2),
    Surface(Vec2),
}

impl Target {
    /// Converts to surface coordinates for a maze of `(width, height)`.
    pub fn resolve(&self, (width, height): (f32, f32)) -> Vec2 {
        match *self {
            Target::Normalized(point) => Vec2::new(point.x * width, point.y * height),
            Target::Surface(point) => point,
        }
    }
}

/// One reading from an input source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    pub target: Target,
    /// When `false` the target is ignored and the player keeps its previous target.
    pub visible: bool,
}

impl InputSample {
    /// A visible sample at a point in surface units.
    pub fn surface(x: f32, y: f32) -> Self {
        Self {
            target: Target::Surface(Vec2::new(x, y)),
            visible: true,
        }
    }

    /// A visible sample at a point in `[0, 1]` on both axes.
    pub fn normalized(x: f32, y: f32) -> Self {
        Self {
            target: Target::Normalized(Vec2::new(x, y)),
            visible: true,
        }
    }

    /// Nothing detected this tick.
    pub fn hidden() -> Self {
        Self {
            target: Target::Normalized(Vec2::new(0.5, 0.5)),
            visible: false,
        }
    }
}

/// Produces one input sample per tick.
///
/// The runner is passed in read-only so that sources which steer by the maze itself
/// can look at it; sources fed from outside can ignore it.
pub trait InputSource {
    /// # Errors
    /// Any error is fatal to the run: the run loop stops rather than apply a partial tick.
    fn sample(&mut self, runner: &LevelRunner) -> Result<InputSample>;
}

/// Always returns the same sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedInput(pub InputSample);

impl InputSource for FixedInput {
    fn sample(&mut self, _runner: &LevelRunner) -> Result<InputSample> {
        Ok(self.0)
    }
}

/// Input source backed by a closure, see [`from_fn`].
pub struct FnInput<F>(F);

impl<F> InputSource for FnInput<F>
where
    F: FnMut(&LevelRunner) -> Result<InputSample>,
{
    fn sample(&mut self, runner: &LevelRunner) -> Result<InputSample> {
        (self.0)(runner)
    }
}

/// Wraps a closure as an input source.
pub fn from_fn<F>(f: F) -> FnInput<F>
where
    F: FnMut(&LevelRunner) -> Result<InputSample>,
{
    FnInput(f)
}

/// Steers the player along the maze solution, one cell center at a time.
///
/// Following cell centers keeps the player on the corridor axis, so no move is ever
/// rejected by the collision check.
#[derive(Debug, Clone)]
pub struct Autopilot {
    waypoints: Vec<Vec2>,
    next: usize,
    attempt: u64,
    /// Distance at which a waypoint counts as reached.
    pub arrive_threshold: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl Autopilot {
    /// Creates an autopilot that moves on once within `arrive_threshold` of a waypoint.
    pub fn new(arrive_threshold: f32) -> Self {
        Self {
            waypoints: Vec::new(),
            next: 0,
            attempt: 0,
            arrive_threshold,
        }
    }

    /// Waypoints left on the current plan.
    pub fn remaining_waypoints(&self) -> usize {
        self.waypoints.len().saturating_sub(self.next)
    }
}

impl InputSource for Autopilot {
    fn sample(&mut self, runner: &LevelRunner) -> Result<InputSample> {
        let Some(maze) = runner.maze() else {
            return Ok(InputSample::hidden());
        };

        if runner.attempt() != self.attempt {
            self.waypoints = maze
                .solve()
                .into_iter()
                .map(|coord| maze.cell_center(coord))
                .collect();
            self.next = 0;
            self.attempt = runner.attempt();
            debug!(
                "Autopilot planned {} waypoints for level {}",
                self.waypoints.len(),
                runner.level()
            );
        }

        let position = runner.player().position;
        while self.next + 1 < self.waypoints.len()
            && position.distance(&self.waypoints[self.next]) < self.arrive_threshold
        {
            self.next += 1;
        }

        Ok(match self.waypoints.get(self.next) {
            Some(point) => InputSample::surface(point.x, point.y),
            None => InputSample::hidden(),
        })
    }
}
