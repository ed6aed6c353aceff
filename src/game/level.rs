//! Level simulation.
//!
//! A [`LevelRunner`] owns everything that changes while one level is played: the maze,
//! the player and goal tokens and the [`ScoreTracker`]. Each call to
//! [`LevelRunner::tick`] advances the simulation by exactly one step.
//!
//! # Tick Order
//!
//! 1. If the input is visible, its point becomes the player's new target.
//! 2. The player eases a fixed fraction of the way towards the target.
//! 3. The candidate position is checked against the maze; a blocked move is dropped
//!    for this tick (no sliding along walls).
//! 4. An accepted move is recorded for distance; elapsed time is always refreshed.
//! 5. If the player overlaps the goal, the level completes and listeners are notified.
//!
//! Easing is not scaled by the tick's delta time, so the simulation speed depends on the
//! rate of the driver.

use super::clock::Clock;
use super::events::{EventBus, ListenerId};
use super::input::InputSample;
use super::player::{Goal, Player};
use super::score::{LevelResult, ScoreTracker};
use crate::config::GameConfig;
use crate::error::{MazeError, Result};
use crate::math::Vec2;
use crate::maze::Maze;
use log::{debug, info, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Extent of the rendering surface the maze is sized for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceExtent {
    pub width: f32,
    pub height: f32,
}

impl SurfaceExtent {
    /// Creates a surface extent in surface units.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Mutable state of one level attempt.
pub struct LevelRunner {
    config: GameConfig,
    surface: SurfaceExtent,
    rng: StdRng,
    maze: Option<Maze>,
    player: Player,
    goal: Goal,
    score: ScoreTracker,
    events: EventBus,
    level: u32,
    /// Incremented on every `init_level`, so observers can tell a restarted level apart.
    attempt: u64,
    /// Sum of the delta times delivered this level.
    simulated_time: f32,
    complete: bool,
}

impl LevelRunner {
    /// Creates a runner with no level loaded.
    ///
    /// # Errors
    /// Returns [`MazeError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: GameConfig, surface: SurfaceExtent, clock: Rc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let player = Player::new(Vec2::ZERO, config.player_radius, config.player_smoothing);
        let goal = Goal::new(Vec2::ZERO, config.goal_radius);

        Ok(Self {
            config,
            surface,
            rng,
            maze: None,
            player,
            goal,
            score: ScoreTracker::new(clock),
            events: EventBus::new(),
            level: 0,
            attempt: 0,
            simulated_time: 0.0,
            complete: false,
        })
    }

    /// Builds a fresh maze for `level` and places the player and goal.
    ///
    /// The maze side grows with the level number (see [`GameConfig::maze_size_for_level`])
    /// and the cell size is fitted to the surface, never below the configured minimum.
    ///
    /// # Errors
    /// Returns [`MazeError::InvalidSurface`] if the surface extent is not positive. No
    /// state is touched in that case.
    pub fn init_level(&mut self, level: u32) -> Result<()> {
        if !self.surface.is_valid() {
            return Err(MazeError::InvalidSurface {
                width: self.surface.width,
                height: self.surface.height,
            });
        }

        let maze_size = self.config.maze_size_for_level(level);
        let cell_size =
            self.config
                .cell_size_for(self.surface.width, self.surface.height, maze_size);
        let maze = Maze::generate(maze_size, maze_size, cell_size, &mut self.rng)?;

        let start = maze.start_position();
        let end = maze.end_position();
        self.player.reset_to(start.point());
        self.goal = Goal::new(end.point(), self.config.goal_radius);
        self.score.start_level(level);

        self.level = level;
        self.attempt += 1;
        self.simulated_time = 0.0;
        self.complete = false;

        info!(
            "Level {} initialized: {}x{} maze, {} unit cells",
            level, maze_size, maze_size, cell_size
        );
        debug!("Level {} layout:\n{}", level, maze);
        self.maze = Some(maze);
        Ok(())
    }

    /// Advances the level by one tick. Returns the level result on the tick that reaches
    /// the goal; afterwards, and before any level is loaded, ticks do nothing.
    pub fn tick(&mut self, input: InputSample, delta_time: f32) -> Option<LevelResult> {
        if self.complete {
            return None;
        }
        let maze = self.maze.as_ref()?;
        self.simulated_time += delta_time;

        if input.visible {
            self.player.target = input.target.resolve(maze.dimensions());
        }

        let candidate = self.player.candidate_position();
        if maze.blocks_movement(candidate.x, candidate.y, self.player.radius) {
            trace!(
                "Move to ({:.1}, {:.1}) blocked by a wall",
                candidate.x, candidate.y
            );
        } else {
            self.player.position = candidate;
            self.score.record_position(candidate.x, candidate.y);
        }

        self.score.tick();

        if !self.goal.reached_by(&self.player) {
            return None;
        }

        self.complete = true;
        let result = self.score.complete_level();
        info!(
            "Level {} complete: {:.1}s, distance {:.0}, score {:.1} (best {:.1})",
            result.level, result.elapsed_time, result.distance, result.score, result.best_score
        );
        self.events.emit(&result);
        Some(result)
    }

    /// Registers a listener for level-complete events.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LevelResult) + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if `id` is unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn surface(&self) -> SurfaceExtent {
        self.surface
    }

    /// Takes effect on the next `init_level`.
    pub fn set_surface(&mut self, surface: SurfaceExtent) {
        self.surface = surface;
    }

    /// The current maze, or `None` before the first [`LevelRunner::init_level`].
    pub fn maze(&self) -> Option<&Maze> {
        self.maze.as_ref()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut ScoreTracker {
        &mut self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Number of levels initialized so far, restarts included.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Sum of the delta times delivered since the level was initialized.
    pub fn simulated_time(&self) -> f32 {
        self.simulated_time
    }

    /// Whether the goal has been reached on this level.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::ManualClock;
    use crate::game::input::Target;
    use crate::maze::CellCoord;
    use proptest::prelude::*;
    use std::cell::RefCell;

    fn runner_with(surface: SurfaceExtent, seed: u64) -> (LevelRunner, ManualClock) {
        let clock = ManualClock::new();
        let config = GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        };
        let runner = LevelRunner::new(config, surface, Rc::new(clock.clone())).unwrap();
        (runner, clock)
    }

    fn runner() -> (LevelRunner, ManualClock) {
        runner_with(SurfaceExtent::new(360.0, 360.0), 17)
    }

    /// Tests level 1 on a 360x360 surface: 8x8 maze of 45 unit cells.
    #[test]
    fn test_init_level_one() {
        let (mut runner, _clock) = runner();
        runner.init_level(1).unwrap();

        let maze = runner.maze().unwrap();
        assert_eq!((maze.rows(), maze.cols()), (8, 8));
        assert_eq!(maze.cell_size(), 45.0);
        assert_eq!(maze.dimensions(), (360.0, 360.0));
        assert_eq!(runner.player().position, Vec2::new(22.5, 22.5));
        assert_eq!(runner.player().target, Vec2::new(22.5, 22.5));
        assert_eq!(runner.goal().position, Vec2::new(337.5, 337.5));
        assert_eq!(runner.score().current_level(), 1);
        assert_eq!(runner.attempt(), 1);
    }

    /// Tests that later levels grow the maze and cap at fifteen.
    #[test]
    fn test_maze_grows_with_level() {
        let (mut runner, _clock) = runner_with(SurfaceExtent::new(1200.0, 900.0), 3);
        runner.init_level(5).unwrap();
        let maze = runner.maze().unwrap();
        assert_eq!(maze.rows(), 10);
        assert_eq!(maze.cell_size(), 90.0);

        runner.init_level(40).unwrap();
        assert_eq!(runner.maze().unwrap().rows(), 15);
        assert_eq!(runner.maze().unwrap().cell_size(), 60.0);
    }

    /// Tests that a non-positive surface is rejected before any maze exists.
    #[test]
    fn test_invalid_surface() {
        for surface in [
            SurfaceExtent::new(0.0, 100.0),
            SurfaceExtent::new(100.0, -1.0),
            SurfaceExtent::new(f32::NAN, 100.0),
        ] {
            let (mut runner, _clock) = runner_with(surface, 1);
            assert!(matches!(
                runner.init_level(1),
                Err(MazeError::InvalidSurface { .. })
            ));
            assert!(runner.maze().is_none());
            assert_eq!(runner.attempt(), 0);
        }
    }

    #[test]
    fn test_tick_before_init_is_noop() {
        let (mut runner, _clock) = runner();
        assert_eq!(runner.tick(InputSample::surface(10.0, 10.0), 0.016), None);
        assert_eq!(runner.player().position, Vec2::ZERO);
    }

    /// Tests that a hidden input keeps the previous target and the player keeps easing
    /// towards it.
    #[test]
    fn test_hidden_input_keeps_target() {
        let (mut runner, _clock) = runner();
        runner.init_level(1).unwrap();

        runner.tick(InputSample::surface(30.0, 22.5), 0.016);
        assert_eq!(runner.player().target, Vec2::new(30.0, 22.5));
        let before = runner.player().position;

        runner.tick(InputSample::hidden(), 0.016);
        assert_eq!(runner.player().target, Vec2::new(30.0, 22.5));
        let after = runner.player().position;
        assert!(after.x > before.x && after.x < 30.0);
        assert_eq!(after.y, 22.5);
        assert!(runner.score().total_distance() > 0.0);
    }

    /// Tests that normalized targets are scaled by the maze dimensions.
    #[test]
    fn test_normalized_target() {
        let (mut runner, _clock) = runner();
        runner.init_level(1).unwrap();
        runner.tick(
            InputSample {
                target: Target::Normalized(Vec2::new(0.25, 0.5)),
                visible: true,
            },
            0.016,
        );
        assert_eq!(runner.player().target, Vec2::new(90.0, 180.0));
    }

    /// Tests that a move into a wall is dropped and no distance is recorded.
    #[test]
    fn test_blocked_move_is_dropped() {
        let (mut runner, _clock) = runner();
        runner.init_level(1).unwrap();

        // The start cell's top and left walls are always present.
        runner.tick(InputSample::surface(22.5, -200.0), 0.016);
        assert_eq!(runner.player().position, Vec2::new(22.5, 22.5));
        runner.tick(InputSample::surface(-200.0, 22.5), 0.016);
        assert_eq!(runner.player().position, Vec2::new(22.5, 22.5));
        assert_eq!(runner.score().total_distance(), 0.0);
    }

    #[test]
    fn test_accepted_moves_accumulate_distance() {
        let (mut runner, _clock) = runner();
        runner.init_level(1).unwrap();
        let start = runner.player().position;

        // Small moves inside the start cell never touch a wall.
        runner.tick(InputSample::surface(26.5, 22.5), 0.016);
        let first = runner.player().position;
        assert!(first.x > start.x);
        assert_eq!(runner.score().total_distance(), 0.0);

        runner.tick(InputSample::surface(26.5, 22.5), 0.016);
        let second = runner.player().position;
        let expected = f64::from(first.distance(&second));
        assert!((runner.score().total_distance() - expected).abs() < 1e-6);
    }

    /// Tests goal arrival completes the level exactly once and notifies listeners.
    #[test]
    fn test_goal_arrival_emits_once() {
        let (mut runner, clock) = runner();
        runner.init_level(1).unwrap();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        runner.subscribe(move |result: &LevelResult| sink.borrow_mut().push(*result));

        let path: Vec<Vec2> = {
            let maze = runner.maze().unwrap();
            let cells = maze.solve();
            cells.into_iter().map(|c| maze.cell_center(c)).collect()
        };

        let mut outcome = None;
        'walk: for waypoint in path {
            for _ in 0..200 {
                clock.advance_secs(1.0 / 60.0);
                let sample = InputSample::surface(waypoint.x, waypoint.y);
                if let Some(result) = runner.tick(sample, 1.0 / 60.0) {
                    outcome = Some(result);
                    break 'walk;
                }
                if runner.player().distance_to_target() < 1.0 {
                    break;
                }
            }
        }

        let result = outcome.expect("goal reached");
        assert!(runner.is_complete());
        assert_eq!(result.level, 1);
        assert!(result.elapsed_time > 0.0);
        assert!(result.distance > 0.0);
        assert_eq!(*received.borrow(), vec![result]);

        assert_eq!(runner.tick(InputSample::hidden(), 1.0 / 60.0), None);
        assert_eq!(received.borrow().len(), 1);
        assert_eq!(runner.score().history().len(), 1);
    }

    #[test]
    fn test_restart_increments_attempt() {
        let (mut runner, _clock) = runner();
        runner.init_level(2).unwrap();
        runner.init_level(2).unwrap();
        assert_eq!(runner.attempt(), 2);
        assert_eq!(runner.level(), 2);
        assert_eq!(
            runner.maze().unwrap().cell_at(22.5, 22.5),
            Some(CellCoord::new(0, 0))
        );
    }

    proptest! {
        /// Whatever the input does, the committed position is never inside a wall.
        #[test]
        fn test_committed_position_never_blocked(
            seed in any::<u64>(),
            targets in proptest::collection::vec(
                (-100.0f32..500.0, -100.0f32..500.0, any::<bool>()),
                1..120,
            ),
        ) {
            let (mut runner, clock) = runner_with(SurfaceExtent::new(360.0, 360.0), seed);
            runner.init_level(1).unwrap();
            for (x, y, visible) in targets {
                clock.advance_secs(1.0 / 60.0);
                let sample = InputSample { target: Target::Surface(Vec2::new(x, y)), visible };
                runner.tick(sample, 1.0 / 60.0);
                let player = runner.player();
                let maze = runner.maze().unwrap();
                let position = player.position;
                prop_assert!(!maze.blocks_movement(position.x, position.y, player.radius));
            }
        }
    }
}
