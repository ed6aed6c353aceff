//! AppContext for a maze session.
//!
//! This module defines the [`AppContext`] struct, which owns every component of a running
//! session: the configuration, the [`RunLoop`] (and through it the level runner, maze
//! and score tracker) and the current level number. It is built once at startup and
//! passed to whatever drives the frames; nothing is global.

use super::run_loop::{RunLoop, RunState};
use crate::config::GameConfig;
use crate::error::Result;
use crate::game::clock::Clock;
use crate::game::events::ListenerId;
use crate::game::input::InputSource;
use crate::game::level::{LevelRunner, SurfaceExtent};
use crate::game::score::{LevelResult, ScoreTracker, SessionStats};
use log::info;
use std::rc::Rc;

/// Holds all state required for a running maze session.
pub struct AppContext {
    config: GameConfig,
    run_loop: RunLoop,
    current_level: u32,
}

impl AppContext {
    /// Creates a new [`AppContext`] with no level loaded.
    ///
    /// # Arguments
    /// - `config`: Tunable game constants; validated here.
    /// - `surface`: Extent of the rendering surface used to size each maze.
    /// - `clock`: Time source shared by the run loop and the score tracker.
    pub fn new(config: GameConfig, surface: SurfaceExtent, clock: Rc<dyn Clock>) -> Result<Self> {
        let runner = LevelRunner::new(config.clone(), surface, Rc::clone(&clock))?;
        Ok(Self {
            config,
            run_loop: RunLoop::new(runner, clock),
            current_level: 1,
        })
    }

    /// Starts a new game for `player_name` at level 1, discarding the previous session.
    pub fn start_game(&mut self, player_name: &str) -> Result<()> {
        let score = self.run_loop.runner_mut().score_mut();
        score.reset_session();
        score.set_player_name(player_name);
        info!("Starting game for {}", player_name);
        self.start_level(1)
    }

    /// Builds the maze for `level` and starts ticking.
    pub fn start_level(&mut self, level: u32) -> Result<()> {
        self.run_loop.init_level(level)?;
        self.current_level = level;
        self.run_loop.start();
        Ok(())
    }

    /// Advances to the next level. Returns its number.
    pub fn next_level(&mut self) -> Result<u32> {
        let next = self.current_level + 1;
        self.start_level(next)?;
        Ok(next)
    }

    /// Replays the current level on a freshly generated maze.
    pub fn restart_level(&mut self) -> Result<()> {
        self.start_level(self.current_level)
    }

    /// Handles one scheduler frame. See [`RunLoop::frame`].
    pub fn frame(&mut self, input: &mut dyn InputSource) -> Result<Option<LevelResult>> {
        self.run_loop.frame(input)
    }

    /// Pauses the run loop. See [`RunLoop::pause`].
    pub fn pause(&mut self) -> bool {
        self.run_loop.pause()
    }

    /// Resumes a paused run loop. See [`RunLoop::resume`].
    pub fn resume(&mut self) -> bool {
        self.run_loop.resume()
    }

    /// Stops ticking. The session history is kept.
    pub fn shutdown(&mut self) {
        self.run_loop.stop();
        info!(
            "Session ended after {} completed levels",
            self.score().history().len()
        );
    }

    /// Resizes the rendering surface; the next level is sized for it.
    pub fn resize_surface(&mut self, width: f32, height: f32) {
        self.run_loop
            .runner_mut()
            .set_surface(SurfaceExtent::new(width, height));
    }

    /// Registers a level-complete listener that survives level changes.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LevelResult) + 'static,
    {
        self.run_loop.runner_mut().subscribe(listener)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Level number currently loaded.
    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// State of the underlying run loop.
    pub fn run_state(&self) -> RunState {
        self.run_loop.state()
    }

    pub fn run_loop(&self) -> &RunLoop {
        &self.run_loop
    }

    pub fn runner(&self) -> &LevelRunner {
        self.run_loop.runner()
    }

    pub fn score(&self) -> &ScoreTracker {
        self.run_loop.runner().score()
    }

    /// Aggregates over every level completed this session.
    pub fn session_stats(&self) -> SessionStats {
        self.score().session_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MazeError;
    use crate::game::clock::ManualClock;
    use crate::game::input::Autopilot;

    fn context(surface: SurfaceExtent) -> (AppContext, ManualClock) {
        let clock = ManualClock::new();
        let config = GameConfig {
            seed: Some(21),
            ..GameConfig::default()
        };
        let context = AppContext::new(config, surface, Rc::new(clock.clone())).unwrap();
        (context, clock)
    }

    fn play_level(context: &mut AppContext, clock: &ManualClock) -> LevelResult {
        let mut pilot = Autopilot::default();
        loop {
            clock.advance_secs(1.0 / 60.0);
            if let Some(result) = context.frame(&mut pilot).unwrap() {
                return result;
            }
        }
    }

    #[test]
    fn test_start_game_runs_level_one() {
        let (mut context, _clock) = context(SurfaceExtent::new(360.0, 360.0));
        context.start_game("Ada").unwrap();
        assert_eq!(context.current_level(), 1);
        assert_eq!(context.run_state(), RunState::Running);
        assert_eq!(context.score().player_name(), "Ada");
    }

    /// Tests a two level session and the resulting statistics.
    #[test]
    fn test_two_level_session() {
        let (mut context, clock) = context(SurfaceExtent::new(360.0, 360.0));
        context.start_game("Ada").unwrap();

        let first = play_level(&mut context, &clock);
        assert_eq!(context.run_state(), RunState::Complete);
        assert_eq!(context.next_level().unwrap(), 2);
        let second = play_level(&mut context, &clock);

        assert_eq!((first.level, second.level), (1, 2));
        let stats = context.session_stats();
        assert_eq!(stats.total_levels, 2);
        assert!((stats.total_distance - (first.distance + second.distance)).abs() < 1e-9);
        assert_eq!(stats.best_score, first.score.max(second.score));
        assert_eq!(second.best_score, stats.best_score);
    }

    #[test]
    fn test_restart_keeps_level() {
        let (mut context, _clock) = context(SurfaceExtent::new(360.0, 360.0));
        context.start_level(3).unwrap();
        let attempt = context.runner().attempt();
        context.restart_level().unwrap();
        assert_eq!(context.current_level(), 3);
        assert_eq!(context.runner().attempt(), attempt + 1);
    }

    /// Tests that a bad surface fails the level without leaving the loop running.
    #[test]
    fn test_invalid_surface_is_fatal_to_level() {
        let (mut context, _clock) = context(SurfaceExtent::new(0.0, 0.0));
        assert!(matches!(
            context.start_game("Ada"),
            Err(MazeError::InvalidSurface { .. })
        ));
        assert_eq!(context.run_state(), RunState::Idle);

        context.resize_surface(400.0, 400.0);
        context.start_game("Ada").unwrap();
        assert_eq!(context.run_state(), RunState::Running);
    }

    #[test]
    fn test_start_game_resets_history() {
        let (mut context, clock) = context(SurfaceExtent::new(360.0, 360.0));
        context.start_game("Ada").unwrap();
        play_level(&mut context, &clock);
        assert_eq!(context.score().history().len(), 1);

        context.start_game("Grace").unwrap();
        assert!(context.score().history().is_empty());
        assert_eq!(context.session_stats(), SessionStats::default());
    }
}
