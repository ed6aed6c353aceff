//! Tick driver state machine.
//!
//! The [`RunLoop`] decides whether a frame from the external scheduler turns into a
//! simulation tick. It does not own a timer or thread: whoever drives it (a frame
//! callback, a fixed-rate loop, a test) calls [`RunLoop::frame`] once per unit of time,
//! never re-entrantly.
//!
//! ```text
//!            start            pause
//!   Idle ───────────► Running ─────► Paused
//!    ▲                 │  ▲ ◄─────────┘
//!    │ stop (any)      │  │   resume
//!    │                 ▼  │ start
//!    └──────────────  Complete
//! ```

use crate::error::Result;
use crate::game::clock::{Clock, seconds_between};
use crate::game::input::InputSource;
use crate::game::level::LevelRunner;
use crate::game::score::LevelResult;
use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// A level is loaded but the loop is not ticking it.
    Idle,
    /// Every frame delivers one tick.
    Running,
    /// Frames are ignored and the level timer is suspended.
    Paused,
    /// The goal was reached. Terminal until a new level is initialized.
    Complete,
}

/// Drives a [`LevelRunner`] through start, pause, resume and stop.
pub struct RunLoop {
    runner: LevelRunner,
    clock: Rc<dyn Clock>,
    state: RunState,
    /// Baseline for the next frame's delta time; `None` when not running.
    last_frame: Option<DateTime<Utc>>,
    ticks_delivered: u64,
}

impl RunLoop {
    /// Wraps `runner` in an `Idle` loop. Call [`RunLoop::init_level`] before starting.
    pub fn new(runner: LevelRunner, clock: Rc<dyn Clock>) -> Self {
        Self {
            runner,
            clock,
            state: RunState::Idle,
            last_frame: None,
            ticks_delivered: 0,
        }
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Loads `level` and returns to `Idle`, ready to start.
    pub fn init_level(&mut self, level: u32) -> Result<()> {
        self.runner.init_level(level)?;
        self.last_frame = None;
        self.ticks_delivered = 0;
        self.transition(RunState::Idle);
        Ok(())
    }

    /// `Idle`/`Complete` -> `Running`. Returns `false` if the transition does not apply.
    pub fn start(&mut self) -> bool {
        match self.state {
            RunState::Idle | RunState::Complete => {
                self.runner.score_mut().resume();
                self.last_frame = Some(self.clock.now());
                self.transition(RunState::Running);
                true
            }
            RunState::Running | RunState::Paused => {
                warn!("start() ignored while {:?}", self.state);
                false
            }
        }
    }

    /// `Running` -> `Paused`. No ticks reach the level while paused.
    pub fn pause(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.runner.score_mut().suspend();
        self.last_frame = None;
        self.transition(RunState::Paused);
        true
    }

    /// `Paused` -> `Running`. The delta-time baseline restarts now, so the first frame
    /// after resuming does not catch up on the paused span.
    pub fn resume(&mut self) -> bool {
        if self.state != RunState::Paused {
            return false;
        }
        self.runner.score_mut().resume();
        self.last_frame = Some(self.clock.now());
        self.transition(RunState::Running);
        true
    }

    /// Any state -> `Idle`. Takes effect immediately.
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            self.runner.score_mut().suspend();
        }
        self.last_frame = None;
        if self.state != RunState::Idle {
            self.transition(RunState::Idle);
        }
    }

    /// Handles one frame from the scheduler.
    ///
    /// While `Running`, samples `input` and delivers exactly one tick to the level. On
    /// the tick that reaches the goal the loop moves to `Complete` and the result is
    /// returned. In any other state the frame is ignored.
    ///
    /// # Errors
    /// An input failure stops the loop (state `Idle`) and is returned unchanged; the
    /// failed tick is not applied.
    pub fn frame(&mut self, input: &mut dyn InputSource) -> Result<Option<LevelResult>> {
        if self.state != RunState::Running {
            return Ok(None);
        }
        if self.runner.is_complete() {
            // Restarted without a new level: nothing left to tick.
            self.last_frame = None;
            self.transition(RunState::Complete);
            return Ok(None);
        }

        let now = self.clock.now();
        let delta_time = self
            .last_frame
            .map_or(0.0, |last| seconds_between(last, now).max(0.0) as f32);
        self.last_frame = Some(now);

        let sample = match input.sample(&self.runner) {
            Ok(sample) => sample,
            Err(e) => {
                error!("Stopping run loop: {}", e);
                self.stop();
                return Err(e);
            }
        };

        let result = self.runner.tick(sample, delta_time);
        self.ticks_delivered += 1;

        if result.is_some() {
            self.last_frame = None;
            self.transition(RunState::Complete);
        }
        Ok(result)
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether frames currently reach the level.
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Ticks delivered since the level was initialized.
    pub fn ticks_delivered(&self) -> u64 {
        self.ticks_delivered
    }

    pub fn runner(&self) -> &LevelRunner {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut LevelRunner {
        &mut self.runner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::error::MazeError;
    use crate::game::clock::ManualClock;
    use crate::game::input::{self, Autopilot, FixedInput, InputSample};
    use crate::game::level::SurfaceExtent;

    const FRAME: f64 = 1.0 / 60.0;

    fn run_loop() -> (RunLoop, ManualClock) {
        let clock = ManualClock::new();
        let shared: Rc<dyn Clock> = Rc::new(clock.clone());
        let config = GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        };
        let runner =
            LevelRunner::new(config, SurfaceExtent::new(360.0, 360.0), Rc::clone(&shared)).unwrap();
        let mut run_loop = RunLoop::new(runner, shared);
        run_loop.init_level(1).unwrap();
        (run_loop, clock)
    }

    fn still() -> FixedInput {
        FixedInput(InputSample::hidden())
    }

    #[test]
    fn test_transitions() {
        let (mut run_loop, _clock) = run_loop();
        assert_eq!(run_loop.state(), RunState::Idle);
        assert!(!run_loop.pause());
        assert!(!run_loop.resume());

        assert!(run_loop.start());
        assert!(!run_loop.start());
        assert!(run_loop.pause());
        assert_eq!(run_loop.state(), RunState::Paused);
        assert!(!run_loop.start());
        assert!(run_loop.resume());
        assert_eq!(run_loop.state(), RunState::Running);

        run_loop.stop();
        assert_eq!(run_loop.state(), RunState::Idle);
        run_loop.stop();
        assert_eq!(run_loop.state(), RunState::Idle);
    }

    /// Tests that frames are ignored unless running.
    #[test]
    fn test_no_ticks_unless_running() {
        let (mut run_loop, clock) = run_loop();
        assert_eq!(run_loop.frame(&mut still()).unwrap(), None);
        assert_eq!(run_loop.ticks_delivered(), 0);

        run_loop.start();
        clock.advance_secs(FRAME);
        run_loop.frame(&mut still()).unwrap();
        assert_eq!(run_loop.ticks_delivered(), 1);

        run_loop.pause();
        for _ in 0..10 {
            clock.advance_secs(FRAME);
            run_loop.frame(&mut still()).unwrap();
        }
        assert_eq!(run_loop.ticks_delivered(), 1);
    }

    /// Tests that a long pause neither inflates elapsed time nor bursts the next delta.
    #[test]
    fn test_pause_resume_has_no_jump() {
        let (mut run_loop, clock) = run_loop();
        run_loop.start();
        for _ in 0..30 {
            clock.advance_secs(FRAME);
            run_loop.frame(&mut still()).unwrap();
        }
        let before = run_loop.runner().score().elapsed_time();
        assert!((before - 0.5).abs() < 1e-3);

        run_loop.pause();
        clock.advance_secs(120.0);
        run_loop.frame(&mut still()).unwrap();
        assert_eq!(run_loop.runner().score().elapsed_time(), before);

        run_loop.resume();
        let simulated = run_loop.runner().simulated_time();
        clock.advance_secs(FRAME);
        run_loop.frame(&mut still()).unwrap();

        let after = run_loop.runner().score().elapsed_time();
        assert!((after - before - FRAME).abs() < 1e-3);
        let delta = run_loop.runner().simulated_time() - simulated;
        assert!((f64::from(delta) - FRAME).abs() < 1e-3);
    }

    /// Tests that an input failure stops the loop without applying the tick.
    #[test]
    fn test_input_failure_is_fatal() {
        let (mut run_loop, clock) = run_loop();
        run_loop.start();
        clock.advance_secs(FRAME);

        let mut broken = input::from_fn(|_: &LevelRunner| {
            Err(MazeError::InputUnavailable("tracker crashed".to_string()))
        });
        let err = run_loop.frame(&mut broken).unwrap_err();
        assert!(matches!(err, MazeError::InputUnavailable(_)));
        assert_eq!(run_loop.state(), RunState::Idle);
        assert_eq!(run_loop.ticks_delivered(), 0);
        assert_eq!(run_loop.runner().simulated_time(), 0.0);
    }

    fn play_to_goal(run_loop: &mut RunLoop, clock: &ManualClock) -> Option<LevelResult> {
        let mut pilot = Autopilot::default();
        for _ in 0..20_000 {
            clock.advance_secs(FRAME);
            if let Some(result) = run_loop.frame(&mut pilot).unwrap() {
                return Some(result);
            }
        }
        None
    }

    /// Tests that reaching the goal completes the loop and later frames do nothing.
    #[test]
    fn test_goal_completes_loop() {
        let (mut run_loop, clock) = run_loop();
        run_loop.start();
        let mut pilot = Autopilot::default();

        let result = play_to_goal(&mut run_loop, &clock).expect("autopilot reaches the goal");
        assert_eq!(run_loop.state(), RunState::Complete);
        assert_eq!(result.level, 1);
        let ticks = run_loop.ticks_delivered();

        clock.advance_secs(FRAME);
        assert_eq!(run_loop.frame(&mut pilot).unwrap(), None);
        assert_eq!(run_loop.ticks_delivered(), ticks);

        run_loop.init_level(2).unwrap();
        assert_eq!(run_loop.state(), RunState::Idle);
        assert!(run_loop.start());
    }

    /// Tests that starting a finished level without reloading it delivers no tick and
    /// falls straight back to `Complete`.
    #[test]
    fn test_start_from_complete_returns_to_complete() {
        let (mut run_loop, clock) = run_loop();
        run_loop.start();
        play_to_goal(&mut run_loop, &clock).expect("autopilot reaches the goal");
        let ticks = run_loop.ticks_delivered();
        let history = run_loop.runner().score().history().len();

        assert!(run_loop.start());
        assert_eq!(run_loop.state(), RunState::Running);
        clock.advance_secs(FRAME);
        assert_eq!(run_loop.frame(&mut still()).unwrap(), None);
        assert_eq!(run_loop.state(), RunState::Complete);
        assert_eq!(run_loop.ticks_delivered(), ticks);
        assert_eq!(run_loop.runner().score().history().len(), history);
    }

    /// Tests that stop applies from `Paused` and from `Complete`.
    #[test]
    fn test_stop_from_paused_and_complete() {
        let (mut run_loop, clock) = run_loop();
        run_loop.start();
        assert!(run_loop.pause());
        run_loop.stop();
        assert_eq!(run_loop.state(), RunState::Idle);
        assert!(!run_loop.resume());

        assert!(run_loop.start());
        play_to_goal(&mut run_loop, &clock).expect("autopilot reaches the goal");
        assert_eq!(run_loop.state(), RunState::Complete);
        run_loop.stop();
        assert_eq!(run_loop.state(), RunState::Idle);
    }

    /// Tests that time spent paused and then stopped is excluded once the loop restarts.
    #[test]
    fn test_pause_stop_start_excludes_idle_time() {
        let (mut run_loop, clock) = run_loop();
        run_loop.start();
        for _ in 0..30 {
            clock.advance_secs(FRAME);
            run_loop.frame(&mut still()).unwrap();
        }
        let before = run_loop.runner().score().elapsed_time();

        run_loop.pause();
        clock.advance_secs(50.0);
        run_loop.stop();
        clock.advance_secs(50.0);
        assert!(run_loop.start());
        assert!(!run_loop.runner().score().is_suspended());

        clock.advance_secs(FRAME);
        run_loop.frame(&mut still()).unwrap();
        let after = run_loop.runner().score().elapsed_time();
        assert!((after - before - FRAME).abs() < 1e-3);
        assert_eq!(run_loop.ticks_delivered(), 31);
    }
}
