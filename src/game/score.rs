//! Score tracking for levels and sessions.
//!
//! The [`ScoreTracker`] accumulates the distance the player travels and the time spent on
//! the active level. Completing a level turns those into a score (distance per second),
//! appends a [`ScoreRecord`] to the session history and reports a [`LevelResult`].
//!
//! # Timing
//!
//! Elapsed time is measured on the injected [`Clock`], not by counting ticks. Time spent
//! suspended (see [`ScoreTracker::suspend`]) is excluded, so a paused run does not inflate
//! the elapsed time once it resumes.

use super::clock::{Clock, seconds_between};
use crate::math::{Vec2, round_to};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use std::rc::Rc;

/// One completed level in the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub level: u32,
    /// Seconds taken to finish the level.
    pub elapsed_time: f64,
    pub distance: f64,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
}

/// Payload of the level-complete event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelResult {
    pub level: u32,
    pub elapsed_time: f64,
    pub distance: f64,
    pub score: f64,
    /// Best score of the session, including this level.
    pub best_score: f64,
}

/// Aggregates over the session history. All zero when no level has been completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_levels: usize,
    pub total_time: f64,
    pub total_distance: f64,
    pub average_score: f64,
    pub best_score: f64,
}

/// Tracks distance, time, and scores for the active level and the session.
///
/// Scores, distances and times are kept at full precision in results, the history and
/// the best score, so the best score compares exact values. Rounding to one decimal
/// (whole units for distance) only happens in [`format_score`], [`format_time`] and
/// [`format_distance`].
pub struct ScoreTracker {
    clock: Rc<dyn Clock>,
    player_name: String,
    current_level: u32,
    best_score: f64,
    history: Vec<ScoreRecord>,

    start_time: Option<DateTime<Utc>>,
    suspended_at: Option<DateTime<Utc>>,
    elapsed_time: f64,
    total_distance: f64,
    last_position: Option<Vec2>,
}

impl ScoreTracker {
    /// Creates a tracker for a fresh session, reading time from `clock`.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            player_name: String::new(),
            current_level: 1,
            best_score: 0.0,
            history: Vec::new(),
            start_time: None,
            suspended_at: None,
            elapsed_time: 0.0,
            total_distance: 0.0,
            last_position: None,
        }
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Resets the per-level counters and starts the level timer.
    pub fn start_level(&mut self, level: u32) {
        self.current_level = level;
        self.start_time = Some(self.clock.now());
        self.suspended_at = None;
        self.elapsed_time = 0.0;
        self.total_distance = 0.0;
        self.last_position = None;
    }

    /// Adds the distance from the previously recorded position, then remembers this one.
    pub fn record_position(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        if let Some(last) = self.last_position {
            self.total_distance += f64::from(last.distance(&position));
        }
        self.last_position = Some(position);
    }

    /// Recomputes the elapsed time from the clock. Does nothing while suspended.
    pub fn tick(&mut self) {
        if self.suspended_at.is_some() {
            return;
        }
        if let Some(start) = self.start_time {
            self.elapsed_time = seconds_between(start, self.clock.now()).max(0.0);
        }
    }

    /// Freezes the level timer. Calling it twice keeps the first suspension instant.
    pub fn suspend(&mut self) {
        if self.start_time.is_some() && self.suspended_at.is_none() {
            self.tick();
            self.suspended_at = Some(self.clock.now());
        }
    }

    /// Unfreezes the level timer, excluding the suspended span from elapsed time.
    pub fn resume(&mut self) {
        if let (Some(start), Some(suspended_at)) = (self.start_time, self.suspended_at.take()) {
            let paused_for = self.clock.now() - suspended_at;
            self.start_time = Some(start + paused_for);
            debug!(
                "Level timer resumed after {:.3}s suspended",
                seconds_between(suspended_at, self.clock.now())
            );
        }
    }

    /// Whether the level timer is currently frozen.
    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    /// Distance per second; zero when no time has elapsed.
    fn calculate_score(&self) -> f64 {
        if self.elapsed_time > 0.0 {
            self.total_distance / self.elapsed_time
        } else {
            0.0
        }
    }

    /// Finalizes the active level, records it in the history and returns its result.
    pub fn complete_level(&mut self) -> LevelResult {
        self.tick();
        let score = self.calculate_score();
        if score > self.best_score {
            self.best_score = score;
        }

        self.history.push(ScoreRecord {
            level: self.current_level,
            elapsed_time: self.elapsed_time,
            distance: self.total_distance,
            score,
            completed_at: self.clock.now(),
        });

        LevelResult {
            level: self.current_level,
            elapsed_time: self.elapsed_time,
            distance: self.total_distance,
            score,
            best_score: self.best_score,
        }
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// Seconds spent on the active level as of the last tick.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Completed levels in completion order.
    pub fn history(&self) -> &[ScoreRecord] {
        &self.history
    }

    /// Aggregates over the history.
    pub fn session_stats(&self) -> SessionStats {
        if self.history.is_empty() {
            return SessionStats::default();
        }

        let total_time: f64 = self.history.iter().map(|r| r.elapsed_time).sum();
        let total_distance: f64 = self.history.iter().map(|r| r.distance).sum();
        let total_score: f64 = self.history.iter().map(|r| r.score).sum();
        let best_score = self.history.iter().map(|r| r.score).fold(0.0, f64::max);

        SessionStats {
            total_levels: self.history.len(),
            total_time,
            total_distance,
            average_score: total_score / self.history.len() as f64,
            best_score,
        }
    }

    /// Clears the history, best score and level counters for a new game.
    pub fn reset_session(&mut self) {
        self.current_level = 1;
        self.best_score = 0.0;
        self.history.clear();
        self.start_time = None;
        self.suspended_at = None;
        self.elapsed_time = 0.0;
        self.total_distance = 0.0;
        self.last_position = None;
    }
}

/// Formats seconds with one decimal, e.g. `12.3s`.
pub fn format_time(seconds: f64) -> String {
    format!("{:.1}s", seconds)
}

/// Formats a distance as a whole number of surface units.
pub fn format_distance(distance: f64) -> String {
    format!("{}", distance.round() as i64)
}

/// Formats a score with one decimal, e.g. `10.0`.
pub fn format_score(score: f64) -> String {
    format!("{:.1}", round_to(score, 1))
}
