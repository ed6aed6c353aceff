//! Game simulation.
//!
//! This module holds everything that runs on each tick once a maze exists:
//!
//! - [`level`]: the [`LevelRunner`] that owns one level attempt
//! - [`player`]: player and goal tokens
//! - [`score`]: distance, time and score bookkeeping for levels and the session
//! - [`input`]: the [`InputSource`] seam and built-in sources
//! - [`events`]: level-complete listeners
//! - [`clock`]: injectable time sources

pub mod clock;
pub mod events;
pub mod input;
pub mod level;
pub mod player;
pub mod score;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::events::{EventBus, ListenerId};
pub use self::input::{Autopilot, FixedInput, InputSample, InputSource, Target};
pub use self::level::{LevelRunner, SurfaceExtent};
pub use self::player::{Goal, Player};
pub use self::score::{LevelResult, ScoreRecord, ScoreTracker, SessionStats};
