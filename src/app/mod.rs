//! Application layer.
//!
//! This module ties the game components into a session that an outer driver can run.
//!
//! # Module Structure
//!
//! - [`app_state`]: Contains the [`AppContext`] struct which owns all session state
//! - [`run_loop`]: Contains the [`RunLoop`] tick driver and its [`RunState`] machine
//!
//! # Threading Model
//!
//! Everything runs on the caller's thread. The driver must call [`AppContext::frame`]
//! at most once at a time; no component blocks, and no state is shared across threads.

pub mod app_state;
pub mod run_loop;

pub use app_state::AppContext;
pub use run_loop::{RunLoop, RunState};
