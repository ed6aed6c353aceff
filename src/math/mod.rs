//! Math utilities for surface-space geometry.
//!
//! The maze lives on a flat 2D surface, so the only type needed is [`Vec2`], plus the
//! rounding helper shared by the score formatting code.

pub mod vec;

pub use vec::Vec2;

/// Rounds `value` to the given number of decimal places.
///
/// # Example
/// ```
/// use maze_trail::math::round_to;
///
/// assert_eq!(round_to(12.345, 1), 12.3);
/// assert_eq!(round_to(0.05, 0), 0.0);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
