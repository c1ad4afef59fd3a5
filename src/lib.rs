//! Eight Ball - a two-player 8-ball billiards simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, pockets, match rules)
//! - `tuning`: Data-driven game balance
//!
//! The crate has no rendering, input, or persistence concerns. A host feeds
//! one [`sim::FrameInput`] per rendered frame into [`sim::update`] and reads
//! the match back through the query surface on [`sim::Match`].

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Number of balls on the table (cue + 15 numbered)
    pub const BALL_COUNT: usize = 16;
    /// Number of pockets (4 corners + 2 side midpoints)
    pub const POCKET_COUNT: usize = 6;

    /// Table bounds in logical units. Every ball has a diameter of 1 unit;
    /// the table is 10x20, occupying the space between (-5, -10) and (5, 10).
    /// A ball's position denotes the position of its centre.
    pub const TABLE_LEFT: f32 = -5.0;
    pub const TABLE_RIGHT: f32 = 5.0;
    pub const TABLE_BOTTOM: f32 = -10.0;
    pub const TABLE_TOP: f32 = 10.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.5;

    /// Pocket capture radii - corner pockets are more forgiving than sides
    pub const CORNER_POCKET_RADIUS: f32 = 1.1;
    pub const SIDE_POCKET_RADIUS: f32 = 0.8;

    /// Felt friction: linear speed decay in units/s^2
    pub const FRICTION: f32 = 1.2;
    /// Launch speed per second of accumulated charge
    pub const HIT_STRENGTH: f32 = 10.0;
    /// Aim rotation speed in degrees per second at full input deflection
    pub const AIM_ROTATE_SPEED: f32 = 90.0;
    /// Duration of the fall animation into a pocket, seconds
    pub const POCKET_FALL_SECS: f32 = 0.5;

    /// Cue ball head spot; also the respot position after a fault
    pub const CUE_START: Vec2 = Vec2::new(0.0, -5.0);
    /// Apex ball of the rack; rows spread toward the far cushion
    pub const RACK_APEX: Vec2 = Vec2::new(0.0, 4.0);

    /// Render-frame mapping: balls sit this high above the table mesh,
    /// scaled down from the unit-diameter logical plane
    pub const BALL_HEIGHT: f32 = 1.55;
    pub const BALL_SCALE: f32 = 0.2;

    /// Cue stick rest gap behind the ball and pull-back per second of charge
    pub const STICK_OFFSET: f32 = 0.25;
    pub const STICK_PULL_RATE: f32 = 0.5;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(mut deg: f32) -> f32 {
    while deg >= 360.0 {
        deg -= 360.0;
    }
    while deg < 0.0 {
        deg += 360.0;
    }
    deg
}

/// Unit vector on the table plane for a heading given in degrees
#[inline]
pub fn heading_vec(deg: f32) -> Vec2 {
    let rad = deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
    }

    #[test]
    fn test_heading_vec() {
        assert!((heading_vec(0.0) - Vec2::X).length() < 1e-6);
        assert!((heading_vec(90.0) - Vec2::Y).length() < 1e-6);
        assert!((heading_vec(180.0) + Vec2::X).length() < 1e-6);
    }
}
