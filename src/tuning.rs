//! Data-driven game balance
//!
//! Gameplay constants a host may override per match without recompiling.
//! Defaults mirror [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable gameplay parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Linear speed decay in units/s^2
    pub friction: f32,
    /// Launch speed per second of accumulated charge
    pub hit_strength: f32,
    /// Aim rotation speed in degrees per second at full input deflection
    pub rotate_speed: f32,
    /// Duration of the fall animation into a pocket, seconds
    pub pocket_fall_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            friction: FRICTION,
            hit_strength: HIT_STRENGTH,
            rotate_speed: AIM_ROTATE_SPEED,
            pocket_fall_secs: POCKET_FALL_SECS,
        }
    }
}
