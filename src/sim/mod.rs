//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-stepped, single-threaded, no suspension points
//! - Stable ball ordering (fixed array indexed by ball id)
//! - No rendering or platform dependencies
//!
//! Two layers: [`physics`] advances ball motion for one time slice and knows
//! nothing about turns; [`tick`] owns the shot cycle, scoring, and faults,
//! driving the physics each frame while a shot is in flight.

pub mod physics;
pub mod state;
pub mod tick;

pub use physics::{Contact, step};
pub use state::{Ball, BallGroup, BallKind, Match, Pocket, ShotPhase, StickPose};
pub use tick::{FrameInput, update};
