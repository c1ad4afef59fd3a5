//! Match state and core simulation types
//!
//! Ball and pocket sets are created once at match start and keep their
//! identity for the whole match; only their mutable fields change. Balls
//! live in a fixed array indexed by id - the id-to-kind mapping (0 = cue,
//! 1-7 solids, 8 = eight, 9-15 stripes) is load-bearing for the rules layer.

use glam::{Mat4, Quat, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::heading_vec;
use crate::tuning::Tuning;

/// The two object-ball groups a player can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallGroup {
    Solid,
    Stripe,
}

impl BallGroup {
    /// The complementary group
    pub fn other(self) -> Self {
        match self {
            BallGroup::Solid => BallGroup::Stripe,
            BallGroup::Stripe => BallGroup::Solid,
        }
    }
}

/// Ball classification, fixed by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    Cue,
    Solid,
    Eight,
    Stripe,
}

impl BallKind {
    /// Kind for a ball id (0 = cue, 1-7 solids, 8 = eight, 9-15 stripes)
    pub fn of(id: u8) -> Self {
        match id {
            0 => BallKind::Cue,
            1..=7 => BallKind::Solid,
            8 => BallKind::Eight,
            _ => BallKind::Stripe,
        }
    }

    /// The group this ball belongs to, if it is an object ball
    pub fn group(self) -> Option<BallGroup> {
        match self {
            BallKind::Solid => Some(BallGroup::Solid),
            BallKind::Stripe => Some(BallGroup::Stripe),
            BallKind::Cue | BallKind::Eight => None,
        }
    }
}

/// A rigid disc on the 2D table plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u8,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Index into the pocket array once captured (None = still in play)
    pub sunk_into: Option<usize>,
    /// True while animating into a sunk pocket
    pub falling: bool,
    /// True once fully sunk; hidden balls are in no collision pass
    pub hidden: bool,
    /// Accumulated rolling rotation - purely visual, never feeds back into
    /// the physics
    pub orientation: Quat,
    /// Fall animation progress, 0 at capture to 1 fully sunk
    pub fall_progress: f32,
    /// Position at the moment of capture; the fall lerps from here to the
    /// pocket centre
    pub fall_from: Vec2,
}

impl Ball {
    pub fn new(id: u8, position: Vec2) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            radius: BALL_RADIUS,
            sunk_into: None,
            falling: false,
            hidden: false,
            orientation: Quat::IDENTITY,
            fall_progress: 0.0,
            fall_from: Vec2::ZERO,
        }
    }

    pub fn kind(&self) -> BallKind {
        BallKind::of(self.id)
    }

    /// Still on the table and participating in collision passes
    pub fn in_play(&self) -> bool {
        self.sunk_into.is_none()
    }

    /// Begin the fall animation into the given pocket
    pub fn begin_fall(&mut self, pocket: usize) {
        self.sunk_into = Some(pocket);
        self.falling = true;
        self.fall_progress = 0.0;
        self.fall_from = self.position;
        self.velocity = Vec2::ZERO;
    }

    /// Reset to an in-play ball at the given spot (cue ball respot)
    pub fn respot(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.sunk_into = None;
        self.falling = false;
        self.hidden = false;
        self.fall_progress = 0.0;
    }

    /// Visual scale factor while dropping into a pocket (1 in play, 0 sunk)
    pub fn fall_shrink(&self) -> f32 {
        if self.hidden {
            0.0
        } else if self.sunk_into.is_some() {
            (1.0 - self.fall_progress).max(0.0)
        } else {
            1.0
        }
    }

    /// World transform for the renderer: the table plane maps to the XZ
    /// plane, with balls sitting at a fixed height
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(BALL_SCALE * self.fall_shrink()),
            self.orientation,
            Vec3::new(self.position.x, BALL_HEIGHT, self.position.y),
        )
    }
}

/// A fixed circular capture zone
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pocket {
    pub position: Vec2,
    pub capture_radius: f32,
}

/// Phase of the shot cycle. Aiming and charging are mutually exclusive;
/// Resolving means a shot is in flight and physics runs each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotPhase {
    Aiming,
    Charging,
    Resolving,
}

/// Derived pose for the aiming stick, consumed by the renderer
#[derive(Debug, Clone, Copy)]
pub struct StickPose {
    /// Tip position on the table plane, behind the cue ball
    pub position: Vec2,
    /// Heading in degrees (the ball's launch direction)
    pub heading: f32,
    /// How far the stick is drawn back, grows with charge time
    pub pull_back: f32,
    /// False whenever no shot is being lined up; the pose then collapses
    pub visible: bool,
}

impl StickPose {
    pub fn world_matrix(&self) -> Mat4 {
        if !self.visible {
            return Mat4::from_scale(Vec3::ZERO);
        }
        Mat4::from_rotation_translation(
            Quat::from_rotation_y(-self.heading.to_radians()),
            Vec3::new(self.position.x, BALL_HEIGHT, self.position.y),
        )
    }
}

/// Complete state of one match. Owns the balls and pockets exclusively for
/// the match lifetime; one instance per concurrent match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub balls: [Ball; BALL_COUNT],
    pub pockets: [Pocket; POCKET_COUNT],
    pub phase: ShotPhase,
    /// 0 or 1
    pub current_player: u8,
    /// Cue launch heading in degrees, wrapped to [0, 360)
    pub direction: f32,
    /// Seconds of charge accumulated for the pending shot
    pub charge_time: f32,
    /// Set the first time any object ball is pocketed
    pub colors_chosen: bool,
    /// Group permanently owned by player 0 once `colors_chosen`
    pub p1_color: BallGroup,
    pub scored_this_shot: bool,
    pub fault_this_shot: bool,
    pub touched_a_ball_this_shot: bool,
    /// Terminal once set; no further transitions occur
    pub winner: Option<u8>,
    pub tuning: Tuning,
}

impl Match {
    /// Set up a fresh match: cue on the head spot, standard triangle rack,
    /// player 0 to shoot, aiming straight up the table
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            balls: rack(),
            pockets: pockets(),
            phase: ShotPhase::Aiming,
            current_player: 0,
            direction: 90.0,
            charge_time: 0.0,
            colors_chosen: false,
            p1_color: BallGroup::Solid,
            scored_this_shot: false,
            fault_this_shot: false,
            touched_a_ball_this_shot: false,
            winner: None,
            tuning,
        }
    }

    /// Ball snapshot by id/index
    pub fn ball(&self, index: usize) -> &Ball {
        &self.balls[index]
    }

    pub fn current_player(&self) -> u8 {
        self.current_player
    }

    /// Winner, or None while the match is still running
    pub fn winner(&self) -> Option<u8> {
        self.winner
    }

    /// Group the given player must legally hit first. Only meaningful once
    /// `colors_chosen` is true.
    pub fn group_of(&self, player: u8) -> BallGroup {
        if player == 0 {
            self.p1_color
        } else {
            self.p1_color.other()
        }
    }

    /// Group the current player must pocket next, or None while groups are
    /// still open (any object ball is a legal target)
    pub fn target_group(&self) -> Option<BallGroup> {
        self.colors_chosen.then(|| self.group_of(self.current_player))
    }

    /// Aiming stick pose derived from direction and charge time; collapses
    /// to a hidden pose whenever no shot is being lined up
    pub fn stick_pose(&self) -> StickPose {
        let visible = self.winner.is_none()
            && matches!(self.phase, ShotPhase::Aiming | ShotPhase::Charging);
        let pull_back = STICK_OFFSET + self.charge_time * STICK_PULL_RATE;
        let cue = &self.balls[0];
        StickPose {
            position: cue.position - heading_vec(self.direction) * (cue.radius + pull_back),
            heading: self.direction,
            pull_back,
            visible,
        }
    }

    /// Debug helper: scatter every in-play ball with a seeded random
    /// velocity and let the shot resolve. Deterministic per seed.
    pub fn scatter(&mut self, seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        for ball in self.balls.iter_mut().filter(|b| b.in_play()) {
            ball.velocity = Vec2::new(rng.random_range(-6.0..6.0), rng.random_range(-6.0..6.0));
        }
        self.phase = ShotPhase::Resolving;
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard 8-ball triangle rack, eight ball at the rack centre.
/// Layout viewed from the cue ball (apex nearest, rows spread away):
/// ```text
///  1           <- apex (row 0)
///  9   2       <- row 1
///  3   8  10   <- row 2
/// 11   4   5  12
///  6  13  14   7  15
/// ```
fn rack() -> [Ball; BALL_COUNT] {
    // Slight slack so the rack starts non-degenerate
    let gap = BALL_RADIUS * 2.0 + 0.02;
    let row_offset = gap * 0.866; // sqrt(3)/2 for an equilateral triangle

    // (ball id, row, lateral offset in gaps from the centre line)
    let layout: [(u8, usize, f32); 15] = [
        (1, 0, 0.0),
        (9, 1, -0.5),
        (2, 1, 0.5),
        (3, 2, -1.0),
        (8, 2, 0.0),
        (10, 2, 1.0),
        (11, 3, -1.5),
        (4, 3, -0.5),
        (5, 3, 0.5),
        (12, 3, 1.5),
        (6, 4, -2.0),
        (13, 4, -1.0),
        (14, 4, 0.0),
        (7, 4, 1.0),
        (15, 4, 2.0),
    ];

    let mut balls = std::array::from_fn(|i| Ball::new(i as u8, Vec2::ZERO));
    balls[0].position = CUE_START;
    for (id, row, lateral) in layout {
        balls[id as usize].position = Vec2::new(
            RACK_APEX.x + lateral * gap,
            RACK_APEX.y + row as f32 * row_offset,
        );
    }
    balls
}

/// Six pockets: four corners (larger capture radius) and the two midpoints
/// of the long cushions
fn pockets() -> [Pocket; POCKET_COUNT] {
    [
        Pocket {
            position: Vec2::new(TABLE_LEFT, TABLE_BOTTOM),
            capture_radius: CORNER_POCKET_RADIUS,
        },
        Pocket {
            position: Vec2::new(TABLE_RIGHT, TABLE_BOTTOM),
            capture_radius: CORNER_POCKET_RADIUS,
        },
        Pocket {
            position: Vec2::new(TABLE_LEFT, TABLE_TOP),
            capture_radius: CORNER_POCKET_RADIUS,
        },
        Pocket {
            position: Vec2::new(TABLE_RIGHT, TABLE_TOP),
            capture_radius: CORNER_POCKET_RADIUS,
        },
        Pocket {
            position: Vec2::new(TABLE_LEFT, 0.0),
            capture_radius: SIDE_POCKET_RADIUS,
        },
        Pocket {
            position: Vec2::new(TABLE_RIGHT, 0.0),
            capture_radius: SIDE_POCKET_RADIUS,
        },
    ]
}
