//! Match rules engine
//!
//! Owns the shot cycle: Aiming -> Charging -> Resolving -> (repeat), gated
//! by a terminal state once a winner is decided. While a shot is aimed or
//! charged only rules state changes; once released, the physics stepper
//! runs every frame and the shot outcome is evaluated when the table has
//! fully come to rest.

use log::{debug, info};

use super::physics::{self, Contact};
use super::state::{BallGroup, BallKind, Match, ShotPhase};
use crate::consts::*;
use crate::{heading_vec, wrap_degrees};
use glam::{Vec2, Vec3};

/// Normalized per-frame input sample, produced by the host each frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Elapsed seconds since the last frame, >= 0
    pub dt: f32,
    /// Rotation delta; only the Y axis drives the aim direction
    pub rotate: Vec3,
    /// Fire signal: assert to start charging, release to shoot
    pub fire: bool,
}

/// Advance the match by one frame. Called exactly once per rendered frame;
/// a no-op once a winner is decided.
pub fn update(m: &mut Match, input: &FrameInput) {
    if m.winner.is_some() {
        return;
    }
    match m.phase {
        ShotPhase::Aiming => {
            if input.fire {
                m.phase = ShotPhase::Charging;
                m.charge_time = 0.0;
            } else {
                m.direction = wrap_degrees(
                    m.direction + input.rotate.y * m.tuning.rotate_speed * input.dt,
                );
            }
        }
        ShotPhase::Charging => {
            if input.fire {
                m.charge_time += input.dt;
            } else {
                let speed = m.charge_time * m.tuning.hit_strength;
                m.balls[0].velocity = heading_vec(m.direction) * speed;
                info!(
                    "player {} shoots: heading {:.1} deg, speed {:.2}",
                    m.current_player, m.direction, speed
                );
                m.phase = ShotPhase::Resolving;
            }
        }
        ShotPhase::Resolving => resolve_frame(m, input.dt),
    }
}

/// One frame of a shot in flight: capture pockets first, then step the
/// physics, then interpret contacts and completed falls. The shot resolves
/// once every ball is motionless and none is still falling.
fn resolve_frame(m: &mut Match, dt: f32) {
    check_pockets(m);
    let contacts = physics::step(&mut m.balls, &m.pockets, dt, &m.tuning);
    apply_touch_rules(m, &contacts);
    check_eight_fall(m);
    if m.winner.is_some() {
        return;
    }
    if balls_at_rest(m) {
        finish_shot(m);
    }
}

/// Capture any in-play ball whose centre is inside a pocket's capture
/// radius, and apply the rule consequences immediately
fn check_pockets(m: &mut Match) {
    for i in 0..m.balls.len() {
        if !m.balls[i].in_play() {
            continue;
        }
        let pos = m.balls[i].position;
        let captured = m
            .pockets
            .iter()
            .position(|p| pos.distance(p.position) < p.capture_radius);
        if let Some(pocket) = captured {
            m.balls[i].begin_fall(pocket);
            info!("ball {i} captured by pocket {pocket}");
            handle_score(m, i as u8);
        }
    }
}

/// Immediate scoring consequences of a capture. Sinking the cue ball is a
/// fault on the spot; the eight ball's win/loss consequence waits for its
/// fall to complete; the first object ball fixes group ownership.
fn handle_score(m: &mut Match, id: u8) {
    match BallKind::of(id) {
        BallKind::Cue => {
            m.fault_this_shot = true;
            info!("cue ball pocketed: fault");
        }
        BallKind::Eight => {
            debug!("eight ball down, win check deferred to fall completion");
        }
        BallKind::Solid => object_ball_scored(m, BallGroup::Solid),
        BallKind::Stripe => object_ball_scored(m, BallGroup::Stripe),
    }
}

fn object_ball_scored(m: &mut Match, group: BallGroup) {
    if !m.colors_chosen {
        m.colors_chosen = true;
        // Whoever pots first claims that group; the stored assignment is
        // always expressed as player 0's group
        m.p1_color = if m.current_player == 0 {
            group
        } else {
            group.other()
        };
        info!("groups fixed: player 0 owns {:?}", m.p1_color);
    }
    if group == m.group_of(m.current_player) {
        m.scored_this_shot = true;
    }
}

/// The first cue-ball contact of a shot marks the shot as live; once group
/// ownership is fixed, first contact with anything but the shooter's own
/// group (the eight ball included) is a fault.
fn apply_touch_rules(m: &mut Match, contacts: &[Contact]) {
    if m.touched_a_ball_this_shot {
        return;
    }
    let Some(contact) = contacts.iter().find(|c| c.a == 0 || c.b == 0) else {
        return;
    };
    let other = if contact.a == 0 { contact.b } else { contact.a };
    m.touched_a_ball_this_shot = true;
    if m.colors_chosen
        && BallKind::of(other).group() != Some(m.group_of(m.current_player))
    {
        m.fault_this_shot = true;
        info!("illegal first contact with ball {other}: fault");
    }
}

/// Terminal win check, run once the eight ball's fall animation completes:
/// the shooter wins only with their whole group already off the table,
/// otherwise the opposing player wins outright.
fn check_eight_fall(m: &mut Match) {
    if !m.balls[8].hidden {
        return;
    }
    let shooter = m.current_player;
    let cleared = m.colors_chosen
        && m
            .balls
            .iter()
            .filter(|b| b.kind().group() == Some(m.group_of(shooter)))
            .all(|b| b.sunk_into.is_some());
    let winner = if cleared { shooter } else { 1 - shooter };
    m.winner = Some(winner);
    info!("eight ball sunk by player {shooter}: player {winner} wins");
}

fn balls_at_rest(m: &Match) -> bool {
    m.balls
        .iter()
        .all(|b| !b.falling && b.velocity == Vec2::ZERO)
}

/// End-of-shot resolution: a shot that touched nothing is itself a fault; a
/// fault respots the cue ball and, like a shot that failed to score, passes
/// the turn. Per-shot flags reset and aiming resumes.
fn finish_shot(m: &mut Match) {
    if !m.touched_a_ball_this_shot {
        m.fault_this_shot = true;
        debug!("no ball touched this shot: fault");
    }
    if m.fault_this_shot {
        m.balls[0].respot(CUE_START);
        // One settle pass pushes the cue off any ball now occupying the spot
        physics::collision_pass(&mut m.balls);
        debug!("cue ball respotted");
    }
    if !m.scored_this_shot || m.fault_this_shot {
        m.current_player = 1 - m.current_player;
        info!("turn passes to player {}", m.current_player);
    }
    m.scored_this_shot = false;
    m.fault_this_shot = false;
    m.touched_a_ball_this_shot = false;
    m.charge_time = 0.0;
    m.phase = ShotPhase::Aiming;
}
