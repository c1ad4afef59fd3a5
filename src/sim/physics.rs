//! The physics stepper
//!
//! Advances all ball motion by one time slice. Four passes run in a fixed
//! order every call - cushion reflection, pairwise elastic collision,
//! friction decay, displacement - followed by the pocket-fall animation and
//! a cosmetic rolling update. The order is load-bearing: separation happens
//! before friction so a fresh impulse is never decayed in the frame it was
//! produced, and displacement always runs last over the corrected
//! velocities.
//!
//! This layer knows nothing about turns or rules; it reports ball-to-ball
//! contacts so the rules layer can interpret them.

use glam::{Quat, Vec2, Vec3};

use super::state::{Ball, Pocket};
use crate::consts::*;
use crate::tuning::Tuning;

/// A resolved ball-to-ball contact, reported by id pair (a < b)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: u8,
    pub b: u8,
}

/// Advance the simulation by exactly `dt` seconds.
///
/// Balls mid-fall into a pocket skip every collision pass and only animate
/// their drop. Degenerate input (exactly coincident centres) is out of
/// contract; the initial rack guarantees non-degeneracy.
pub fn step(balls: &mut [Ball], pockets: &[Pocket], dt: f32, tuning: &Tuning) -> Vec<Contact> {
    cushion_pass(balls);
    let contacts = collision_pass(balls);
    friction_pass(balls, dt, tuning.friction);
    displacement_pass(balls, dt);
    fall_pass(balls, pockets, dt, tuning.pocket_fall_secs);
    roll_pass(balls, dt);
    contacts
}

/// Reflect and clamp every in-play ball against the four cushions. Each
/// edge is tested independently, so a ball driven exactly into a corner may
/// reflect on both axes in the same step - an accepted approximation.
fn cushion_pass(balls: &mut [Ball]) {
    for ball in balls.iter_mut().filter(|b| b.in_play()) {
        if ball.position.x + ball.radius >= TABLE_RIGHT {
            ball.position.x = TABLE_RIGHT - ball.radius;
            ball.velocity.x = -ball.velocity.x;
        }
        if ball.position.x - ball.radius <= TABLE_LEFT {
            ball.position.x = TABLE_LEFT + ball.radius;
            ball.velocity.x = -ball.velocity.x;
        }
        if ball.position.y + ball.radius >= TABLE_TOP {
            ball.position.y = TABLE_TOP - ball.radius;
            ball.velocity.y = -ball.velocity.y;
        }
        if ball.position.y - ball.radius <= TABLE_BOTTOM {
            ball.position.y = TABLE_BOTTOM + ball.radius;
            ball.velocity.y = -ball.velocity.y;
        }
    }
}

/// Resolve every overlapping unordered pair of in-play balls as a perfectly
/// elastic equal-mass collision: separate along the contact normal with the
/// correction split equally, then exchange the normal velocity components
/// while each ball keeps its own tangential component.
pub(crate) fn collision_pass(balls: &mut [Ball]) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            let (head, tail) = balls.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];
            if !a.in_play() || !b.in_play() {
                continue;
            }
            let delta = b.position - a.position;
            let dist = delta.length();
            if dist >= a.radius + b.radius {
                continue;
            }

            let normal = delta / dist;
            let correction = (a.radius + b.radius - dist) / 2.0;
            a.position -= normal * correction;
            b.position += normal * correction;

            let tangent = Vec2::new(-normal.y, normal.x);
            let a_vel = normal * normal.dot(b.velocity) + tangent * tangent.dot(a.velocity);
            let b_vel = normal * normal.dot(a.velocity) + tangent * tangent.dot(b.velocity);
            a.velocity = a_vel;
            b.velocity = b_vel;

            contacts.push(Contact { a: a.id, b: b.id });
        }
    }
    contacts
}

/// Decay every moving ball's speed linearly, opposite its velocity. If the
/// decay would flip the sign of either component the ball stops exactly -
/// friction only ever removes kinetic energy.
fn friction_pass(balls: &mut [Ball], dt: f32, friction: f32) {
    for ball in balls.iter_mut().filter(|b| b.in_play()) {
        if ball.velocity == Vec2::ZERO {
            continue;
        }
        let decay = ball.velocity.normalize() * friction * dt;
        let new_velocity = ball.velocity - decay;
        if ball.velocity.x * new_velocity.x < 0.0 || ball.velocity.y * new_velocity.y < 0.0 {
            ball.velocity = Vec2::ZERO;
        } else {
            ball.velocity = new_velocity;
        }
    }
}

fn displacement_pass(balls: &mut [Ball], dt: f32) {
    for ball in balls.iter_mut().filter(|b| b.in_play()) {
        ball.position += ball.velocity * dt;
    }
}

/// Animate captured balls dropping toward their pocket centre. A completed
/// fall hides the ball, upholding the sunk-and-not-falling => hidden
/// invariant.
fn fall_pass(balls: &mut [Ball], pockets: &[Pocket], dt: f32, fall_secs: f32) {
    for ball in balls.iter_mut().filter(|b| b.falling) {
        let pocket = match ball.sunk_into {
            Some(idx) => &pockets[idx],
            None => continue,
        };
        ball.fall_progress += dt / fall_secs;
        if ball.fall_progress >= 1.0 {
            ball.fall_progress = 1.0;
            ball.position = pocket.position;
            ball.falling = false;
            ball.hidden = true;
        } else {
            ball.position = ball.fall_from.lerp(pocket.position, ball.fall_progress);
        }
    }
}

/// Cosmetic rolling: rotate each moving ball about the table-plane axis
/// perpendicular to its motion, proportional to distance travelled. Skipped
/// for sunk or motionless balls.
fn roll_pass(balls: &mut [Ball], dt: f32) {
    for ball in balls.iter_mut().filter(|b| b.in_play()) {
        let speed = ball.velocity.length();
        if speed == 0.0 {
            continue;
        }
        let axis = Vec3::new(ball.velocity.y, 0.0, -ball.velocity.x) / speed;
        let angle = speed * dt / ball.radius;
        ball.orientation = (Quat::from_axis_angle(axis, angle) * ball.orientation).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_balls(a_pos: Vec2, a_vel: Vec2, b_pos: Vec2, b_vel: Vec2) -> Vec<Ball> {
        let mut a = Ball::new(0, a_pos);
        a.velocity = a_vel;
        let mut b = Ball::new(1, b_pos);
        b.velocity = b_vel;
        vec![a, b]
    }

    fn kinetic_energy(balls: &[Ball]) -> f32 {
        balls.iter().map(|b| b.velocity.length_squared()).sum()
    }

    #[test]
    fn test_head_on_collision_exchanges_velocities() {
        // Overlapping, approaching along the centre line with equal and
        // opposite velocity: normal components swap, tangential are zero
        let mut balls = two_balls(
            Vec2::new(-0.45, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(0.45, 0.0),
            Vec2::new(-3.0, 0.0),
        );
        let contacts = collision_pass(&mut balls);
        assert_eq!(contacts, vec![Contact { a: 0, b: 1 }]);
        assert!((balls[0].velocity - Vec2::new(-3.0, 0.0)).length() < 1e-5);
        assert!((balls[1].velocity - Vec2::new(3.0, 0.0)).length() < 1e-5);
        // Separated to exactly the radius sum
        let dist = balls[0].position.distance(balls[1].position);
        assert!((dist - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hidden_balls_do_not_collide() {
        let mut balls = two_balls(
            Vec2::new(-0.3, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.3, 0.0),
            Vec2::ZERO,
        );
        balls[1].begin_fall(0);
        balls[1].falling = false;
        balls[1].hidden = true;
        let contacts = collision_pass(&mut balls);
        assert!(contacts.is_empty());
        assert_eq!(balls[0].velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_cushion_clamps_and_reflects() {
        let mut ball = Ball::new(0, Vec2::new(4.8, 0.0));
        ball.velocity = Vec2::new(2.0, 1.0);
        let mut balls = vec![ball];
        cushion_pass(&mut balls);
        assert_eq!(balls[0].position.x, TABLE_RIGHT - BALL_RADIUS);
        assert_eq!(balls[0].velocity, Vec2::new(-2.0, 1.0));
    }

    #[test]
    fn test_fall_completes_into_pocket_centre() {
        let pockets = [Pocket {
            position: Vec2::new(5.0, 0.0),
            capture_radius: 0.8,
        }];
        let mut ball = Ball::new(3, Vec2::new(4.4, 0.2));
        ball.begin_fall(0);
        let mut balls = vec![ball];
        for _ in 0..120 {
            fall_pass(&mut balls, &pockets, 1.0 / 120.0, POCKET_FALL_SECS);
        }
        assert!(balls[0].hidden);
        assert!(!balls[0].falling);
        assert_eq!(balls[0].position, pockets[0].position);
    }

    #[test]
    fn test_roll_skips_motionless_balls() {
        let mut balls = vec![Ball::new(0, Vec2::ZERO)];
        roll_pass(&mut balls, 1.0 / 120.0);
        assert_eq!(balls[0].orientation, Quat::IDENTITY);
    }

    proptest! {
        /// Pairwise collision conserves the pair's kinetic energy
        #[test]
        fn prop_pair_collision_conserves_energy(
            angle in 0.0f32..std::f32::consts::TAU,
            dist in 0.2f32..0.99,
            avx in -8.0f32..8.0, avy in -8.0f32..8.0,
            bvx in -8.0f32..8.0, bvy in -8.0f32..8.0,
        ) {
            let offset = Vec2::new(angle.cos(), angle.sin()) * dist;
            let mut balls = two_balls(
                Vec2::ZERO,
                Vec2::new(avx, avy),
                offset,
                Vec2::new(bvx, bvy),
            );
            let before = kinetic_energy(&balls);
            collision_pass(&mut balls);
            let after = kinetic_energy(&balls);
            prop_assert!((before - after).abs() <= before.max(1.0) * 1e-4);
        }

        /// Friction never reverses a velocity component; a slow ball stops
        /// exactly rather than asymptotically
        #[test]
        fn prop_friction_never_reverses(
            vx in -10.0f32..10.0, vy in -10.0f32..10.0,
            dt in 0.001f32..0.1,
        ) {
            let mut ball = Ball::new(0, Vec2::ZERO);
            ball.velocity = Vec2::new(vx, vy);
            let speed = ball.velocity.length();
            let mut balls = vec![ball];
            friction_pass(&mut balls, dt, FRICTION);
            let new = balls[0].velocity;
            prop_assert!(new.x * vx >= 0.0);
            prop_assert!(new.y * vy >= 0.0);
            prop_assert!(new.length() <= speed + 1e-6);
            if speed > 0.0 && speed < FRICTION * dt {
                prop_assert_eq!(new, Vec2::ZERO);
            }
        }

        /// After any number of steps, every ball stays within the table
        /// bounds inset by its radius (or is off the table entirely)
        #[test]
        fn prop_balls_stay_on_table(
            vels in prop::array::uniform32(-8.0f32..8.0),
            steps in 1usize..600,
        ) {
            let tuning = Tuning::default();
            let pockets: [Pocket; 0] = [];
            let mut balls: Vec<Ball> = (0..BALL_COUNT)
                .map(|i| {
                    let mut b = Ball::new(
                        i as u8,
                        Vec2::new(
                            -3.0 + (i % 4) as f32 * 2.0,
                            -7.5 + (i / 4) as f32 * 5.0,
                        ),
                    );
                    b.velocity = Vec2::new(vels[i * 2], vels[i * 2 + 1]);
                    b
                })
                .collect();
            for _ in 0..steps {
                step(&mut balls, &pockets, 1.0 / 120.0, &tuning);
            }
            // Cushions run before displacement, so a ball may overshoot the
            // edge by at most one frame of travel before the next step
            // clamps it back
            let slack = 16.0 / 120.0 + 1e-3;
            for ball in balls.iter().filter(|b| b.in_play()) {
                prop_assert!(ball.position.x >= TABLE_LEFT + ball.radius - slack);
                prop_assert!(ball.position.x <= TABLE_RIGHT - ball.radius + slack);
                prop_assert!(ball.position.y >= TABLE_BOTTOM + ball.radius - slack);
                prop_assert!(ball.position.y <= TABLE_TOP - ball.radius + slack);
            }
        }
    }
}
