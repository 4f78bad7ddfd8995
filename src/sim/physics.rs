//! Ball stepping and collision response
//!
//! One step is gravity, friction, Euler integration, peg collision, then wall
//! containment. The order is observable: reordering changes where balls land.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::Board;
use crate::config::PhysicsConfig;

/// The falling ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Ball {
    /// A ball at rest at the board's spawn point
    pub fn spawn(board: &Board) -> Self {
        Self {
            pos: board.spawn_point(),
            vel: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEvent {
    /// Free fall, nothing touched
    Moved,
    /// Bounced off the peg at this index
    PegHit { peg: usize, speed_before: f32, speed_after: f32 },
    /// Clamped against a side wall
    WallHit,
    /// Reached the slot line
    Landed,
}

/// Advance the ball by one fixed timestep
pub fn step<R: Rng>(
    ball: &mut Ball,
    board: &Board,
    physics: &PhysicsConfig,
    dt: f32,
    rng: &mut R,
) -> StepEvent {
    ball.vel.y += physics.gravity * dt;
    ball.vel *= physics.friction;
    ball.pos += ball.vel * dt;

    let mut event = StepEvent::Moved;

    // First peg in generation order wins; one response per step
    let contact = board.contact_distance();
    if let Some((index, peg)) = board
        .pegs
        .iter()
        .enumerate()
        .find(|(_, peg)| ball.pos.distance_squared(**peg) < contact * contact)
    {
        let speed_before = ball.speed();
        ball.vel = peg_bounce(ball.pos - *peg, ball.vel, physics.bounce, physics.jitter, rng);
        separate_from_peg(ball, *peg, contact);
        event = StepEvent::PegHit {
            peg: index,
            speed_before,
            speed_after: ball.speed(),
        };
    }

    if contain_in_walls(ball, board.width, physics.bounce) && event == StepEvent::Moved {
        event = StepEvent::WallHit;
    }

    if ball.pos.y >= board.slot_line() {
        StepEvent::Landed
    } else {
        event
    }
}

/// Velocity after hitting a peg
///
/// `offset` points from the peg center to the ball center. The ball leaves
/// along that direction at `bounce` times its speed, gets a uniform sideways
/// kick of up to `jitter` times its speed, and is never sent upward. The
/// result never exceeds `bounce * |vel|`.
pub fn peg_bounce<R: Rng>(
    offset: Vec2,
    vel: Vec2,
    bounce: f32,
    jitter: f32,
    rng: &mut R,
) -> Vec2 {
    let speed = vel.length();
    let angle = offset.y.atan2(offset.x);
    let cap = speed * bounce;

    let mut out = Vec2::new(angle.cos(), angle.sin()) * cap;
    if jitter > 0.0 && speed > 0.0 {
        out.x += rng.random_range(-jitter..=jitter) * speed;
    }
    out.y = out.y.max(0.0);

    if out.length_squared() > cap * cap {
        out = out.normalize_or_zero() * cap;
    }
    out
}

/// Push an overlapping ball out of a peg without moving it upward
///
/// Below the peg center the ball is pushed out along the contact normal.
/// Above it, the ball slides sideways just far enough to clear the peg.
fn separate_from_peg(ball: &mut Ball, peg: Vec2, contact: f32) {
    let offset = ball.pos - peg;
    let dist = offset.length();
    if dist >= contact {
        return;
    }

    if offset.y >= 0.0 && dist > f32::EPSILON {
        ball.pos = peg + offset / dist * contact;
        return;
    }

    let side = if offset.x != 0.0 {
        offset.x.signum()
    } else if ball.vel.x != 0.0 {
        ball.vel.x.signum()
    } else {
        1.0
    };
    let clear_x = (contact * contact - offset.y * offset.y).max(0.0).sqrt();
    ball.pos.x = peg.x + side * clear_x;
}

/// Clamp the ball inside `[0, width]`, reflecting and damping `vel.x`
///
/// Returns true if a wall was hit.
pub fn contain_in_walls(ball: &mut Ball, width: f32, bounce: f32) -> bool {
    if ball.pos.x < 0.0 {
        ball.pos.x = 0.0;
    } else if ball.pos.x > width {
        ball.pos.x = width;
    } else {
        return false;
    }
    ball.vel.x = -ball.vel.x * bounce;
    true
}
