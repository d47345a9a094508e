//! Reactive AI controller
//!
//! A fixed-threshold follower: compare the paddle center to the ball (or,
//! on Hard, to the ball's extrapolated interception point) and move when
//! the offset leaves the dead zone. Pure function of the current state;
//! the difficulty factor scales paddle speed in the physics step, not here.

use crate::consts::AI_DEAD_ZONE;
use crate::sim::state::{Ball, Difficulty, Intent, Paddle};

/// Horizontal speeds below this give no usable time-of-flight estimate
const MIN_HORIZONTAL_SPEED: f32 = 1e-3;

/// Compute the intent for an AI-driven paddle.
///
/// Calling this twice without advancing the simulation yields the same
/// intent both times.
pub fn ai_intent(paddle: &Paddle, ball: &Ball, difficulty: Difficulty) -> Intent {
    let target = match difficulty {
        Difficulty::Hard => predicted_y(paddle, ball).unwrap_or(ball.pos.y),
        _ => ball.pos.y,
    };

    let center = paddle.center_y();
    if center < target - AI_DEAD_ZONE {
        Intent::Down
    } else if center > target + AI_DEAD_ZONE {
        Intent::Up
    } else {
        Intent::None
    }
}

/// Extrapolate the ball's vertical position at the paddle's face using the
/// current velocity.
///
/// Returns `None` when no prediction is available: the ball is moving away
/// from the paddle, or is horizontally (near-)stationary, which would make
/// the time-of-flight division blow up.
fn predicted_y(paddle: &Paddle, ball: &Ball) -> Option<f32> {
    if ball.vel.x.abs() < MIN_HORIZONTAL_SPEED {
        return None;
    }
    let time_to_face = (paddle.face_x() - ball.pos.x) / ball.vel.x;
    if time_to_face <= 0.0 {
        return None;
    }
    Some(ball.pos.y + ball.vel.y * time_to_face)
}
