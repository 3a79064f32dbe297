//! Steering primitive shared by every behavior.

use glam::Vec2;
use townsfolk_common::TileCoord;

use crate::agent::{Agent, Facing, AGENT_HALF_EXTENT};
use crate::terrain::Terrain;

/// Distance at which a mover counts as arrived.
pub const ARRIVAL_DISTANCE: f32 = 4.0;
/// Fraction of speed used to slide sideways along a blocked axis.
pub const NUDGE_FACTOR: f32 = 0.3;

/// Steps `agent` toward `target` at `speed * multiplier * dt`.
///
/// Each axis is probed separately against walls and trees using the
/// agent's collision half-extent; a blocked axis is nudged sideways
/// instead. The result is clamped to the playable area. Returns true
/// when the agent was already within [`ARRIVAL_DISTANCE`].
pub fn move_toward(
    agent: &mut Agent,
    target: Vec2,
    dt: f32,
    multiplier: f32,
    terrain: &dyn Terrain,
) -> bool {
    let delta = target - agent.position;
    let dist = delta.length();
    if dist < ARRIVAL_DISTANCE {
        agent.velocity = Vec2::ZERO;
        return true;
    }

    let speed = agent.speed * multiplier;
    let step = delta / dist * speed * dt;
    let ts = terrain.tile_size();
    let tile = |v: f32| (v / ts).floor() as i32;

    let probe_x = agent.position.x + step.x + AGENT_HALF_EXTENT.copysign(step.x);
    let row = tile(agent.position.y);
    if terrain.blocks_movement(TileCoord::new(tile(probe_x), row)) {
        agent.position.x += side(delta.y) * speed * dt * NUDGE_FACTOR;
    } else {
        agent.position.x += step.x;
    }

    let probe_y = agent.position.y + step.y + AGENT_HALF_EXTENT.copysign(step.y);
    let col = tile(agent.position.x);
    if terrain.blocks_movement(TileCoord::new(col, tile(probe_y))) {
        agent.position.y += side(delta.x) * speed * dt * NUDGE_FACTOR;
    } else {
        agent.position.y += step.y;
    }

    let (min, max) = terrain.bounds();
    agent.position = agent.position.clamp(Vec2::splat(min), Vec2::splat(max));
    agent.facing = Facing::from_motion(delta);
    agent.velocity = step;
    false
}

/// Steps `agent` directly away from `threat`, aiming `distance` units out.
pub fn move_away(
    agent: &mut Agent,
    threat: Vec2,
    distance: f32,
    dt: f32,
    multiplier: f32,
    terrain: &dyn Terrain,
) {
    let away = (agent.position - threat).normalize_or_zero();
    let away = if away == Vec2::ZERO { Vec2::X } else { away };
    let target = agent.position + away * distance;
    move_toward(agent, target, dt, multiplier, terrain);
}

/// Angle of the vector from `from` to `to`.
#[must_use]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle.
#[must_use]
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

fn side(component: f32) -> f32 {
    if component > 0.0 {
        1.0
    } else {
        -1.0
    }
}
